//! Group parameters and their startup validation.
//!
//! Both processes build a [`GroupParameters`] once, validate it, and share it
//! read-only for their whole lifetime. Every modular operation in the protocol
//! is taken over `p`, every exponent over `q`.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::crypto::{encoding, is_probable_prime, mod_pow, SecureRng, MILLER_RABIN_ROUNDS};
use crate::error::ParameterError;
use crate::groups::GroupPreset;

/// Public parameters `(p, q, g, h)` of a Chaum-Pedersen instance.
///
/// `p` is a prime modulus, `q` a prime dividing `p - 1`, and `g`, `h` elements
/// of the order-`q` subgroup of `Z_p*`. Values built through [`new`](Self::new)
/// or [`from_decimal`](Self::from_decimal) always satisfy these invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupParameters {
    p: BigUint,
    q: BigUint,
    g: BigUint,
    h: BigUint,
}

impl GroupParameters {
    /// Validates and constructs a parameter set.
    ///
    /// # Errors
    ///
    /// Returns the [`ParameterError`] of the first failing check of
    /// [`validate`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chaum_pedersen_auth::GroupParameters;
    /// use num_bigint::BigUint;
    ///
    /// let params = GroupParameters::new(
    ///     BigUint::from(23u32),
    ///     BigUint::from(11u32),
    ///     BigUint::from(4u32),
    ///     BigUint::from(9u32),
    /// )
    /// .unwrap();
    /// assert_eq!(params.q(), &BigUint::from(11u32));
    /// ```
    pub fn new(p: BigUint, q: BigUint, g: BigUint, h: BigUint) -> Result<Self, ParameterError> {
        validate(&p, &q, &g, &h)?;
        Ok(Self { p, q, g, h })
    }

    /// Parses four decimal strings and validates the result.
    pub fn from_decimal(p: &str, q: &str, g: &str, h: &str) -> Result<Self, ParameterError> {
        Self::new(
            parse_parameter("p", p)?,
            parse_parameter("q", q)?,
            parse_parameter("g", g)?,
            parse_parameter("h", h)?,
        )
    }

    /// Builds a parameter set from known-good constants.
    pub(crate) fn new_unchecked(p: BigUint, q: BigUint, g: BigUint, h: BigUint) -> Self {
        Self { p, q, g, h }
    }

    /// The toy group `p = 23, q = 11, g = 4, h = 9`.
    pub fn toy() -> Self {
        GroupPreset::Toy.parameters()
    }

    /// A 256-bit modulus with a 109-bit subgroup.
    pub fn demo256() -> Self {
        GroupPreset::Demo256.parameters()
    }

    /// The RFC 5114 2048-bit group with a 256-bit subgroup.
    pub fn rfc5114() -> Self {
        GroupPreset::Rfc5114.parameters()
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn h(&self) -> &BigUint {
        &self.h
    }

    /// Returns true if `element` lies in the order-`q` subgroup:
    /// `0 < element < p` and `element^q mod p == 1`.
    pub fn contains(&self, element: &BigUint) -> bool {
        !element.is_zero() && *element < self.p && mod_pow(element, &self.q, &self.p).is_one()
    }
}

fn parse_parameter(name: &'static str, value: &str) -> Result<BigUint, ParameterError> {
    encoding::decode(name, value).map_err(|_| ParameterError::Malformed {
        name,
        value: value.to_string(),
    })
}

/// Checks that `(p, q, g, h)` describe a usable group.
///
/// The checks run in this order and the first failure is returned:
///
/// 1. `p` is prime
/// 2. `q` is prime
/// 3. `(p - 1) mod q == 0`
/// 4. `g^q mod p == 1`
/// 5. `h^q mod p == 1`
///
/// Primality uses [`MILLER_RABIN_ROUNDS`] rounds of Miller-Rabin.
pub fn validate(p: &BigUint, q: &BigUint, g: &BigUint, h: &BigUint) -> Result<(), ParameterError> {
    let mut rng = SecureRng::new();

    if !is_probable_prime(p, MILLER_RABIN_ROUNDS, &mut rng) {
        return Err(ParameterError::PNotPrime { p: p.clone() });
    }

    if !is_probable_prime(q, MILLER_RABIN_ROUNDS, &mut rng) {
        return Err(ParameterError::QNotPrime { q: q.clone() });
    }

    if !((p - BigUint::one()) % q).is_zero() {
        return Err(ParameterError::QDoesNotDivide {
            p: p.clone(),
            q: q.clone(),
        });
    }

    if !mod_pow(g, q, p).is_one() {
        return Err(ParameterError::GNotInSubgroup {
            p: p.clone(),
            q: q.clone(),
            g: g.clone(),
        });
    }

    if !mod_pow(h, q, p).is_one() {
        return Err(ParameterError::HNotInSubgroup {
            p: p.clone(),
            q: q.clone(),
            h: h.clone(),
        });
    }

    Ok(())
}
