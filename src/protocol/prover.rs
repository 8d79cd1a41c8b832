use num_bigint::{BigUint, RandBigInt};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::{Commitment, GroupParameters, Statement, Witness};
use crate::crypto::{mod_mul, mod_pow, mod_sub, rng::exponent_bits};

/// Computes a commitment `base^exponent mod p`.
///
/// Used for both the registration values `(y1, y2)` and the per-login
/// commitment `(r1, r2)`.
pub fn compute_commitment(base: &BigUint, exponent: &BigUint, p: &BigUint) -> BigUint {
    mod_pow(base, exponent, p)
}

/// Samples a fresh exponent for a subgroup of order `q`.
///
/// The value is at least 256 bits wide and `bits(q) + 128` bits for larger
/// subgroups, so its residue mod `q` is statistically uniform.
pub fn sample_random_exponent<R: RngCore + CryptoRng>(rng: &mut R, q: &BigUint) -> BigUint {
    rng.gen_biguint(exponent_bits(q))
}

/// Computes the response `s = (k - c * x) mod q`, normalized into `[0, q)`.
pub fn compute_response(k: &BigUint, c: &BigUint, x: &BigUint, q: &BigUint) -> BigUint {
    let cx = mod_mul(&(c % q), &(x % q), q);
    mod_sub(k, &cx, q)
}

/// Prover side of the interactive Chaum-Pedersen protocol.
///
/// Holds the secret witness for one user. A login is [`commit`](Self::commit)
/// followed by [`respond`](Self::respond) with the verifier's challenge.
pub struct Prover {
    params: GroupParameters,
    witness: Witness,
    statement: Statement,
}

impl Prover {
    /// Creates a prover and derives its public statement `(y1, y2)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chaum_pedersen_auth::{GroupParameters, Prover, Witness};
    /// use num_bigint::BigUint;
    ///
    /// let prover = Prover::new(GroupParameters::toy(), Witness::new(&BigUint::from(6u32)));
    /// assert_eq!(prover.statement().y1(), &BigUint::from(2u32));
    /// ```
    pub fn new(params: GroupParameters, witness: Witness) -> Self {
        let statement = Statement::from_witness(&params, &witness);
        Self {
            params,
            witness,
            statement,
        }
    }

    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    /// Returns the values to register: `y1 = g^x`, `y2 = h^x`.
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Generates the first login message.
    ///
    /// Returns the public commitment and the secret nonce `k` that must be
    /// passed to [`respond`](Self::respond).
    pub fn commit<R: RngCore + CryptoRng>(&self, rng: &mut R) -> (Commitment, Nonce) {
        let k = sample_random_exponent(rng, self.params.q());
        let commitment = self.commit_with(&k);
        (commitment, Nonce::new(&k))
    }

    fn commit_with(&self, k: &BigUint) -> Commitment {
        let r1 = compute_commitment(self.params.g(), k, self.params.p());
        let r2 = compute_commitment(self.params.h(), k, self.params.p());
        Commitment::new(r1, r2)
    }

    /// Answers a challenge. The nonce is consumed so it cannot answer a
    /// second challenge.
    pub fn respond(&self, nonce: Nonce, c: &BigUint) -> BigUint {
        compute_response(&nonce.k(), c, &self.witness.secret(), self.params.q())
    }
}

/// Secret per-login nonce `k`, zeroized on drop.
pub struct Nonce {
    k: Zeroizing<Vec<u8>>,
}

impl Nonce {
    fn new(k: &BigUint) -> Self {
        Self {
            k: Zeroizing::new(k.to_bytes_be()),
        }
    }

    fn k(&self) -> BigUint {
        BigUint::from_bytes_be(&self.k)
    }
}

impl core::fmt::Debug for Nonce {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Nonce(<redacted>)")
    }
}
