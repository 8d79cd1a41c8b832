//! Protocol values: the prover's secret witness, the public statement
//! registered with the verifier, and the per-login commitment.

use core::fmt;

use num_bigint::BigUint;
use zeroize::Zeroizing;

use super::GroupParameters;
use crate::crypto::{encoding, mod_pow};
use crate::Result;

/// Secret exponent `x`.
///
/// Stored as big-endian bytes in zeroizing memory; the integer form is only
/// rebuilt for the duration of a computation. `Debug` never prints the value.
#[derive(Clone)]
pub struct Witness {
    x: Zeroizing<Vec<u8>>,
}

impl Witness {
    pub fn new(x: &BigUint) -> Self {
        Self {
            x: Zeroizing::new(x.to_bytes_be()),
        }
    }

    /// Parses the secret from decimal text, e.g. a `--secret` flag.
    pub fn from_decimal(text: &str) -> Result<Self> {
        let x = encoding::decode("secret", text)?;
        Ok(Self::new(&x))
    }

    pub(crate) fn secret(&self) -> BigUint {
        BigUint::from_bytes_be(&self.x)
    }
}

impl fmt::Debug for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Witness(<redacted>)")
    }
}

/// Public registration values `y1 = g^x mod p`, `y2 = h^x mod p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    y1: BigUint,
    y2: BigUint,
}

impl Statement {
    pub fn new(y1: BigUint, y2: BigUint) -> Self {
        Self { y1, y2 }
    }

    /// Computes `y1 = g^x`, `y2 = h^x` from the witness.
    pub fn from_witness(params: &GroupParameters, witness: &Witness) -> Self {
        let x = witness.secret();
        Self {
            y1: mod_pow(params.g(), &x, params.p()),
            y2: mod_pow(params.h(), &x, params.p()),
        }
    }

    pub fn y1(&self) -> &BigUint {
        &self.y1
    }

    pub fn y2(&self) -> &BigUint {
        &self.y2
    }
}

/// First protocol message of a login: `r1 = g^k mod p`, `r2 = h^k mod p`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    r1: BigUint,
    r2: BigUint,
}

impl Commitment {
    pub fn new(r1: BigUint, r2: BigUint) -> Self {
        Self { r1, r2 }
    }

    pub fn r1(&self) -> &BigUint {
        &self.r1
    }

    pub fn r2(&self) -> &BigUint {
        &self.r2
    }
}
