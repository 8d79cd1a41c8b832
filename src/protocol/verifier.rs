use num_bigint::BigUint;

use super::{Commitment, GroupParameters, Statement};
use crate::crypto::{ct_eq, mod_mul, mod_pow};
use crate::{Error, Result};

/// Verifier side of the proof check for one registered statement.
pub struct Verifier<'a> {
    params: &'a GroupParameters,
    statement: &'a Statement,
}

impl<'a> Verifier<'a> {
    pub fn new(params: &'a GroupParameters, statement: &'a Statement) -> Self {
        Self { params, statement }
    }

    /// Checks the response to a challenge.
    ///
    /// Accepts iff `r1 == g^s * y1^c mod p` and `r2 == h^s * y2^c mod p`.
    /// Both equations are always evaluated and compared in constant time; the
    /// error never says which one failed.
    ///
    /// Only the canonical response is accepted: `s` must lie in `[0, q)`.
    /// An `s + k*q` satisfies both equations too, but is rejected with the
    /// same error so every accepted transcript has exactly one encoding.
    pub fn verify_response(&self, commitment: &Commitment, c: &BigUint, s: &BigUint) -> Result<()> {
        let p = self.params.p();
        let in_range = s < self.params.q();

        let rhs1 = mod_mul(
            &mod_pow(self.params.g(), s, p),
            &mod_pow(self.statement.y1(), c, p),
            p,
        );
        let rhs2 = mod_mul(
            &mod_pow(self.params.h(), s, p),
            &mod_pow(self.statement.y2(), c, p),
            p,
        );

        let check1 = ct_eq(commitment.r1(), &rhs1, p);
        let check2 = ct_eq(commitment.r2(), &rhs2, p);

        if !(in_range & check1 & check2) {
            return Err(Error::ProofMismatch);
        }

        Ok(())
    }
}
