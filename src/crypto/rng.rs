//! Cryptographically secure randomness for exponents, challenges and ids.

use num_bigint::{BigUint, RandBigInt};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Lower bound on the bit length of every sampled exponent or challenge.
pub const MIN_EXPONENT_BITS: u64 = 256;

/// Extra bits drawn beyond the subgroup order so that reduction mod q is
/// statistically uniform.
const STATISTICAL_SECURITY_BITS: u64 = 128;

/// Length in bytes of auth ids and session ids before hex encoding.
pub const TOKEN_BYTES: usize = 32;

/// Bit length used when sampling an exponent for a subgroup of order `q`.
pub fn exponent_bits(q: &BigUint) -> u64 {
    MIN_EXPONENT_BITS.max(q.bits() + STATISTICAL_SECURITY_BITS)
}

/// Thin wrapper around `OsRng`.
///
/// Every random value in the protocol (the prover's `k`, the verifier's `c`,
/// auth ids and session ids) is drawn through this type.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecureRng(OsRng);

impl SecureRng {
    pub fn new() -> Self {
        Self(OsRng)
    }

    /// Samples a uniformly random exponent for a subgroup of order `q`.
    pub fn exponent(&mut self, q: &BigUint) -> BigUint {
        self.gen_biguint(exponent_bits(q))
    }

    /// Returns a fresh opaque identifier: 32 random bytes, hex-encoded.
    pub fn token(&mut self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        self.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}
