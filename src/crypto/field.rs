//! Modular arithmetic over arbitrary-precision integers.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;

/// Number of Miller-Rabin rounds used when validating group parameters.
///
/// Each round with a random base lets a composite through with probability at
/// most 1/4, so 20 rounds bound the error by 2^-40 while keeping validation of
/// a 2048-bit modulus well under a second.
pub const MILLER_RABIN_ROUNDS: usize = 20;

/// Primes used for trial division before Miller-Rabin.
const SMALL_PRIMES: [u32; 15] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];

/// Computes `base^exp mod modulus`, normalized into `[0, modulus)`.
///
/// # Panics
///
/// Panics if `modulus` is zero. Group moduli are validated primes, so callers
/// inside the crate never pass zero.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Computes `(a * b) mod modulus`.
pub fn mod_mul(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    (a * b) % modulus
}

/// Computes `(a - b) mod modulus`, normalized into `[0, modulus)`.
///
/// Both operands are reduced first so the subtraction never underflows.
pub fn mod_sub(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    let a = a % modulus;
    let b = b % modulus;
    if a >= b {
        a - b
    } else {
        modulus - (b - a)
    }
}

/// Compares two residues modulo `modulus` in constant time.
///
/// Both values are encoded big-endian at the byte width of the modulus, so the
/// comparison does not depend on where the first differing limb sits.
pub fn ct_eq(a: &BigUint, b: &BigUint, modulus: &BigUint) -> bool {
    let width = byte_width(modulus);
    let a = to_fixed_be(a, width);
    let b = to_fixed_be(b, width);
    a.ct_eq(&b).into()
}

/// Number of bytes needed to hold any residue of `modulus`.
pub fn byte_width(modulus: &BigUint) -> usize {
    usize::try_from(modulus.bits().div_ceil(8)).unwrap_or(usize::MAX)
}

fn to_fixed_be(value: &BigUint, width: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= width {
        return bytes;
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(&bytes);
    out
}

/// Probabilistic primality test: trial division followed by `rounds` rounds
/// of Miller-Rabin with uniformly random bases.
pub fn is_probable_prime<R: RngCore + CryptoRng>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }

    for small in SMALL_PRIMES {
        let small = BigUint::from(small);
        if *n == small {
            return true;
        }
        if (n % &small).is_zero() {
            return false;
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    // n is odd here, so n - 1 has at least one trailing zero bit.
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = mod_pow(&a, &d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = mod_mul(&x, &x, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}
