/// Decimal-string codec for arbitrary-precision integers.
pub mod encoding;
/// Modular arithmetic and primality testing.
pub mod field;
/// Cryptographically secure random number generation.
pub mod rng;

pub use field::{ct_eq, is_probable_prime, mod_mul, mod_pow, mod_sub, MILLER_RABIN_ROUNDS};
pub use rng::SecureRng;
