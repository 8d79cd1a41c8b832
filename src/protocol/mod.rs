/// Witness, statement and commitment values.
pub mod gadgets;
/// Group parameters and their validation.
pub mod params;
/// Prover arithmetic: commitments, nonces and responses.
pub mod prover;
/// Proof check for a single response.
pub mod verifier;

pub use gadgets::{Commitment, Statement, Witness};
pub use params::{validate, GroupParameters};
pub use prover::{compute_commitment, compute_response, sample_random_exponent, Nonce, Prover};
pub use verifier::Verifier;
