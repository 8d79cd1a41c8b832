//! Interactive Chaum-Pedersen zero-knowledge authentication.
//!
//! A prover registers `y1 = g^x mod p` and `y2 = h^x mod p` for a secret `x`,
//! and later logs in by answering a challenge without ever revealing `x`:
//!
//! 1. prover sends `r1 = g^k`, `r2 = h^k` for a fresh random `k`
//! 2. verifier replies with a random challenge `c` and an auth id
//! 3. prover answers `s = (k - c * x) mod q`
//! 4. verifier accepts iff `r1 == g^s * y1^c` and `r2 == h^s * y2^c` (mod p)
//!    and opens a session
//!
//! All values are arbitrary-precision integers and cross the wire as decimal
//! strings. The crate is organised as:
//! - **crypto**: modular arithmetic, primality testing, randomness, encoding
//! - **groups**: named parameter presets
//! - **protocol**: parameter validation, prover and proof check
//! - **verifier**: stateful engine, stores, and (with `server`) the gRPC service
//! - **client**: gRPC prover client (with `grpc`)

/// Group configuration shared by both processes.
pub mod config;
/// Arithmetic, randomness and encoding primitives.
pub mod crypto;
/// Error types.
pub mod error;
/// Named group parameter sets.
pub mod groups;
/// Protocol values, prover and verifier arithmetic.
pub mod protocol;
/// Verifier engine and server-side state.
pub mod verifier;

#[cfg(feature = "grpc")]
/// gRPC prover client.
pub mod client;

#[cfg(feature = "grpc")]
/// Generated protobuf types and gRPC stubs.
#[allow(missing_docs)]
pub mod proto {
    tonic::include_proto!("zkp_auth");
}

pub use config::GroupSettings;
pub use crypto::SecureRng;
pub use error::{Error, ParameterError, Result};
pub use groups::GroupPreset;
pub use protocol::{Commitment, GroupParameters, Nonce, Prover, Statement, Verifier, Witness};
pub use verifier::{VerifierEngine, VerifierPolicy};

#[cfg(feature = "grpc")]
pub use client::{ClientError, ProverClient};
