//! Error types for Chaum-Pedersen authentication.

use num_bigint::BigUint;

/// Reasons a set of group parameters is rejected.
///
/// The first five variants correspond, in order, to the checks performed by
/// [`validate`](crate::protocol::params::validate). Each carries the offending values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    /// The modulus p failed the primality test.
    #[error("p = {p} is not prime")]
    PNotPrime { p: BigUint },

    /// The subgroup order q failed the primality test.
    #[error("q = {q} is not prime")]
    QNotPrime { q: BigUint },

    /// q does not evenly divide p - 1.
    #[error("q = {q} does not divide p - 1 (p = {p})")]
    QDoesNotDivide { p: BigUint, q: BigUint },

    /// g^q mod p != 1.
    #[error("g = {g} does not lie in the subgroup of order q = {q} mod p = {p}")]
    GNotInSubgroup { p: BigUint, q: BigUint, g: BigUint },

    /// h^q mod p != 1.
    #[error("h = {h} does not lie in the subgroup of order q = {q} mod p = {p}")]
    HNotInSubgroup { p: BigUint, q: BigUint, h: BigUint },

    /// A parameter could not be parsed as a decimal integer.
    #[error("parameter {name} is not a decimal integer: {value:?}")]
    Malformed { name: &'static str, value: String },

    /// The configured preset name is not known.
    #[error("unknown group preset '{0}' (expected 'toy', 'demo256' or 'rfc5114')")]
    UnknownPreset(String),

    /// Only some of p, q, g, h were supplied explicitly.
    #[error("explicit group parameters require all of p, q, g and h (missing {0})")]
    Incomplete(&'static str),
}

/// Main error type for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Group parameters are invalid. Fatal at startup.
    #[error("invalid group parameters: {0}")]
    Configuration(#[from] ParameterError),

    /// The user id already has a registration.
    #[error("user '{0}' is already registered")]
    AlreadyRegistered(String),

    /// The user id has no registration.
    #[error("user '{0}' is not registered")]
    UnknownUser(String),

    /// No pending authentication exists under this id.
    #[error("no pending authentication with id '{0}'")]
    UnknownAuthId(String),

    /// The response does not satisfy the proof equations.
    #[error("proof verification failed")]
    ProofMismatch,

    /// The user already has the maximum number of outstanding challenges.
    #[error("too many outstanding challenges for user '{user_id}' (limit {limit})")]
    TooManyChallenges { user_id: String, limit: usize },

    /// An integer field was not a canonical decimal string.
    #[error("invalid integer encoding for {field}: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    /// A value is not an element of the order-q subgroup.
    #[error("{0} is not an element of the order-q subgroup")]
    InvalidGroupElement(&'static str),
}

/// Result type alias for library operations.
pub type Result<T> = core::result::Result<T, Error>;
