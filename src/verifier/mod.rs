//! Verifier (server) side of the authentication protocol.
//!
//! [`VerifierEngine`] drives the per-user state machine
//! `Unregistered -> Registered -> ChallengeIssued -> Authenticated` over the
//! registration, pending-challenge and session stores. The gRPC service and
//! server configuration live in the `server`-gated submodules.

use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;
use tracing::{debug, info, warn};

use crate::{Commitment, Error, GroupParameters, Result, SecureRng, Statement, Verifier};

#[cfg(feature = "server")]
/// Server configuration.
pub mod config;

#[cfg(feature = "server")]
/// gRPC service implementation.
pub mod service;

/// Session store.
pub mod session;

/// Registration and pending-challenge stores.
pub mod state;

#[cfg(feature = "server")]
pub use config::ServerConfig;
#[cfg(feature = "server")]
pub use service::AuthServiceImpl;
pub use session::{Session, SessionStore};
pub use state::{PendingChallenge, Registration, ServerState};

/// Default cap on outstanding challenges per user.
pub const DEFAULT_MAX_CHALLENGES_PER_USER: usize = 3;

/// Limits applied by the verifier engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierPolicy {
    /// Maximum number of unanswered challenges per user.
    pub max_challenges_per_user: usize,
    /// Lifetime of an unanswered challenge. `None` never expires.
    pub challenge_ttl: Option<Duration>,
    /// Lifetime of a session. `None` never expires.
    pub session_ttl: Option<Duration>,
}

impl Default for VerifierPolicy {
    fn default() -> Self {
        Self {
            max_challenges_per_user: DEFAULT_MAX_CHALLENGES_PER_USER,
            challenge_ttl: None,
            session_ttl: None,
        }
    }
}

/// Stateful verifier shared by all request handlers.
///
/// Cloning is cheap; clones share parameters and stores.
///
/// # Examples
///
/// ```rust
/// use chaum_pedersen_auth::{GroupParameters, Prover, SecureRng, VerifierEngine, Witness};
/// use num_bigint::BigUint;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let params = GroupParameters::toy();
/// let engine = VerifierEngine::new(Arc::new(params.clone()));
/// let prover = Prover::new(params, Witness::new(&BigUint::from(6u32)));
/// let mut rng = SecureRng::new();
///
/// let statement = prover.statement();
/// engine.register("alice", statement.y1().clone(), statement.y2().clone()).await.unwrap();
///
/// let (commitment, nonce) = prover.commit(&mut rng);
/// let (auth_id, c) = engine
///     .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
///     .await
///     .unwrap();
///
/// let s = prover.respond(nonce, &c);
/// let session_id = engine.verify_authentication(&auth_id, &s).await.unwrap();
/// assert!(!session_id.is_empty());
/// # }
/// ```
#[derive(Clone)]
pub struct VerifierEngine {
    params: Arc<GroupParameters>,
    state: ServerState,
    sessions: SessionStore,
    policy: VerifierPolicy,
}

impl VerifierEngine {
    /// Creates an engine with the default policy.
    pub fn new(params: Arc<GroupParameters>) -> Self {
        Self::with_policy(params, VerifierPolicy::default())
    }

    pub fn with_policy(params: Arc<GroupParameters>, policy: VerifierPolicy) -> Self {
        Self {
            params,
            state: ServerState::new(),
            sessions: SessionStore::new(policy.session_ttl),
            policy,
        }
    }

    pub fn params(&self) -> &GroupParameters {
        &self.params
    }

    pub fn policy(&self) -> &VerifierPolicy {
        &self.policy
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn ensure_element(&self, name: &'static str, value: &BigUint) -> Result<()> {
        if self.params.contains(value) {
            Ok(())
        } else {
            Err(Error::InvalidGroupElement(name))
        }
    }

    /// Registers `y1 = g^x`, `y2 = h^x` for a new user.
    ///
    /// No proof of knowledge of `x` is required here; the values only need to
    /// be subgroup elements.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGroupElement`] for values outside the subgroup,
    /// [`Error::AlreadyRegistered`] if the user id is taken.
    pub async fn register(&self, user_id: &str, y1: BigUint, y2: BigUint) -> Result<()> {
        self.ensure_element("y1", &y1)?;
        self.ensure_element("y2", &y2)?;

        let registration = Registration::new(user_id.to_string(), Statement::new(y1, y2));
        match self.state.register_user(registration).await {
            Ok(()) => {
                info!(user_id, "user registered");
                Ok(())
            }
            Err(e) => {
                warn!(user_id, "registration rejected: {e}");
                Err(e)
            }
        }
    }

    /// Issues a challenge `c` for the commitment `(r1, r2)`.
    ///
    /// Returns the fresh auth id together with `c`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGroupElement`], [`Error::UnknownUser`], or
    /// [`Error::TooManyChallenges`] when the user already has the maximum
    /// number of unanswered challenges.
    pub async fn create_authentication_challenge(
        &self,
        user_id: &str,
        r1: BigUint,
        r2: BigUint,
    ) -> Result<(String, BigUint)> {
        self.ensure_element("r1", &r1)?;
        self.ensure_element("r2", &r2)?;

        if self.state.get_user(user_id).await.is_none() {
            warn!(user_id, "challenge requested for unknown user");
            return Err(Error::UnknownUser(user_id.to_string()));
        }

        let mut rng = SecureRng::new();
        let c = rng.exponent(self.params.q());
        let auth_id = rng.token();

        let challenge = PendingChallenge::new(
            auth_id.clone(),
            user_id.to_string(),
            Commitment::new(r1, r2),
            c.clone(),
            self.policy.challenge_ttl,
        );
        self.state
            .insert_challenge(challenge, self.policy.max_challenges_per_user)
            .await
            .inspect_err(|e| warn!(user_id, "challenge refused: {e}"))?;

        debug!(user_id, auth_id = %auth_id, "challenge issued");
        Ok((auth_id, c))
    }

    /// Checks the response `s` for a pending challenge and opens a session.
    ///
    /// The pending challenge is consumed before the check, so a failed
    /// attempt cannot be retried under the same auth id.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownAuthId`] for unknown, consumed or expired auth ids,
    /// [`Error::UnknownUser`] if the registration is missing, and
    /// [`Error::ProofMismatch`] if the proof equations do not hold.
    pub async fn verify_authentication(&self, auth_id: &str, s: &BigUint) -> Result<String> {
        let challenge = self
            .state
            .take_challenge(auth_id)
            .await
            .inspect_err(|_| warn!(auth_id, "verification for unknown auth id"))?;

        let user_id = challenge.user_id.as_str();
        let registration = self
            .state
            .get_user(user_id)
            .await
            .ok_or_else(|| Error::UnknownUser(user_id.to_string()))?;

        Verifier::new(&self.params, &registration.statement)
            .verify_response(&challenge.commitment, &challenge.c, s)
            .inspect_err(|_| warn!(user_id, auth_id, "proof rejected"))?;

        let session_id = self.sessions.create(user_id).await;
        info!(user_id, auth_id, "user authenticated");
        Ok(session_id)
    }

    /// Returns a live session by id.
    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.lookup(session_id).await
    }

    /// Sweeps expired challenges and sessions. Returns the number of each
    /// removed.
    pub async fn cleanup_expired(&self) -> (usize, usize) {
        let challenges = self.state.cleanup_expired_challenges().await;
        let sessions = self.sessions.cleanup_expired().await;
        if challenges > 0 || sessions > 0 {
            debug!(challenges, sessions, "expired entries removed");
        }
        (challenges, sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Prover, Witness};

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn toy_engine() -> VerifierEngine {
        VerifierEngine::new(Arc::new(GroupParameters::toy()))
    }

    #[tokio::test]
    async fn alice_authenticates_in_toy_group() {
        let engine = toy_engine();
        let prover = Prover::new(GroupParameters::toy(), Witness::new(&big(6)));
        let mut rng = SecureRng::new();

        engine.register("alice", big(2), big(3)).await.unwrap();

        let (commitment, nonce) = prover.commit(&mut rng);
        let (auth_id, c) = engine
            .create_authentication_challenge("alice", commitment.r1().clone(), commitment.r2().clone())
            .await
            .unwrap();
        assert!(c.bits() <= 256);

        let s = prover.respond(nonce, &c);
        let session_id = engine.verify_authentication(&auth_id, &s).await.unwrap();
        assert!(!session_id.is_empty());

        let session = engine.session(&session_id).await.unwrap();
        assert_eq!(session.user_id, "alice");
    }

    #[tokio::test]
    async fn challenge_for_unknown_user() {
        let engine = toy_engine();
        let err = engine
            .create_authentication_challenge("mallory", big(8), big(4))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownUser(ref u) if u == "mallory"));
    }

    #[tokio::test]
    async fn elements_outside_subgroup_are_rejected() {
        let engine = toy_engine();
        assert!(matches!(
            engine.register("alice", big(5), big(3)).await,
            Err(Error::InvalidGroupElement("y1"))
        ));
        assert!(matches!(
            engine.register("alice", big(2), big(0)).await,
            Err(Error::InvalidGroupElement("y2"))
        ));

        engine.register("alice", big(2), big(3)).await.unwrap();
        assert!(matches!(
            engine.create_authentication_challenge("alice", big(8), big(23)).await,
            Err(Error::InvalidGroupElement("r2"))
        ));
    }

    #[tokio::test]
    async fn cleanup_with_zero_ttls() {
        let policy = VerifierPolicy {
            challenge_ttl: Some(Duration::ZERO),
            session_ttl: Some(Duration::ZERO),
            ..VerifierPolicy::default()
        };
        let engine = VerifierEngine::with_policy(Arc::new(GroupParameters::toy()), policy);
        engine.register("alice", big(2), big(3)).await.unwrap();
        engine
            .create_authentication_challenge("alice", big(8), big(4))
            .await
            .unwrap();
        engine.sessions().create("alice").await;

        assert_eq!(engine.cleanup_expired().await, (1, 1));
    }
}
