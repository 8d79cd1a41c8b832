use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use num_bigint::BigUint;
use tokio::sync::RwLock;

use crate::{Commitment, Error, Result, Statement};

/// Deadline `ttl` after `created_at`, kept at full clock precision.
///
/// A TTL too large to represent never expires.
pub(crate) fn expiry_from(created_at: SystemTime, ttl: Option<Duration>) -> Option<SystemTime> {
    ttl.and_then(|ttl| created_at.checked_add(ttl))
}

pub(crate) fn has_passed(deadline: Option<SystemTime>) -> bool {
    deadline.is_some_and(|at| SystemTime::now() >= at)
}

/// A registered user's public values.
#[derive(Clone, Debug)]
pub struct Registration {
    pub user_id: String,
    /// `(y1, y2)` as sent at registration.
    pub statement: Statement,
    pub registered_at: SystemTime,
}

impl Registration {
    pub fn new(user_id: String, statement: Statement) -> Self {
        Self {
            user_id,
            statement,
            registered_at: SystemTime::now(),
        }
    }
}

/// An issued challenge waiting for its response.
#[derive(Clone, Debug)]
pub struct PendingChallenge {
    pub auth_id: String,
    pub user_id: String,
    /// The prover's `(r1, r2)`.
    pub commitment: Commitment,
    /// The challenge `c` sent back to the prover.
    pub c: BigUint,
    pub created_at: SystemTime,
    /// `None` when challenges do not expire.
    pub expires_at: Option<SystemTime>,
}

impl PendingChallenge {
    pub fn new(
        auth_id: String,
        user_id: String,
        commitment: Commitment,
        c: BigUint,
        ttl: Option<Duration>,
    ) -> Self {
        let created_at = SystemTime::now();
        Self {
            auth_id,
            user_id,
            commitment,
            c,
            created_at,
            expires_at: expiry_from(created_at, ttl),
        }
    }

    pub fn is_expired(&self) -> bool {
        has_passed(self.expires_at)
    }
}

/// Pending challenges indexed by auth id, with a per-user count kept in the
/// same lock so the cap check and the insert are one critical section.
#[derive(Debug, Default)]
struct PendingChallenges {
    by_id: HashMap<String, PendingChallenge>,
    per_user: HashMap<String, usize>,
}

impl PendingChallenges {
    fn remove(&mut self, auth_id: &str) -> Option<PendingChallenge> {
        let challenge = self.by_id.remove(auth_id)?;
        if let Some(count) = self.per_user.get_mut(&challenge.user_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.per_user.remove(&challenge.user_id);
            }
        }
        Some(challenge)
    }

    fn outstanding(&self, user_id: &str) -> usize {
        self.per_user.get(user_id).copied().unwrap_or(0)
    }

    fn remove_expired(&mut self, user_id: Option<&str>) -> usize {
        let expired = self
            .by_id
            .values()
            .filter(|c| user_id.is_none_or(|u| c.user_id == u) && c.is_expired())
            .map(|c| c.auth_id.clone())
            .collect::<Vec<String>>();

        for auth_id in &expired {
            self.remove(auth_id);
        }
        expired.len()
    }
}

/// Registration store and pending-challenge store.
///
/// Clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct ServerState {
    registrations: Arc<RwLock<HashMap<String, Registration>>>,
    challenges: Arc<RwLock<PendingChallenges>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a registration unless the user id is already taken.
    pub async fn register_user(&self, registration: Registration) -> Result<()> {
        let mut registrations = self.registrations.write().await;

        if registrations.contains_key(&registration.user_id) {
            return Err(Error::AlreadyRegistered(registration.user_id));
        }

        registrations.insert(registration.user_id.clone(), registration);
        Ok(())
    }

    pub async fn get_user(&self, user_id: &str) -> Option<Registration> {
        self.registrations.read().await.get(user_id).cloned()
    }

    /// Stores a pending challenge, enforcing at most `limit` outstanding
    /// challenges per user. Expired challenges do not count toward the limit.
    pub async fn insert_challenge(&self, challenge: PendingChallenge, limit: usize) -> Result<()> {
        let mut challenges = self.challenges.write().await;

        if challenges.outstanding(&challenge.user_id) >= limit {
            challenges.remove_expired(Some(challenge.user_id.as_str()));
            if challenges.outstanding(&challenge.user_id) >= limit {
                return Err(Error::TooManyChallenges {
                    user_id: challenge.user_id,
                    limit,
                });
            }
        }

        *challenges.per_user.entry(challenge.user_id.clone()).or_default() += 1;
        challenges.by_id.insert(challenge.auth_id.clone(), challenge);
        Ok(())
    }

    /// Removes and returns the challenge for `auth_id`.
    ///
    /// The entry is gone after this call whatever the caller does with it, so
    /// each auth id is answered at most once. An expired entry is removed and
    /// reported as unknown.
    pub async fn take_challenge(&self, auth_id: &str) -> Result<PendingChallenge> {
        let challenge = self
            .challenges
            .write()
            .await
            .remove(auth_id)
            .ok_or_else(|| Error::UnknownAuthId(auth_id.to_string()))?;

        if challenge.is_expired() {
            return Err(Error::UnknownAuthId(auth_id.to_string()));
        }

        Ok(challenge)
    }

    /// Removes all expired challenges and returns how many were dropped.
    pub async fn cleanup_expired_challenges(&self) -> usize {
        self.challenges.write().await.remove_expired(None)
    }

    pub async fn user_count(&self) -> usize {
        self.registrations.read().await.len()
    }

    pub async fn challenge_count(&self) -> usize {
        self.challenges.read().await.by_id.len()
    }
}
