use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::RwLock;

use super::state::{expiry_from, has_passed};
use crate::SecureRng;

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Session token (hex-encoded).
    pub session_id: String,
    pub user_id: String,
    pub created_at: SystemTime,
    /// `None` when sessions do not expire.
    pub expires_at: Option<SystemTime>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        has_passed(self.expires_at)
    }
}

/// Sessions minted by successful verifications.
///
/// Sessions are immutable once created. Clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }

    /// Creates a session for `user_id` and returns its fresh id.
    pub async fn create(&self, user_id: &str) -> String {
        let created_at = SystemTime::now();
        let mut sessions = self.sessions.write().await;

        let mut rng = SecureRng::new();
        let session_id = loop {
            let candidate = rng.token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        sessions.insert(
            session_id.clone(),
            Session {
                session_id: session_id.clone(),
                user_id: user_id.to_string(),
                created_at,
                expires_at: expiry_from(created_at, self.ttl),
            },
        );
        session_id
    }

    /// Returns the session if it exists and has not expired.
    pub async fn lookup(&self, session_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).filter(|s| !s.is_expired()).cloned()
    }

    /// Removes expired sessions and returns how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
