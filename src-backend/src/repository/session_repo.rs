//! Session Repository
//!
//! In-memory session registry standing in for the authentication provider.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{now_millis, DomainError, DomainResult, Session};

#[derive(Default)]
pub struct SessionRepository {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh session for `owner_id`, dropping any that have expired
    pub async fn issue(&self, owner_id: &str, ttl: Duration) -> Session {
        let now = now_millis();
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            owner_id: owner_id.to_string(),
            expires_at: now.saturating_add(ttl_ms),
        };

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        if sessions.len() < before {
            log::debug!("Pruned {} expired session(s)", before - sessions.len());
        }
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    #[cfg(test)]
    async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Look up a live session; expired sessions are dropped on sight
    pub async fn resolve(&self, token: &str) -> DomainResult<Session> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get(token) else {
            return Err(DomainError::NotAuthenticated("invalid session".into()));
        };
        if session.is_expired(now_millis()) {
            sessions.remove(token);
            return Err(DomainError::NotAuthenticated("session expired".into()));
        }
        Ok(session.clone())
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.lock().await.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let repo = SessionRepository::new();
        let session = repo.issue("alice", Duration::from_secs(60)).await;
        let resolved = repo.resolve(&session.token).await.unwrap();
        assert_eq!(resolved.owner_id, "alice");
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let repo = SessionRepository::new();
        let session = repo.issue("alice", Duration::ZERO).await;
        let err = repo.resolve(&session.token).await.unwrap_err();
        assert_eq!(err, DomainError::NotAuthenticated("session expired".into()));
        // gone after the first rejection
        let err = repo.resolve(&session.token).await.unwrap_err();
        assert_eq!(err, DomainError::NotAuthenticated("invalid session".into()));
    }

    #[tokio::test]
    async fn test_issue_prunes_expired_sessions() {
        let repo = SessionRepository::new();
        for _ in 0..3 {
            repo.issue("alice", Duration::ZERO).await;
        }
        let live = repo.issue("bob", Duration::from_secs(60)).await;

        assert_eq!(repo.session_count().await, 1);
        assert_eq!(repo.resolve(&live.token).await.unwrap().owner_id, "bob");
    }

    #[tokio::test]
    async fn test_revoke() {
        let repo = SessionRepository::new();
        let session = repo.issue("bob", Duration::from_secs(60)).await;
        repo.revoke(&session.token).await;
        assert!(repo.resolve(&session.token).await.unwrap_err().is_auth_failure());
    }
}
