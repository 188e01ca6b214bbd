//! Session Commands

use crate::domain::{DomainError, DomainResult, Session};
use crate::AppState;

/// Open a session for `owner_id`
pub async fn sign_in(state: &AppState, owner_id: &str) -> DomainResult<Session> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(DomainError::Validation("owner id must not be empty".into()));
    }
    Ok(state.sessions.issue(owner_id, state.session_ttl()).await)
}

pub async fn sign_out(state: &AppState, token: &str) -> DomainResult<()> {
    state.sessions.revoke(token).await;
    Ok(())
}
