//! Commands Layer
//!
//! Command handlers that bridge the client to the backend services.
//! Every list-scoped command resolves the session first and only touches
//! lists owned by the session's user.

mod item_cmd;
mod list_cmd;
mod merge_cmd;
mod session_cmd;

#[cfg(test)]
mod tests;

pub use item_cmd::*;
pub use list_cmd::*;
pub use merge_cmd::*;
pub use session_cmd::*;

use crate::domain::{DomainError, DomainResult, Session, ShoppingList};
use crate::AppState;

/// Resolve the session and load a list it owns
pub(crate) async fn owned_list(state: &AppState, token: &str, list_id: &str) -> DomainResult<(Session, ShoppingList)> {
    let session = state.sessions.resolve(token).await?;
    let list = state
        .list_repo
        .find_owned(list_id, &session.owner_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("list {}", list_id)))?;
    Ok((session, list))
}
