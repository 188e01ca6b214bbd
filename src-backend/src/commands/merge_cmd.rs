//! Merge Command
//!
//! Free-text edit -> completion -> diff -> atomic apply -> fresh read.

use crate::completion::{build_request, parse_target_list};
use crate::domain::{compute_diff, DomainError, DomainResult, ListDetails};
use crate::AppState;
use super::owned_list;

/// Merge a free-text edit into a list and return the list as re-read afterwards.
///
/// The store is only touched by the final atomic apply; any earlier failure
/// (session, ownership, completion, payload) leaves it unchanged. A second
/// merge for the same list while one is running fails with `Conflict`.
pub async fn merge_free_text(
    state: &AppState,
    token: &str,
    list_id: &str,
    text: &str,
) -> DomainResult<ListDetails> {
    let (session, list) = owned_list(state, token, list_id).await?;
    if text.trim().is_empty() {
        return Err(DomainError::Validation("text must not be empty".into()));
    }

    let _permit = state.begin_merge(list_id)?;

    let current = state.item_repo.list_by_list(list_id).await?;
    let completion = state.completion.complete(build_request(&current, text)).await?;
    let target = parse_target_list(&completion, state.config.completion.max_products).map_err(|e| {
        log::warn!("Rejected completion for list {}: {}", list_id, e);
        DomainError::from(e)
    })?;

    let diff = compute_diff(&current, &target);
    if !diff.is_empty() {
        state
            .item_repo
            .apply_changes(list_id, &session.owner_id, &diff.to_add, &diff.to_delete)
            .await
            .map_err(|e| match e {
                DomainError::Transaction(_) => e,
                other => DomainError::Transaction(other.to_string()),
            })?;
    }

    log::info!(
        "Merged text into list {}: {} added, {} deleted, {} kept",
        list_id,
        diff.to_add.len(),
        diff.to_delete.len(),
        current.len() - diff.to_delete.len()
    );

    // the apply bumped updated_at
    let list = if diff.is_empty() {
        list
    } else {
        state
            .list_repo
            .find_owned(list_id, &session.owner_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("list {}", list_id)))?
    };
    let items = state.item_repo.list_by_list(list_id).await?;
    Ok(ListDetails { list, items })
}
