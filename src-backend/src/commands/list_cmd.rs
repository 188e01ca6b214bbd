//! List Commands

use uuid::Uuid;

use crate::domain::{now_millis, validate_title, DomainResult, ListDetails, ShoppingList};
use crate::repository::Repository;
use crate::AppState;
use super::owned_list;

/// Create a new list for the session owner
pub async fn create_list(state: &AppState, token: &str, title: &str) -> DomainResult<ShoppingList> {
    let title = validate_title(title)?;
    let session = state.sessions.resolve(token).await?;

    let list = ShoppingList::new(Uuid::new_v4().to_string(), title, session.owner_id, now_millis());
    state.list_repo.create(&list).await
}

/// All lists of the session owner
pub async fn list_lists(state: &AppState, token: &str) -> DomainResult<Vec<ShoppingList>> {
    let session = state.sessions.resolve(token).await?;
    state.list_repo.list_by_owner(&session.owner_id).await
}

/// A list with all its items
pub async fn get_list_details(state: &AppState, token: &str, list_id: &str) -> DomainResult<ListDetails> {
    let (_, list) = owned_list(state, token, list_id).await?;
    let items = state.item_repo.list_by_list(list_id).await?;
    Ok(ListDetails { list, items })
}

/// Rename a list; the stored title is the trimmed input
pub async fn update_list_title(state: &AppState, token: &str, list_id: &str, title: &str) -> DomainResult<ShoppingList> {
    let title = validate_title(title)?;
    let (_, list) = owned_list(state, token, list_id).await?;
    if list.title == title {
        return Ok(list);
    }
    state.list_repo.update_title(list_id, &title).await
}

/// Delete a list and its items
pub async fn delete_list(state: &AppState, token: &str, list_id: &str) -> DomainResult<()> {
    let (_, list) = owned_list(state, token, list_id).await?;
    state.list_repo.delete(&list.id).await?;
    log::info!("Deleted list {}", list_id);
    Ok(())
}
