//! Item Commands

use uuid::Uuid;

use crate::domain::{
    now_millis, validate_name, DomainError, DomainResult, ItemPatch, ShoppingListItem,
};
use crate::repository::Repository;
use crate::AppState;
use super::owned_list;

/// Create an item in a list
pub async fn create_item(
    state: &AppState,
    token: &str,
    list_id: &str,
    name: &str,
    purchased: bool,
) -> DomainResult<ShoppingListItem> {
    let name = validate_name(name)?;
    owned_list(state, token, list_id).await?;

    let item = ShoppingListItem::new(Uuid::new_v4().to_string(), list_id.to_string(), name, purchased, now_millis());
    state.item_repo.create(&item).await
}

/// Update name and/or purchased status of an item
pub async fn update_item(
    state: &AppState,
    token: &str,
    list_id: &str,
    item_id: &str,
    patch: ItemPatch,
) -> DomainResult<ShoppingListItem> {
    if patch.is_empty() {
        return Err(DomainError::Validation("nothing to update".into()));
    }
    let name = patch.name.as_deref().map(validate_name).transpose()?;
    owned_list(state, token, list_id).await?;

    let mut item = find_item_in_list(state, list_id, item_id).await?;
    if let Some(name) = name {
        item.name = name;
    }
    if let Some(purchased) = patch.purchased {
        item.purchased = purchased;
    }
    state.item_repo.update(&item).await
}

/// Delete an item from a list
pub async fn delete_item(state: &AppState, token: &str, list_id: &str, item_id: &str) -> DomainResult<()> {
    owned_list(state, token, list_id).await?;
    let item = find_item_in_list(state, list_id, item_id).await?;
    state.item_repo.delete(&item.id).await
}

async fn find_item_in_list(state: &AppState, list_id: &str, item_id: &str) -> DomainResult<ShoppingListItem> {
    state
        .item_repo
        .find_by_id(&item_id.to_string())
        .await?
        .filter(|item| item.list_id == list_id)
        .ok_or_else(|| DomainError::NotFound(format!("item {}", item_id)))
}
