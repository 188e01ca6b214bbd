//! Shopping List Entity

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::error::{DomainError, DomainResult};
use super::item::ShoppingListItem;

/// Maximum title length, counted in characters after trimming
pub const TITLE_MAX_CHARS: usize = 255;

/// A shopping list owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ShoppingList {
    pub fn new(id: String, title: String, owner_id: String, now: i64) -> Self {
        Self {
            id,
            title,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for ShoppingList {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A list together with its items, as read in one go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDetails {
    pub list: ShoppingList,
    pub items: Vec<ShoppingListItem>,
}

/// Trim and check a title; returns the value to store
pub fn validate_title(title: &str) -> DomainResult<String> {
    let trimmed = title.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(DomainError::Validation("title must not be empty".into()));
    }
    if len > TITLE_MAX_CHARS {
        return Err(DomainError::Validation(format!(
            "title must be at most {} characters (got {})",
            TITLE_MAX_CHARS, len
        )));
    }
    Ok(trimmed.to_string())
}
