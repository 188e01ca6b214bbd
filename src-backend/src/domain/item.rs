//! Shopping List Item Entity
//!
//! An item belongs to exactly one list. Its id survives renames and
//! purchase toggles and only changes on delete + recreate.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::error::{DomainError, DomainResult};

/// Maximum item name length, counted in characters after trimming
pub const NAME_MAX_CHARS: usize = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    pub id: String,
    pub list_id: String,
    pub name: String,
    pub purchased: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ShoppingListItem {
    pub fn new(id: String, list_id: String, name: String, purchased: bool, now: i64) -> Self {
        Self {
            id,
            list_id,
            name,
            purchased,
            created_at: now,
            updated_at: now,
        }
    }

    /// Key used to match this item by name across item sets
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl Entity for ShoppingListItem {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update for an item; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
}

impl ItemPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            purchased: None,
        }
    }

    pub fn purchased(purchased: bool) -> Self {
        Self {
            name: None,
            purchased: Some(purchased),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.purchased.is_none()
    }
}

/// Trim + case-fold
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim and check an item name; returns the value to store
pub fn validate_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(DomainError::Validation("item name must not be empty".into()));
    }
    if len > NAME_MAX_CHARS {
        return Err(DomainError::Validation(format!(
            "item name must be at most {} characters (got {})",
            NAME_MAX_CHARS, len
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_creation() {
        let item = ShoppingListItem::new("i1".into(), "l1".into(), "Milk".into(), false, 10);
        assert_eq!(item.id(), "i1");
        assert_eq!(item.created_at, item.updated_at);
        assert!(!item.purchased);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Whole MILK "), "whole milk");
        assert_eq!(normalize_name("eggs"), normalize_name("EGGS"));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name(" Apples ").unwrap(), "Apples");
        assert!(validate_name(" \t").unwrap_err().is_validation());
        assert!(validate_name(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_patch_serialization_skips_unset() {
        let json = serde_json::to_string(&ItemPatch::purchased(true)).unwrap();
        assert_eq!(json, r#"{"purchased":true}"#);
        assert!(ItemPatch::default().is_empty());
    }
}
