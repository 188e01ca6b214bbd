//! Client Models
//!
//! Backend entities plus the client-only state wrapped around them.

use serde::Serialize;
use uuid::Uuid;

use shoplist_backend_lib::domain::{now_millis, DomainError};
pub use shoplist_backend_lib::domain::{ListDetails, ShoppingList, ShoppingListItem};

/// Prefix of ids handed to items that the store has not confirmed yet
pub const PLACEHOLDER_ID_PREFIX: &str = "temp-";

/// Flags that only drive the UI; never sent to the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransientState {
    pub is_editing_name: bool,
    pub is_updating: bool,
}

/// An item as shown by the list view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModelItem {
    #[serde(flatten)]
    pub item: ShoppingListItem,
    #[serde(skip)]
    pub transient: TransientState,
}

impl ViewModelItem {
    pub fn from_server(item: ShoppingListItem) -> Self {
        Self {
            item,
            transient: TransientState::default(),
        }
    }

    /// Stand-in for an item whose insert is still in flight
    pub fn placeholder(list_id: &str, name: &str) -> Self {
        let id = format!("{}{}", PLACEHOLDER_ID_PREFIX, Uuid::new_v4());
        let mut view = Self::from_server(ShoppingListItem::new(id, list_id.to_string(), name.to_string(), false, now_millis()));
        view.transient.is_updating = true;
        view
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn is_placeholder(&self) -> bool {
        self.item.id.starts_with(PLACEHOLDER_ID_PREFIX)
    }

    /// Same item with both transient flags reset
    pub fn settled(mut self) -> Self {
        self.transient = TransientState::default();
        self
    }
}

/// Sync state of one list view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SyncPhase {
    #[default]
    Loading,
    Ready,
    Mutating,
    Error,
}

/// What the UI renders for one list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot {
    pub id: String,
    pub title: Option<String>,
    pub items: Vec<ViewModelItem>,
    pub is_loading: bool,
    pub is_updating: bool,
    pub error: Option<DomainError>,
    pub phase: SyncPhase,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_ids_are_unique_and_marked() {
        let a = ViewModelItem::placeholder("l", "apples");
        let b = ViewModelItem::placeholder("l", "apples");
        assert!(a.is_placeholder());
        assert!(a.transient.is_updating);
        assert_ne!(a.id(), b.id());
        assert!(!ViewModelItem::from_server(ShoppingListItem::new("x".into(), "l".into(), "a".into(), false, 0)).is_placeholder());
    }

    #[test]
    fn test_transient_flags_are_not_serialized() {
        let mut view = ViewModelItem::from_server(ShoppingListItem::new("1".into(), "l".into(), "milk".into(), true, 7));
        view.transient.is_editing_name = true;

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "milk");
        assert_eq!(json["purchased"], true);
        assert!(json.get("transient").is_none());
        assert!(json.get("isEditingName").is_none());
    }
}
