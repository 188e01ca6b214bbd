//! Store Client
//!
//! The client's view of the item store, organized as one trait so the
//! controller can run against the in-process backend or a fake.

mod local;

use async_trait::async_trait;

use shoplist_backend_lib::domain::{DomainResult, ItemPatch};

use crate::models::{ListDetails, ShoppingList, ShoppingListItem};

pub use local::LocalBackend;

#[async_trait]
pub trait ItemStoreClient: Send + Sync {
    async fn get_list_details(&self, list_id: &str) -> DomainResult<ListDetails>;

    async fn update_list_title(&self, list_id: &str, title: &str) -> DomainResult<ShoppingList>;

    async fn create_item(&self, list_id: &str, name: &str) -> DomainResult<ShoppingListItem>;

    async fn update_item(&self, list_id: &str, item_id: &str, patch: ItemPatch) -> DomainResult<ShoppingListItem>;

    async fn delete_item(&self, list_id: &str, item_id: &str) -> DomainResult<()>;

    /// Merge free text into the list; returns the list and its items afterwards
    async fn merge_free_text(&self, list_id: &str, text: &str) -> DomainResult<ListDetails>;
}
