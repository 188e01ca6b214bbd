//! In-process Backend
//!
//! Calls the backend command handlers directly, authenticated with the
//! token of the current session.

use std::sync::Arc;

use async_trait::async_trait;

use shoplist_backend_lib::commands;
use shoplist_backend_lib::domain::{DomainError, DomainResult, ItemPatch};
use shoplist_backend_lib::AppState;

use super::ItemStoreClient;
use crate::context::SessionProvider;
use crate::models::{ListDetails, ShoppingList, ShoppingListItem};

pub struct LocalBackend {
    state: Arc<AppState>,
    session: Arc<dyn SessionProvider>,
}

impl LocalBackend {
    pub fn new(state: Arc<AppState>, session: Arc<dyn SessionProvider>) -> Self {
        Self { state, session }
    }

    fn token(&self) -> DomainResult<String> {
        self.session
            .token()
            .ok_or_else(|| DomainError::NotAuthenticated("no active session".into()))
    }
}

#[async_trait]
impl ItemStoreClient for LocalBackend {
    async fn get_list_details(&self, list_id: &str) -> DomainResult<ListDetails> {
        commands::get_list_details(&self.state, &self.token()?, list_id).await
    }

    async fn update_list_title(&self, list_id: &str, title: &str) -> DomainResult<ShoppingList> {
        commands::update_list_title(&self.state, &self.token()?, list_id, title).await
    }

    async fn create_item(&self, list_id: &str, name: &str) -> DomainResult<ShoppingListItem> {
        commands::create_item(&self.state, &self.token()?, list_id, name, false).await
    }

    async fn update_item(&self, list_id: &str, item_id: &str, patch: ItemPatch) -> DomainResult<ShoppingListItem> {
        commands::update_item(&self.state, &self.token()?, list_id, item_id, patch).await
    }

    async fn delete_item(&self, list_id: &str, item_id: &str) -> DomainResult<()> {
        commands::delete_item(&self.state, &self.token()?, list_id, item_id).await
    }

    async fn merge_free_text(&self, list_id: &str, text: &str) -> DomainResult<ListDetails> {
        commands::merge_free_text(&self.state, &self.token()?, list_id, text).await
    }
}
