//! List Controller
//!
//! Optimistic view model of one list. Local state changes first, the store
//! call follows, and a failed call puts the view model back the way it was.
//! Every store call and retry wait goes through the controller's cancel
//! token, so `teardown` resolves in-flight work with `Cancelled`.

use std::sync::{Arc, Mutex, MutexGuard};

use shoplist_backend_lib::domain::{validate_name, validate_title, DomainError, DomainResult, ItemPatch};

use crate::cancel::{cancel_pair, CancelHandle, CancelToken};
use crate::commands::ItemStoreClient;
use crate::models::{ListDetails, ListSnapshot, ShoppingList, ShoppingListItem, ViewModelItem};
use crate::notify::NotificationSink;
use crate::retry::RetryPolicy;
use crate::store::{ListDetailsState, ViewTicket};

/// How a batch of `add_items` went, item by item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddItemsOutcome {
    pub added: Vec<ShoppingListItem>,
    /// Trimmed name and the error it was rejected or failed with
    pub failed: Vec<(String, DomainError)>,
}

pub struct ListController {
    store: Arc<dyn ItemStoreClient>,
    notifier: Arc<dyn NotificationSink>,
    retry: RetryPolicy,
    cancel_handle: CancelHandle,
    cancel: CancelToken,
    state: Mutex<ListDetailsState>,
}

impl ListController {
    pub fn new(
        list_id: &str,
        store: Arc<dyn ItemStoreClient>,
        notifier: Arc<dyn NotificationSink>,
        retry: RetryPolicy,
    ) -> Self {
        let (cancel_handle, cancel) = cancel_pair();
        Self {
            store,
            notifier,
            retry,
            cancel_handle,
            cancel,
            state: Mutex::new(ListDetailsState::new(list_id)),
        }
    }

    // The guard is never held across an await.
    fn state(&self) -> MutexGuard<'_, ListDetailsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.state().snapshot()
    }

    /// The list header as last confirmed by the store
    pub fn list(&self) -> Option<ShoppingList> {
        self.state().list.clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel_handle.clone()
    }

    /// Cancel everything in flight; the view is going away
    pub fn teardown(&self) {
        log::debug!("Tearing down list view {}", self.state().list_id);
        self.cancel_handle.cancel();
    }

    fn begin_mutation(&self) -> ViewTicket {
        self.state().begin_mutation()
    }

    fn report_error(&self, title: &str, err: &DomainError) {
        match err {
            DomainError::Cancelled => log::debug!("{}: cancelled", title),
            DomainError::Validation(_) => log::debug!("{}: {}", title, err),
            _ => {
                log::warn!("{}: {}", title, err);
                self.notifier.notify_error(title, &err.to_string());
            }
        }
    }

    fn not_found(item_id: &str) -> DomainError {
        DomainError::NotFound(format!("item {}", item_id))
    }

    // ========================
    // Loading
    // ========================

    /// Load `list_id` and replace the whole view model with it.
    /// Authentication failures are retried per the controller's policy.
    pub async fn fetch_details(&self, list_id: &str) -> DomainResult<()> {
        let ticket = self.state().begin_load(list_id);

        let store = &self.store;
        let result = self
            .retry
            .run(&self.cancel, move |attempt| {
                log::debug!("Loading list {} (attempt {})", list_id, attempt);
                store.get_list_details(list_id)
            })
            .await;

        match result {
            Ok(details) => {
                log::info!("Loaded list {} with {} items", list_id, details.items.len());
                if let Some(state) = self.state().current(&ticket) {
                    state.loaded(details);
                }
                Ok(())
            }
            Err(err) => {
                if let Some(state) = self.state().current(&ticket) {
                    state.load_failed(&err);
                }
                self.report_error("Failed to load list", &err);
                Err(err)
            }
        }
    }

    // ========================
    // Title
    // ========================

    /// Rename the list. Not optimistic: the title changes once the store confirms.
    pub async fn update_title(&self, new_title: &str) -> DomainResult<ShoppingList> {
        let title = validate_title(new_title)?;
        let ticket = self.begin_mutation();

        let result = self.cancel.guard(self.store.update_list_title(&ticket.list_id, &title)).await;
        if let Some(state) = self.state().current(&ticket) {
            if let Ok(list) = &result {
                state.list = Some(list.clone());
            }
            state.finish(&result);
        }

        match &result {
            Ok(list) => self.notifier.notify_success("Title updated", &list.title),
            Err(err) => self.report_error("Failed to update title", err),
        }
        result
    }

    // ========================
    // Items
    // ========================

    pub async fn toggle_item_purchased(&self, item_id: &str) -> DomainResult<ShoppingListItem> {
        let (ticket, original) = {
            let mut state = self.state();
            let original = state
                .update_item(item_id, |view| {
                    view.item.purchased = !view.item.purchased;
                    view.transient.is_updating = true;
                })
                .ok_or_else(|| Self::not_found(item_id))?;
            (state.begin_mutation(), original)
        };

        let patch = ItemPatch::purchased(!original.item.purchased);
        let result = self.cancel.guard(self.store.update_item(&ticket.list_id, item_id, patch)).await;
        self.settle_item(&ticket, item_id, original, &result);

        if let Err(err) = &result {
            self.report_error("Failed to update item", err);
        }
        result
    }

    pub async fn delete_item(&self, item_id: &str) -> DomainResult<()> {
        let (ticket, index, removed) = {
            let mut state = self.state();
            let (index, removed) = state.remove_item(item_id).ok_or_else(|| Self::not_found(item_id))?;
            (state.begin_mutation(), index, removed)
        };

        let result = self.cancel.guard(self.store.delete_item(&ticket.list_id, item_id)).await;
        if let Some(state) = self.state().current(&ticket) {
            if result.is_err() {
                state.insert_item_at(index, removed.clone().settled());
            }
            state.finish(&result);
        }

        match &result {
            Ok(()) => self.notifier.notify_success("Item deleted", &removed.item.name),
            Err(err) => self.report_error("Failed to delete item", err),
        }
        result
    }

    /// Rename an item. Unchanged names succeed without a request.
    pub async fn update_item_name(&self, item_id: &str, new_name: &str) -> DomainResult<ShoppingListItem> {
        let name = validate_name(new_name)?;
        let (ticket, original) = {
            let mut state = self.state();
            let current = state.item(item_id).ok_or_else(|| Self::not_found(item_id))?;
            if current.item.name == name {
                return Ok(current.item.clone());
            }
            let original = state
                .update_item(item_id, |view| {
                    view.item.name = name.clone();
                    view.transient.is_updating = true;
                })
                .ok_or_else(|| Self::not_found(item_id))?;
            (state.begin_mutation(), original)
        };

        let result = self
            .cancel
            .guard(self.store.update_item(&ticket.list_id, item_id, ItemPatch::name(name)))
            .await;
        self.settle_item(&ticket, item_id, original, &result);

        if let Err(err) = &result {
            self.report_error("Failed to rename item", err);
        }
        result
    }

    /// Server value on success, the untouched original on failure
    fn settle_item(
        &self,
        ticket: &ViewTicket,
        item_id: &str,
        original: ViewModelItem,
        result: &DomainResult<ShoppingListItem>,
    ) {
        let settled = match result {
            Ok(item) => ViewModelItem::from_server(item.clone()),
            Err(_) => original.settled(),
        };
        if let Some(state) = self.state().current(ticket) {
            state.replace_item(item_id, settled);
            state.finish(result);
        }
    }

    pub fn set_editing_name(&self, item_id: &str, editing: bool) -> DomainResult<()> {
        self.state()
            .update_item(item_id, |view| view.transient.is_editing_name = editing)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(item_id))
    }

    /// Add items one store call at a time so each failure maps to one name.
    ///
    /// Blank names are skipped and names that fail validation are reported
    /// in the outcome without a request. Every remaining name shows up at
    /// once as a placeholder, which is swapped for the stored item or dropped
    /// when its insert resolves. Partial failure is reported through the
    /// outcome and both notifications; only cancellation makes this return `Err`.
    pub async fn add_items<S: AsRef<str>>(&self, names: &[S]) -> DomainResult<AddItemsOutcome> {
        let mut outcome = AddItemsOutcome::default();
        let mut valid = Vec::new();
        for name in names.iter().map(|name| name.as_ref().trim()).filter(|name| !name.is_empty()) {
            match validate_name(name) {
                Ok(name) => valid.push(name),
                Err(err) => {
                    log::debug!("Skipping item name: {}", err);
                    outcome.failed.push((name.to_string(), err));
                }
            }
        }
        if valid.is_empty() {
            return Ok(outcome);
        }

        let (ticket, pending) = {
            let mut state = self.state();
            let list_id = state.list_id.clone();
            let pending: Vec<(String, String)> = valid
                .into_iter()
                .map(|name| {
                    let placeholder = ViewModelItem::placeholder(&list_id, &name);
                    let temp_id = placeholder.id().to_string();
                    state.push_item(placeholder);
                    (temp_id, name)
                })
                .collect();
            (state.begin_mutation(), pending)
        };

        let rejected = outcome.failed.len();
        let mut insert_error = None;
        for (temp_id, name) in &pending {
            let result = self.cancel.guard(self.store.create_item(&ticket.list_id, name)).await;
            let mut guard = self.state();
            let state = guard.current(&ticket);
            match result {
                Ok(item) => {
                    if let Some(state) = state {
                        state.replace_item(temp_id, ViewModelItem::from_server(item.clone()));
                    }
                    outcome.added.push(item);
                }
                Err(DomainError::Cancelled) => {
                    if let Some(state) = state {
                        for (temp_id, _) in &pending {
                            state.remove_item(temp_id);
                        }
                        state.finish::<()>(&Err(DomainError::Cancelled));
                    }
                    return Err(DomainError::Cancelled);
                }
                Err(err) => {
                    log::warn!("Failed to add \"{}\" to list {}: {}", name, ticket.list_id, err);
                    if let Some(state) = state {
                        state.remove_item(temp_id);
                    }
                    insert_error = Some(err.clone());
                    outcome.failed.push((name.clone(), err));
                }
            }
        }

        if let Some(state) = self.state().current(&ticket) {
            match &insert_error {
                Some(err) => state.finish::<()>(&Err(err.clone())),
                None => state.finish::<()>(&Ok(())),
            }
        }

        if !outcome.added.is_empty() {
            let names: Vec<&str> = outcome.added.iter().map(|item| item.name.as_str()).collect();
            self.notifier
                .notify_success("Items added", &format!("Added {} item(s): {}", names.len(), names.join(", ")));
        }
        if insert_error.is_some() {
            let detail: Vec<String> = outcome.failed[rejected..]
                .iter()
                .map(|(name, err)| format!("{}: {}", name, err))
                .collect();
            self.notifier.notify_error("Failed to add items", &detail.join("; "));
        }
        Ok(outcome)
    }

    // ========================
    // Free-text merge
    // ========================

    /// Merge a free-text edit through the store and adopt the re-read list wholesale
    pub async fn apply_free_text(&self, text: &str) -> DomainResult<ListDetails> {
        if text.trim().is_empty() {
            return Err(DomainError::Validation("text must not be empty".into()));
        }
        let ticket = self.begin_mutation();

        let result = self.cancel.guard(self.store.merge_free_text(&ticket.list_id, text)).await;
        if let Some(state) = self.state().current(&ticket) {
            if let Ok(details) = &result {
                state.replace_all(details.clone());
            }
            state.finish(&result);
        }

        match &result {
            Ok(details) => self
                .notifier
                .notify_success("List updated", &format!("The list now has {} item(s)", details.items.len())),
            Err(err) => self.report_error("Failed to update list", err),
        }
        result
    }
}
