//! List View State
//!
//! The in-memory view model of one list and the helpers the controller
//! uses to mutate it. Nothing here talks to the store.

use shoplist_backend_lib::domain::{DomainError, DomainResult};

use crate::models::{ListDetails, ListSnapshot, ShoppingList, ShoppingListItem, SyncPhase, ViewModelItem};

/// The view a load or mutation started against. Settling with a ticket from
/// a list the view has since left is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewTicket {
    pub list_id: String,
    epoch: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ListDetailsState {
    pub list_id: String,
    pub list: Option<ShoppingList>,
    pub items: Vec<ViewModelItem>,
    pub phase: SyncPhase,
    pub error: Option<DomainError>,
    /// Mutations started and not yet resolved
    pending: usize,
    /// Bumped every time the view switches list
    epoch: u64,
}

impl ListDetailsState {
    pub fn new(list_id: impl Into<String>) -> Self {
        Self {
            list_id: list_id.into(),
            ..Default::default()
        }
    }

    /// Enter `Loading`; switching to another list drops the old view model
    pub fn begin_load(&mut self, list_id: &str) -> ViewTicket {
        if self.list_id != list_id {
            let epoch = self.epoch.wrapping_add(1);
            *self = Self::new(list_id);
            self.epoch = epoch;
        }
        self.phase = SyncPhase::Loading;
        self.error = None;
        self.ticket()
    }

    fn ticket(&self) -> ViewTicket {
        ViewTicket {
            list_id: self.list_id.clone(),
            epoch: self.epoch,
        }
    }

    /// The state itself while `ticket` still names the list on screen
    pub fn current(&mut self, ticket: &ViewTicket) -> Option<&mut Self> {
        if ticket.epoch == self.epoch && ticket.list_id == self.list_id {
            Some(self)
        } else {
            log::debug!("Dropping result for list {}; view moved to {}", ticket.list_id, self.list_id);
            None
        }
    }

    /// Replace the whole view model with a fresh read
    pub fn replace_all(&mut self, details: ListDetails) {
        self.list = Some(details.list);
        self.replace_items(details.items);
    }

    pub fn replace_items(&mut self, items: Vec<ShoppingListItem>) {
        self.items = items.into_iter().map(ViewModelItem::from_server).collect();
    }

    pub fn begin_mutation(&mut self) -> ViewTicket {
        self.pending += 1;
        self.phase = SyncPhase::Mutating;
        self.error = None;
        self.ticket()
    }

    /// Record how a load or mutation resolved
    pub fn finish<T>(&mut self, result: &DomainResult<T>) {
        self.pending = self.pending.saturating_sub(1);
        match result {
            Err(err) => {
                self.phase = SyncPhase::Error;
                self.error = Some(err.clone());
            }
            Ok(_) if self.pending == 0 && self.phase != SyncPhase::Error => self.phase = SyncPhase::Ready,
            Ok(_) => {}
        }
    }

    /// Adopt a fresh read as the whole view model
    pub fn loaded(&mut self, details: ListDetails) {
        self.replace_all(details);
        self.phase = if self.pending > 0 { SyncPhase::Mutating } else { SyncPhase::Ready };
    }

    pub fn load_failed(&mut self, err: &DomainError) {
        self.phase = SyncPhase::Error;
        self.error = Some(err.clone());
    }

    pub fn item(&self, item_id: &str) -> Option<&ViewModelItem> {
        self.items.iter().find(|item| item.id() == item_id)
    }

    /// Apply `f` to an item by ID; returns the item as it was before
    pub fn update_item(&mut self, item_id: &str, f: impl FnOnce(&mut ViewModelItem)) -> Option<ViewModelItem> {
        let item = self.items.iter_mut().find(|item| item.id() == item_id)?;
        let before = item.clone();
        f(item);
        Some(before)
    }

    /// Put `replacement` where the item with `item_id` is; false if it is gone
    pub fn replace_item(&mut self, item_id: &str, replacement: ViewModelItem) -> bool {
        match self.items.iter_mut().find(|item| item.id() == item_id) {
            Some(item) => {
                *item = replacement;
                true
            }
            None => false,
        }
    }

    /// Remove an item by ID, returning it with its index
    pub fn remove_item(&mut self, item_id: &str) -> Option<(usize, ViewModelItem)> {
        let index = self.items.iter().position(|item| item.id() == item_id)?;
        Some((index, self.items.remove(index)))
    }

    /// Insert at `index`, or at the end if the list has shrunk since
    pub fn insert_item_at(&mut self, index: usize, item: ViewModelItem) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    pub fn push_item(&mut self, item: ViewModelItem) {
        self.items.push(item);
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            id: self.list_id.clone(),
            title: self.list.as_ref().map(|list| list.title.clone()),
            items: self.items.clone(),
            is_loading: self.phase == SyncPhase::Loading,
            is_updating: self.phase == SyncPhase::Mutating || self.items.iter().any(|item| item.transient.is_updating),
            error: self.error.clone(),
            phase: self.phase,
        }
    }
}
