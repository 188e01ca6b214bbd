//! Application Context
//!
//! The capabilities shared by every list view, injected once at startup.

use std::sync::{Arc, RwLock};

use shoplist_backend_lib::AppState;

use crate::commands::{ItemStoreClient, LocalBackend};
use crate::controller::ListController;
use crate::notify::NotificationSink;
use crate::retry::RetryPolicy;

/// Source of the current session token
pub trait SessionProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Session token that can be swapped on sign-in and sign-out
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    token: Arc<RwLock<Option<String>>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl SessionProvider for SharedSession {
    fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn ItemStoreClient>,
    pub notifier: Arc<dyn NotificationSink>,
    /// Retry budget for list loads
    pub retry: RetryPolicy,
}

impl AppContext {
    pub fn new(store: Arc<dyn ItemStoreClient>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            notifier,
            retry: RetryPolicy::auth_refresh(),
        }
    }

    /// Context talking to an in-process backend
    pub fn local(state: Arc<AppState>, session: Arc<dyn SessionProvider>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self::new(Arc::new(LocalBackend::new(state, session)), notifier)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// A fresh controller for one list view
    pub fn controller_for(&self, list_id: &str) -> ListController {
        ListController::new(list_id, self.store.clone(), self.notifier.clone(), self.retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_session_set_and_clear() {
        let session = SharedSession::new();
        assert_eq!(session.token(), None);

        let clone = session.clone();
        session.set("abc");
        assert_eq!(clone.token().as_deref(), Some("abc"));

        clone.clear();
        assert_eq!(session.token(), None);
    }
}
