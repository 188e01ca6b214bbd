//! Shoplist Client
//!
//! Keeps the view of one shopping list in sync with the store:
//! - models/store: view model types and the in-memory list state
//! - controller: optimistic mutations with rollback
//! - commands: the store client trait and the in-process backend
//! - context: injected capabilities (store, notifications, session)

pub mod cancel;
pub mod commands;
pub mod context;
pub mod controller;
pub mod models;
pub mod notify;
pub mod retry;
pub mod store;


use std::path::Path;
use std::sync::Arc;

use shoplist_backend_lib::config::{load_config, CONFIG_FILE_NAME};
use shoplist_backend_lib::domain::{DomainResult, Session};
use shoplist_backend_lib::{commands as backend, init_logging, AppState};

use context::{AppContext, SessionProvider, SharedSession};
use notify::{LogNotifier, NotificationSink};

/// Client wired to a backend running in the same process
pub struct LocalApp {
    pub state: Arc<AppState>,
    pub session: SharedSession,
    pub context: AppContext,
}

impl LocalApp {
    /// Load `shoplist_config.json` from `config_dir`, start logging and open the store
    pub async fn start(config_dir: &Path) -> DomainResult<Self> {
        let config = load_config(&config_dir.join(CONFIG_FILE_NAME))?;
        init_logging(&config);
        log::info!("Opening store at {}", config.db_path.display());

        let state = AppState::from_config(config).await?;
        Ok(Self::with_state(Arc::new(state), Arc::new(LogNotifier)))
    }

    pub fn with_state(state: Arc<AppState>, notifier: Arc<dyn NotificationSink>) -> Self {
        let session = SharedSession::new();
        let context = AppContext::local(state.clone(), Arc::new(session.clone()), notifier);
        Self { state, session, context }
    }

    pub async fn sign_in(&self, owner_id: &str) -> DomainResult<Session> {
        let session = backend::sign_in(&self.state, owner_id).await?;
        self.session.set(session.token.clone());
        Ok(session)
    }

    pub async fn sign_out(&self) -> DomainResult<()> {
        if let Some(token) = self.session.token() {
            backend::sign_out(&self.state, &token).await?;
        }
        self.session.clear();
        Ok(())
    }

    /// Sign out and release the store connection
    pub async fn shutdown(&self) -> DomainResult<()> {
        self.sign_out().await?;
        self.state.db_state.close().await;
        log::info!("Store closed");
        Ok(())
    }
}
