//! Shoplist Backend
//!
//! Layered architecture:
//! - domain: Core entities, error taxonomy and the pure merge diff
//! - repository: SQLite item store and session registry
//! - completion: Text-completion capability
//! - commands: Command handlers the client calls

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub mod commands;
pub mod completion;
pub mod config;
pub mod domain;
pub mod repository;

use completion::{HttpCompletionClient, TextCompletion};
use config::AppConfig;
use domain::{DomainError, DomainResult};
use repository::{init_db, DbState, ItemRepository, ListRepository, SessionRepository};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub list_repo: ListRepository,
    pub item_repo: ItemRepository,
    pub sessions: SessionRepository,
    pub completion: Arc<dyn TextCompletion>,
    pub config: AppConfig,
    merges: MergeGuard,
}

impl AppState {
    /// Open the database from `config` and wire the given completion capability
    pub async fn open(config: AppConfig, completion: Arc<dyn TextCompletion>) -> DomainResult<Self> {
        let db_state = init_db(&config.db_path).await?;
        let conn = db_state.shared();

        Ok(Self {
            list_repo: ListRepository::new(conn.clone()),
            item_repo: ItemRepository::new(conn),
            db_state,
            sessions: SessionRepository::new(),
            completion,
            config,
            merges: MergeGuard::default(),
        })
    }

    /// Same as `open`, talking to the configured HTTP completion endpoint
    pub async fn from_config(config: AppConfig) -> DomainResult<Self> {
        let completion = HttpCompletionClient::new(config.completion.clone())?;
        Self::open(config, Arc::new(completion)).await
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.config.session_ttl_secs)
    }

    pub(crate) fn begin_merge(&self, list_id: &str) -> DomainResult<MergePermit<'_>> {
        self.merges.acquire(list_id)
    }
}

/// Start file logging when the config names a log directory
pub fn init_logging(config: &AppConfig) {
    let Some(dir) = config.log_dir.clone() else {
        return;
    };
    match rolling_logger::init_logger(dir, "Shoplist") {
        Ok(()) => {
            let _ = rolling_logger::info(&format!("Store at {}", config.db_path.display()));
        }
        Err(e) => eprintln!("[{}] Logger init failed: {}", chrono::Local::now().format("%H:%M:%S%.3f"), e),
    }
}

/// Lists with a merge in progress; a second merge on the same list is refused
#[derive(Default)]
struct MergeGuard {
    in_flight: Mutex<HashSet<String>>,
}

impl MergeGuard {
    fn acquire(&self, list_id: &str) -> DomainResult<MergePermit<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .map_err(|_| DomainError::Unexpected("merge guard poisoned".into()))?;
        if !in_flight.insert(list_id.to_string()) {
            return Err(DomainError::Conflict(format!(
                "a merge for list {} is already in progress",
                list_id
            )));
        }
        Ok(MergePermit {
            guard: self,
            list_id: list_id.to_string(),
        })
    }
}

/// Releases the list when dropped
pub(crate) struct MergePermit<'a> {
    guard: &'a MergeGuard,
    list_id: String,
}

impl Drop for MergePermit<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.guard.in_flight.lock() {
            in_flight.remove(&self.list_id);
        }
    }
}
