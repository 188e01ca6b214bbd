//! Database Connection and Setup
//!
//! Manages the SQLite connection and migrations.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult};

pub(crate) type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: SharedConnection,
    pub db_path: PathBuf,
}

impl DbState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            db_path,
        }
    }

    /// Shared handle for repositories
    pub fn shared(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub async fn is_open(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Drop the connection; repositories fail with "Database not initialized" afterwards
    pub async fn close(&self) {
        self.conn.lock().await.take();
    }
}

pub(crate) fn internal(e: rusqlite::Error) -> DomainError {
    DomainError::Unexpected(e.to_string())
}

pub(crate) fn not_initialized() -> DomainError {
    DomainError::Unexpected("Database not initialized".to_string())
}

/// Initialize database with path (":memory:" opens a private in-memory database)
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory().map_err(internal)?
    } else {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::Unexpected(format!("Failed to create db dir: {}", e)))?;
        }
        Connection::open(db_path).map_err(|e| DomainError::Unexpected(format!("Failed to open db: {}", e)))?
    };

    run_migrations(&conn)?;

    let state = DbState::new(db_path.to_path_buf());
    *state.conn.lock().await = Some(conn);
    log::info!("Database ready at {}", db_path.display());
    Ok(state)
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    let found = names.flatten().any(|name| name == column);
    found
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;").map_err(internal)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS lists (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 255),
            owner_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        (),
    )
    .map_err(internal)?;

    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_lists_owner_title ON lists(owner_id, title)",
        (),
    )
    .map_err(internal)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 128),
            purchased INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        (),
    )
    .map_err(internal)?;

    // Ordering column added after the first schema
    if !column_exists(conn, "items", "position") {
        conn.execute("ALTER TABLE items ADD COLUMN position INTEGER NOT NULL DEFAULT 0", ())
            .map_err(|e| DomainError::Unexpected(format!("Failed to add position: {}", e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_list ON items(list_id, position)",
        (),
    )
    .map_err(internal)?;

    Ok(())
}
