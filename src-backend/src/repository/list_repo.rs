//! List Repository
//!
//! SQLite-backed storage for shopping lists. Titles are unique per owner.

use async_trait::async_trait;
use rusqlite::{params, ErrorCode, OptionalExtension, Row};

use crate::domain::{now_millis, DomainError, DomainResult, ShoppingList};
use super::db::{internal, not_initialized, SharedConnection};
use super::traits::Repository;

const LIST_COLUMNS: &str = "id, title, owner_id, created_at, updated_at";

pub struct ListRepository {
    conn: SharedConnection,
}

impl ListRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Find a list only if it belongs to `owner_id`
    pub async fn find_owned(&self, list_id: &str, owner_id: &str) -> DomainResult<Option<ShoppingList>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.query_row(
            &format!("SELECT {} FROM lists WHERE id = ? AND owner_id = ?", LIST_COLUMNS),
            params![list_id, owner_id],
            row_to_list,
        )
        .optional()
        .map_err(internal)
    }

    /// All lists of an owner, most recently updated first
    pub async fn list_by_owner(&self, owner_id: &str) -> DomainResult<Vec<ShoppingList>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM lists WHERE owner_id = ? ORDER BY updated_at DESC, id",
                LIST_COLUMNS
            ))
            .map_err(internal)?;
        let lists = stmt
            .query_map(params![owner_id], row_to_list)
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;
        Ok(lists)
    }

    /// Set a new (already validated) title and bump `updated_at`
    pub async fn update_title(&self, list_id: &str, title: &str) -> DomainResult<ShoppingList> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn
            .execute(
                "UPDATE lists SET title = ?, updated_at = ? WHERE id = ?",
                params![title, now_millis(), list_id],
            )
            .map_err(|e| map_title_error(e, title))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("list {}", list_id)));
        }

        conn.query_row(
            &format!("SELECT {} FROM lists WHERE id = ?", LIST_COLUMNS),
            params![list_id],
            row_to_list,
        )
        .map_err(internal)
    }
}

#[async_trait]
impl Repository<ShoppingList> for ListRepository {
    async fn create(&self, entity: &ShoppingList) -> DomainResult<ShoppingList> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.execute(
            "INSERT INTO lists (id, title, owner_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            params![entity.id, entity.title, entity.owner_id, entity.created_at, entity.updated_at],
        )
        .map_err(|e| map_title_error(e, &entity.title))?;

        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<ShoppingList>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.query_row(
            &format!("SELECT {} FROM lists WHERE id = ?", LIST_COLUMNS),
            params![id],
            row_to_list,
        )
        .optional()
        .map_err(internal)
    }

    async fn update(&self, entity: &ShoppingList) -> DomainResult<ShoppingList> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let now = now_millis();
        let changed = conn
            .execute(
                "UPDATE lists SET title = ?, updated_at = ? WHERE id = ?",
                params![entity.title, now, entity.id],
            )
            .map_err(|e| map_title_error(e, &entity.title))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("list {}", entity.id)));
        }

        Ok(ShoppingList {
            updated_at: now,
            ..entity.clone()
        })
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        // items go with it (ON DELETE CASCADE)
        conn.execute("DELETE FROM lists WHERE id = ?", params![id])
            .map_err(internal)?;
        Ok(())
    }
}

fn map_title_error(e: rusqlite::Error, title: &str) -> DomainError {
    match e.sqlite_error_code() {
        Some(ErrorCode::ConstraintViolation) => {
            DomainError::Conflict(format!("a list named \"{}\" already exists", title))
        }
        _ => internal(e),
    }
}

/// Convert a database row to ShoppingList
fn row_to_list(row: &Row<'_>) -> rusqlite::Result<ShoppingList> {
    Ok(ShoppingList {
        id: row.get(0)?,
        title: row.get(1)?,
        owner_id: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
