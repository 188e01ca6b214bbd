//! Item Repository
//!
//! SQLite-backed storage for list items, including the atomic change-set
//! apply used by the merge reconciler.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::domain::{
    now_millis, validate_name, DomainError, DomainResult, MergeCandidate, ShoppingListItem,
};
use super::db::{internal, not_initialized, SharedConnection};
use super::traits::Repository;

const ITEM_COLUMNS: &str = "id, list_id, name, purchased, created_at, updated_at";

pub struct ItemRepository {
    conn: SharedConnection,
}

impl ItemRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Items of a list in display order
    pub async fn list_by_list(&self, list_id: &str) -> DomainResult<Vec<ShoppingListItem>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM items WHERE list_id = ? ORDER BY position ASC, created_at ASC, id ASC",
                ITEM_COLUMNS
            ))
            .map_err(internal)?;
        let items = stmt
            .query_map(params![list_id], row_to_item)
            .map_err(internal)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(internal)?;
        Ok(items)
    }

    /// Apply additions and deletions for one list in a single transaction.
    ///
    /// Either every deletion and insertion lands or none does. The list must
    /// belong to `owner_id` and every id in `to_delete` must be an item of the
    /// list; anything else aborts and is reported as `Transaction`.
    pub async fn apply_changes(
        &self,
        list_id: &str,
        owner_id: &str,
        to_add: &[MergeCandidate],
        to_delete: &[String],
    ) -> DomainResult<()> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;

        let tx = conn.transaction().map_err(transaction_error)?;

        let owned: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ? AND owner_id = ?)",
                params![list_id, owner_id],
                |row| row.get(0),
            )
            .map_err(transaction_error)?;
        if !owned {
            return Err(DomainError::Transaction(format!(
                "list {} is not owned by the caller",
                list_id
            )));
        }

        for item_id in to_delete {
            let deleted = tx
                .execute(
                    "DELETE FROM items WHERE id = ? AND list_id = ?",
                    params![item_id, list_id],
                )
                .map_err(transaction_error)?;
            if deleted == 0 {
                // dropping `tx` rolls back
                return Err(DomainError::Transaction(format!(
                    "item {} is no longer in list {}",
                    item_id, list_id
                )));
            }
        }

        let now = now_millis();
        let mut position: i64 = tx
            .query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM items WHERE list_id = ?",
                params![list_id],
                |row| row.get(0),
            )
            .map_err(transaction_error)?;

        for candidate in to_add {
            let name = validate_name(&candidate.name)
                .map_err(|e| DomainError::Transaction(e.to_string()))?;
            tx.execute(
                "INSERT INTO items (id, list_id, name, purchased, position, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![Uuid::new_v4().to_string(), list_id, name, candidate.purchased, position, now, now],
            )
            .map_err(transaction_error)?;
            position += 1;
        }

        tx.execute(
            "UPDATE lists SET updated_at = ? WHERE id = ?",
            params![now, list_id],
        )
        .map_err(transaction_error)?;

        tx.commit().map_err(transaction_error)?;

        log::debug!(
            "Applied change set to list {}: +{} -{}",
            list_id,
            to_add.len(),
            to_delete.len()
        );
        Ok(())
    }
}

#[async_trait]
impl Repository<ShoppingListItem> for ItemRepository {
    async fn create(&self, entity: &ShoppingListItem) -> DomainResult<ShoppingListItem> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let position: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(position), -1) + 1 FROM items WHERE list_id = ?",
                params![entity.list_id],
                |row| row.get(0),
            )
            .map_err(internal)?;

        conn.execute(
            "INSERT INTO items (id, list_id, name, purchased, position, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entity.id,
                entity.list_id,
                entity.name,
                entity.purchased,
                position,
                entity.created_at,
                entity.updated_at
            ],
        )
        .map_err(internal)?;

        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<ShoppingListItem>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.query_row(
            &format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS),
            params![id],
            row_to_item,
        )
        .optional()
        .map_err(internal)
    }

    async fn update(&self, entity: &ShoppingListItem) -> DomainResult<ShoppingListItem> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        // list_id is immutable
        let now = now_millis();
        let changed = conn
            .execute(
                "UPDATE items SET name = ?, purchased = ?, updated_at = ? WHERE id = ?",
                params![entity.name, entity.purchased, now, entity.id],
            )
            .map_err(internal)?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("item {}", entity.id)));
        }

        Ok(ShoppingListItem {
            updated_at: now,
            ..entity.clone()
        })
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let deleted = conn
            .execute("DELETE FROM items WHERE id = ?", params![id])
            .map_err(internal)?;
        if deleted == 0 {
            return Err(DomainError::NotFound(format!("item {}", id)));
        }
        Ok(())
    }
}

fn transaction_error(e: rusqlite::Error) -> DomainError {
    DomainError::Transaction(e.to_string())
}

/// Convert a database row to ShoppingListItem
fn row_to_item(row: &Row<'_>) -> rusqlite::Result<ShoppingListItem> {
    Ok(ShoppingListItem {
        id: row.get(0)?,
        list_id: row.get(1)?,
        name: row.get(2)?,
        purchased: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
