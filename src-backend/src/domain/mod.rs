//! Domain Layer
//!
//! Contains all domain entities, the error taxonomy and the pure merge logic.
//! This layer has NO I/O (serde and chrono only).

mod entity;
mod error;
mod item;
mod list;
mod merge;
mod session;

pub use entity::Entity;
pub use error::{AiResponseError, DomainError, DomainResult};
pub use item::{normalize_name, validate_name, ItemPatch, ShoppingListItem, NAME_MAX_CHARS};
pub use list::{validate_title, ListDetails, ShoppingList, TITLE_MAX_CHARS};
pub use merge::{compute_diff, DiffResult, MergeCandidate, TargetList, DEFAULT_MAX_TARGET_ITEMS};
pub use session::Session;

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
