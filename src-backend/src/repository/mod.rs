//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod list_repo;
mod item_repo;
mod session_repo;


pub use traits::Repository;
pub use db::{init_db, DbState};
pub use list_repo::ListRepository;
pub use item_repo::ItemRepository;
pub use session_repo::SessionRepository;
