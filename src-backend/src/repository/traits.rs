//! Repository Traits

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult};

/// Point CRUD over one entity type, keyed by its id.
///
/// Queries that span a parent (items of a list, lists of an owner) live on
/// the concrete repositories.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert `entity` and return it as stored
    async fn create(&self, entity: &T) -> DomainResult<T>;

    async fn find_by_id(&self, id: &T::Id) -> DomainResult<Option<T>>;

    /// Overwrite the stored row; `NotFound` if it is gone
    async fn update(&self, entity: &T) -> DomainResult<T>;

    async fn delete(&self, id: &T::Id) -> DomainResult<()>;
}
