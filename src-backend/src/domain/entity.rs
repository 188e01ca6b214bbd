//! Entity Trait

/// Anything stored under a stable, string-like identifier
pub trait Entity: Sized + Send + Sync + Clone {
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    fn id(&self) -> &Self::Id;
}
