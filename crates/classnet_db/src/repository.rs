//! Repository factory trait
//!
//! Storage backends are chosen at startup. A factory turns whatever the
//! backend needs (a database client, nothing at all) into a repository.

/// A trait for database repository factories
///
/// Generic over the repository type and the configuration type.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance
    fn create_repository(&self, config: C) -> R;
}
