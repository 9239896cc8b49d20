// database/accessor.rs - Storage boundary for services
//
// Services never talk to a pool or a map directly; they hold an
// `Arc<dyn DataAccessor<T>>` and each storage backend provides one
// implementation per record type.

use async_trait::async_trait;
use thiserror::Error;

/// Record types managed through a `DataAccessor`
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable record kind, used in error messages ("User", "Group")
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Called by the accessor when persisting a record with an empty id
    fn assign_id(&mut self, id: String);

    /// Field matched by `get_some_by_substring` (login for users, name for groups).
    /// Unique among records that are not soft-deleted.
    fn search_key(&self) -> &str;

    fn is_deleted(&self) -> bool;

    fn mark_deleted(&mut self);
}

#[derive(Debug, Error)]
pub enum AccessorError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Read and write capability over one record type.
///
/// Soft-deleted records are invisible to both lookups.
#[async_trait]
pub trait DataAccessor<T: Entity>: Send + Sync {
    /// Record with this id, or `None` when absent or soft-deleted
    async fn get_by_id(&self, id: &str) -> Result<Option<T>, AccessorError>;

    /// Records whose search key contains `pattern` (case-sensitive), ordered
    /// ascending by search key and truncated to `limit` when given
    async fn get_some_by_substring(
        &self,
        pattern: &str,
        limit: Option<usize>,
    ) -> Result<Vec<T>, AccessorError>;

    /// Insert or replace by id. Records with an empty id receive a new one.
    /// `None` means nothing was written.
    async fn create_or_update(&self, entity: T) -> Result<Option<T>, AccessorError>;
}
