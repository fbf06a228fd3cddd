//! The Storage Contract.

use async_trait::async_trait;

use super::error::StorageResult;
use super::thing::Thing;

/// The five operations every persistence backend must support.
///
/// Backends share a single connection/client handle across all concurrent
/// calls; concurrency control is delegated entirely to the backing store.
/// A caller that stops awaiting an operation drops the future and with it
/// the in-flight request.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch a thing by id.
    ///
    /// # Errors
    /// [`super::StorageError::NotFound`] when no record with that id exists;
    /// any other backend failure is surfaced wrapped, never as not-found.
    async fn get_thing(&self, id: &str) -> StorageResult<Thing>;

    /// Create a thing with a fresh id and `created == updated == now`,
    /// returning the stored record.
    async fn create_thing(&self, name: &str, value: &str) -> StorageResult<Thing>;

    /// Set a thing's value and refresh its update timestamp, returning the
    /// post-update record. `name` and `created` are untouched.
    ///
    /// # Errors
    /// [`super::StorageError::NotFound`] when the id does not exist; the
    /// update of a missing id never creates a record as a side effect.
    async fn update_thing(&self, id: &str, value: &str) -> StorageResult<Thing>;

    /// Delete a thing by id. Unconditional: deleting an absent id succeeds,
    /// so the operation is idempotent.
    async fn delete_thing(&self, id: &str) -> StorageResult<()>;

    /// Return up to `limit` things starting at `offset`, ordered by
    /// `(created, uuid)`, plus the total count irrespective of the window.
    ///
    /// The page and the count come from separate queries; under concurrent
    /// writes they may disagree.
    async fn list_things(&self, offset: usize, limit: usize) -> StorageResult<(Vec<Thing>, usize)>;
}
