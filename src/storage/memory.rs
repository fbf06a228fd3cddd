//! MemoryBackend - in-memory storage for development and testing.
//!
//! Fast, non-persistent. All data is lost when the backend is dropped.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::StorageBackend;
use super::error::{StorageError, StorageResult};
use super::thing::Thing;

/// In-memory implementation of the storage contract.
#[derive(Default)]
pub struct MemoryBackend {
    things: RwLock<HashMap<String, Thing>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get_thing(&self, id: &str) -> StorageResult<Thing> {
        assert!(!id.is_empty(), "id cannot be empty");

        self.things
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id))
    }

    async fn create_thing(&self, name: &str, value: &str) -> StorageResult<Thing> {
        let thing = Thing::new(name, value);
        self.things
            .write()
            .await
            .insert(thing.uuid.clone(), thing.clone());
        Ok(thing)
    }

    async fn update_thing(&self, id: &str, value: &str) -> StorageResult<Thing> {
        assert!(!id.is_empty(), "id cannot be empty");

        let mut things = self.things.write().await;
        let thing = things
            .get_mut(id)
            .ok_or_else(|| StorageError::not_found(id))?;
        thing.set_value(value);
        Ok(thing.clone())
    }

    async fn delete_thing(&self, id: &str) -> StorageResult<()> {
        assert!(!id.is_empty(), "id cannot be empty");

        // Unconditional: removing an absent id is success.
        self.things.write().await.remove(id);
        Ok(())
    }

    async fn list_things(&self, offset: usize, limit: usize) -> StorageResult<(Vec<Thing>, usize)> {
        let things = self.things.read().await;
        let total = things.len();

        let mut page: Vec<Thing> = things.values().cloned().collect();
        page.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.uuid.cmp(&b.uuid)));
        let page: Vec<Thing> = page.into_iter().skip(offset).take(limit).collect();

        // Postcondition
        assert!(page.len() <= limit, "page exceeds limit");
        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let backend = MemoryBackend::new();

        let created = backend.create_thing("name", "value").await.unwrap();
        assert_eq!(created.name, "name");
        assert_eq!(created.value, "value");
        assert_eq!(created.created, created.updated);

        let fetched = backend.get_thing(&created.uuid).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let backend = MemoryBackend::new();

        let err = backend.get_thing("does-not-exist").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update() {
        let backend = MemoryBackend::new();
        let created = backend.create_thing("name", "v1").await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let updated = backend.update_thing(&created.uuid, "v2").await.unwrap();

        assert_eq!(updated.value, "v2");
        assert_eq!(updated.name, "name");
        assert_eq!(updated.created, created.created);
        assert!(updated.updated > updated.created);

        let fetched = backend.get_thing(&created.uuid).await.unwrap();
        assert_eq!(fetched.value, "v2");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found_and_creates_nothing() {
        let backend = MemoryBackend::new();

        let err = backend.update_thing("does-not-exist", "x").await.unwrap_err();
        assert!(err.is_not_found());

        let (_, total) = backend.list_things(0, 10).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = MemoryBackend::new();
        let created = backend.create_thing("name", "value").await.unwrap();

        backend.delete_thing(&created.uuid).await.unwrap();
        backend.delete_thing(&created.uuid).await.unwrap();

        let err = backend.get_thing(&created.uuid).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_pagination_and_order() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            backend
                .create_thing(&format!("thing-{i}"), "value")
                .await
                .unwrap();
        }

        let (page1, total) = backend.list_things(0, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page1.len(), 2);

        let (page2, _) = backend.list_things(2, 2).await.unwrap();
        let (page3, _) = backend.list_things(4, 2).await.unwrap();
        assert_eq!(page2.len(), 2);
        assert_eq!(page3.len(), 1);

        // Stable order, no overlaps between pages.
        let mut all: Vec<String> = page1
            .iter()
            .chain(&page2)
            .chain(&page3)
            .map(|t| t.uuid.clone())
            .collect();
        let len_before = all.len();
        all.dedup();
        assert_eq!(all.len(), len_before);

        // Repeated calls agree absent mutation.
        let (again, _) = backend.list_things(0, 2).await.unwrap();
        assert_eq!(again, page1);
    }

    #[tokio::test]
    async fn test_list_beyond_end_is_empty() {
        let backend = MemoryBackend::new();
        backend.create_thing("name", "value").await.unwrap();

        let (page, total) = backend.list_things(10, 10).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_count_tracks_creates_and_deletes() {
        let backend = MemoryBackend::new();
        let a = backend.create_thing("a", "1").await.unwrap();
        backend.create_thing("b", "2").await.unwrap();

        let (_, total) = backend.list_things(0, 10).await.unwrap();
        assert_eq!(total, 2);

        backend.delete_thing(&a.uuid).await.unwrap();
        let (_, total) = backend.list_things(0, 10).await.unwrap();
        assert_eq!(total, 1);
    }
}
