//! DocumentBackend - embedded document store (redb).
//!
//! Each thing is stored as a JSON document in a single table named after the
//! entity kind, keyed by the thing's uuid. No secondary indexes. Listing scans
//! the table and sorts in memory, which is fine at this scale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use super::backend::StorageBackend;
use super::error::{StorageError, StorageResult};
use super::thing::Thing;

/// Kind-qualified table: key = thing uuid, value = JSON document.
const THING_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("thing");

/// Document-store implementation of the storage contract.
///
/// redb is synchronous; every operation runs its short critical section on
/// the blocking pool. The database handle is safe to share across tasks.
pub struct DocumentBackend {
    db: Arc<Database>,
    path: PathBuf,
}

impl DocumentBackend {
    /// Create or open the document store at the given path.
    ///
    /// # Errors
    /// Returns [`StorageError::Connection`] if the database file cannot be
    /// created or opened.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::connection(format!("failed to create {}: {e}", parent.display())))?;
        }

        let db = Database::create(&path)
            .map_err(|e| StorageError::connection(format!("failed to open document store: {e}")))?;

        // Ensure the table exists so read transactions never race table creation.
        let txn = db
            .begin_write()
            .map_err(|e| StorageError::write(e.to_string()))?;
        txn.open_table(THING_TABLE)
            .map_err(|e| StorageError::write(e.to_string()))?;
        txn.commit().map_err(|e| StorageError::write(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// The file path of this store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run_blocking<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> StorageResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(db.as_ref()))
            .await
            .map_err(|e| StorageError::internal(format!("storage task failed: {e}")))?
    }
}

fn decode_thing(raw: &[u8]) -> StorageResult<Thing> {
    serde_json::from_slice(raw)
        .map_err(|e| StorageError::serialization(format!("failed to decode document: {e}")))
}

fn encode_thing(thing: &Thing) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(thing)
        .map_err(|e| StorageError::serialization(format!("failed to encode document: {e}")))
}

fn get_blocking(db: &Database, id: &str) -> StorageResult<Thing> {
    let txn = db
        .begin_read()
        .map_err(|e| StorageError::read(e.to_string()))?;
    let table = txn
        .open_table(THING_TABLE)
        .map_err(|e| StorageError::read(e.to_string()))?;

    let guard = table
        .get(id)
        .map_err(|e| StorageError::read(e.to_string()))?;
    match guard {
        Some(raw) => decode_thing(raw.value()),
        None => Err(StorageError::not_found(id)),
    }
}

fn put_blocking(db: &Database, thing: &Thing) -> StorageResult<()> {
    let raw = encode_thing(thing)?;
    let txn = db
        .begin_write()
        .map_err(|e| StorageError::write(e.to_string()))?;
    {
        let mut table = txn
            .open_table(THING_TABLE)
            .map_err(|e| StorageError::write(e.to_string()))?;
        table
            .insert(thing.uuid.as_str(), raw.as_slice())
            .map_err(|e| StorageError::write(e.to_string()))?;
    }
    txn.commit().map_err(|e| StorageError::write(e.to_string()))
}

fn update_blocking(db: &Database, id: &str, value: &str) -> StorageResult<Thing> {
    // Read-modify-write at the same key, inside one write transaction.
    let txn = db
        .begin_write()
        .map_err(|e| StorageError::write(e.to_string()))?;
    let thing = {
        let mut table = txn
            .open_table(THING_TABLE)
            .map_err(|e| StorageError::write(e.to_string()))?;

        let mut thing = {
            let guard = table
                .get(id)
                .map_err(|e| StorageError::read(e.to_string()))?;
            match guard {
                Some(raw) => decode_thing(raw.value())?,
                None => return Err(StorageError::not_found(id)),
            }
        };

        thing.set_value(value);
        let raw = encode_thing(&thing)?;
        table
            .insert(id, raw.as_slice())
            .map_err(|e| StorageError::write(e.to_string()))?;
        thing
    };
    txn.commit().map_err(|e| StorageError::write(e.to_string()))?;
    Ok(thing)
}

fn delete_blocking(db: &Database, id: &str) -> StorageResult<()> {
    let txn = db
        .begin_write()
        .map_err(|e| StorageError::write(e.to_string()))?;
    {
        let mut table = txn
            .open_table(THING_TABLE)
            .map_err(|e| StorageError::write(e.to_string()))?;
        // Removing an absent key is success.
        table
            .remove(id)
            .map_err(|e| StorageError::write(e.to_string()))?;
    }
    txn.commit().map_err(|e| StorageError::write(e.to_string()))
}

fn list_blocking(db: &Database, offset: usize, limit: usize) -> StorageResult<(Vec<Thing>, usize)> {
    let txn = db
        .begin_read()
        .map_err(|e| StorageError::read(e.to_string()))?;
    let table = txn
        .open_table(THING_TABLE)
        .map_err(|e| StorageError::read(e.to_string()))?;

    let total = table
        .len()
        .map_err(|e| StorageError::read(e.to_string()))? as usize;

    let mut all = Vec::with_capacity(total);
    for item in table
        .iter()
        .map_err(|e| StorageError::read(e.to_string()))?
    {
        let (_, raw) = item.map_err(|e| StorageError::read(e.to_string()))?;
        all.push(decode_thing(raw.value())?);
    }
    all.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.uuid.cmp(&b.uuid)));
    let things: Vec<Thing> = all.into_iter().skip(offset).take(limit).collect();

    // Postcondition
    assert!(things.len() <= limit, "page exceeds limit");
    Ok((things, total))
}

#[async_trait]
impl StorageBackend for DocumentBackend {
    async fn get_thing(&self, id: &str) -> StorageResult<Thing> {
        assert!(!id.is_empty(), "id cannot be empty");

        let id = id.to_string();
        self.run_blocking(move |db| get_blocking(db, &id)).await
    }

    async fn create_thing(&self, name: &str, value: &str) -> StorageResult<Thing> {
        let thing = Thing::new(name, value);
        let stored = thing.clone();
        self.run_blocking(move |db| put_blocking(db, &stored)).await?;
        Ok(thing)
    }

    async fn update_thing(&self, id: &str, value: &str) -> StorageResult<Thing> {
        assert!(!id.is_empty(), "id cannot be empty");

        let id = id.to_string();
        let value = value.to_string();
        self.run_blocking(move |db| update_blocking(db, &id, &value))
            .await
    }

    async fn delete_thing(&self, id: &str) -> StorageResult<()> {
        assert!(!id.is_empty(), "id cannot be empty");

        let id = id.to_string();
        self.run_blocking(move |db| delete_blocking(db, &id)).await
    }

    async fn list_things(&self, offset: usize, limit: usize) -> StorageResult<(Vec<Thing>, usize)> {
        self.run_blocking(move |db| list_blocking(db, offset, limit))
            .await
    }
}
