//! Whole-collection persistence for Shelf.
//!
//! A collection is loaded and saved as a unit. [`Collection`] adds the
//! single-writer serialization point that every read-modify-write goes
//! through, so overlapping requests cannot lose each other's updates.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Errors raised while loading or saving a collection
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed collection in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Backing storage for a collection of records of type `T`
#[async_trait]
pub trait CollectionStore<T>: Send + Sync {
    /// Read the complete collection.
    async fn load(&self) -> Result<Vec<T>, StoreError>;

    /// Replace the complete collection.
    async fn save(&self, records: &[T]) -> Result<(), StoreError>;
}

/// A named collection guarded by a single writer lock
pub struct Collection<T> {
    name: &'static str,
    store: Arc<dyn CollectionStore<T>>,
    writer: Mutex<()>,
}

impl<T> Collection<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(name: &'static str, store: Arc<dyn CollectionStore<T>>) -> Self {
        Self {
            name,
            store,
            writer: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Load every record currently stored.
    pub async fn all(&self) -> Result<Vec<T>, StoreError> {
        self.store.load().await
    }

    /// Run a read-modify-write cycle while holding the writer lock.
    ///
    /// The collection is saved only when `mutate` succeeds; an error from
    /// `mutate` leaves the stored collection untouched.
    pub async fn modify<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E>,
        E: From<StoreError>,
    {
        let _guard = self.writer.lock().await;

        let mut records = self.store.load().await?;
        let before = records.len();
        let outcome = mutate(&mut records)?;
        self.store.save(&records).await?;

        tracing::debug!(
            collection = self.name,
            before,
            after = records.len(),
            "collection saved"
        );

        Ok(outcome)
    }
}
