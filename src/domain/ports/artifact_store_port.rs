//! Port definition for artifact storage.

use std::path::PathBuf;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::domain::entities::ArtifactName;
use crate::domain::errors::StoreResult;

/// An entry found while listing the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    /// File name inside the store.
    pub name: ArtifactName,
    /// Last modification time.
    pub modified: SystemTime,
}

/// Port for the directory of generated artifacts.
/// Implementations must be thread-safe.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Location an artifact with this name has (or would have).
    fn path_of(&self, name: &ArtifactName) -> PathBuf;

    /// Returns the artifact path if it exists.
    async fn get(&self, name: &ArtifactName) -> StoreResult<Option<PathBuf>>;

    /// Persists an artifact. Readers never observe a partially written file.
    async fn put(&self, name: &ArtifactName, bytes: Vec<u8>) -> StoreResult<PathBuf>;

    /// Reads an artifact's bytes, or `None` if it does not exist.
    async fn read(&self, name: &ArtifactName) -> StoreResult<Option<Vec<u8>>>;

    /// Deletes an artifact. Returns false if it was already gone.
    async fn delete(&self, name: &ArtifactName) -> StoreResult<bool>;

    /// Starts listing entries with their modification times.
    ///
    /// Entries are pulled from the returned listing in batches, so the
    /// directory is never held in memory as a whole.
    async fn list_with_age(&self) -> StoreResult<Box<dyn ArtifactListing>>;
}

/// An ongoing listing of the store.
#[async_trait]
pub trait ArtifactListing: Send {
    /// Returns up to `max` further entries. An empty batch ends the listing.
    async fn next_batch(&mut self, max: usize) -> StoreResult<Vec<StoredArtifact>>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use parking_lot::Mutex;

    use crate::domain::errors::StoreError;

    /// In-memory store with controllable failures.
    #[derive(Default)]
    pub struct MemoryArtifactStore {
        entries: Mutex<BTreeMap<ArtifactName, (Vec<u8>, SystemTime)>>,
        fail_deletes: AtomicBool,
        fail_listing: AtomicBool,
    }

    impl MemoryArtifactStore {
        /// Creates empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Inserts an entry with an explicit modification time.
        pub fn insert_at(&self, name: ArtifactName, modified: SystemTime) {
            self.entries.lock().insert(name, (Vec::new(), modified));
        }

        /// Makes every delete fail.
        pub fn set_fail_deletes(&self, value: bool) {
            self.fail_deletes.store(value, Ordering::SeqCst);
        }

        /// Makes listing fail.
        pub fn set_fail_listing(&self, value: bool) {
            self.fail_listing.store(value, Ordering::SeqCst);
        }

        /// Returns whether an entry exists.
        pub fn contains(&self, name: &ArtifactName) -> bool {
            self.entries.lock().contains_key(name)
        }

        fn failure(name: &ArtifactName) -> StoreError {
            StoreError::io(
                PathBuf::from(name.as_str()),
                std::io::Error::other("injected failure"),
            )
        }
    }

    #[async_trait]
    impl ArtifactStore for MemoryArtifactStore {
        fn path_of(&self, name: &ArtifactName) -> PathBuf {
            PathBuf::from("/memory").join(name.as_str())
        }

        async fn get(&self, name: &ArtifactName) -> StoreResult<Option<PathBuf>> {
            Ok(self.contains(name).then(|| self.path_of(name)))
        }

        async fn put(&self, name: &ArtifactName, bytes: Vec<u8>) -> StoreResult<PathBuf> {
            self.entries
                .lock()
                .insert(name.clone(), (bytes, SystemTime::now()));
            Ok(self.path_of(name))
        }

        async fn read(&self, name: &ArtifactName) -> StoreResult<Option<Vec<u8>>> {
            Ok(self.entries.lock().get(name).map(|(bytes, _)| bytes.clone()))
        }

        async fn delete(&self, name: &ArtifactName) -> StoreResult<bool> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(Self::failure(name));
            }
            Ok(self.entries.lock().remove(name).is_some())
        }

        async fn list_with_age(&self) -> StoreResult<Box<dyn ArtifactListing>> {
            if self.fail_listing.load(Ordering::SeqCst) {
                return Err(Self::failure(&ArtifactName::from_listing(".")));
            }
            let snapshot: Vec<_> = self
                .entries
                .lock()
                .iter()
                .map(|(name, (_, modified))| StoredArtifact {
                    name: name.clone(),
                    modified: *modified,
                })
                .collect();
            Ok(Box::new(MemoryListing {
                entries: snapshot.into_iter(),
            }))
        }
    }

    struct MemoryListing {
        entries: std::vec::IntoIter<StoredArtifact>,
    }

    #[async_trait]
    impl ArtifactListing for MemoryListing {
        async fn next_batch(&mut self, max: usize) -> StoreResult<Vec<StoredArtifact>> {
            Ok(self.entries.by_ref().take(max).collect())
        }
    }

    /// Drains a listing into a vector.
    pub async fn collect_listing(store: &dyn ArtifactStore) -> Vec<StoredArtifact> {
        let mut listing = store.list_with_age().await.unwrap();
        let mut all = Vec::new();
        loop {
            let batch = listing.next_batch(16).await.unwrap();
            if batch.is_empty() {
                return all;
            }
            all.extend(batch);
        }
    }
}
