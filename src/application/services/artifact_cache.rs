//! Content-addressed artifact cache with per-name single-flight.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::application::dto::SweepReport;
use crate::domain::entities::{ArtifactName, CacheKey};
use crate::domain::errors::{MemeResult, StoreResult};
use crate::domain::ports::ArtifactStore;

/// Result of [`ArtifactCache::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The artifact already existed; the producer did not run.
    Hit(PathBuf),
    /// The producer ran and its output was stored.
    Created(PathBuf),
}

impl CacheLookup {
    /// Location of the artifact.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Hit(path) | Self::Created(path) => path,
        }
    }

    /// Returns true if nothing was produced.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

type FlightLock = Arc<tokio::sync::Mutex<()>>;

/// Owns the artifact store and serializes production per artifact name.
///
/// Requests for different names proceed in parallel. A second request for a
/// name that is being produced waits and then observes the stored artifact.
pub struct ArtifactCache {
    store: Arc<dyn ArtifactStore>,
    in_flight: Mutex<HashMap<ArtifactName, FlightLock>>,
}

impl ArtifactCache {
    /// Creates a cache over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Returns the artifact for `key`, running `produce` only on a miss.
    ///
    /// Nothing is stored when `produce` fails.
    ///
    /// # Errors
    /// Returns the producer's error or a storage error.
    pub async fn get_or_create<F, Fut>(&self, key: &CacheKey, produce: F) -> MemeResult<CacheLookup>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MemeResult<Vec<u8>>>,
    {
        let name = key.artifact_name();
        if let Some(path) = self.store.get(&name).await? {
            debug!(artifact = %name, "Cache hit");
            return Ok(CacheLookup::Hit(path));
        }

        let flight = self.claim(&name);
        let _permit = flight.lock.lock().await;

        // Another request may have finished while we waited.
        if let Some(path) = self.store.get(&name).await? {
            debug!(artifact = %name, "Cache hit after waiting for producer");
            return Ok(CacheLookup::Hit(path));
        }

        debug!(artifact = %name, "Cache miss, producing");
        let bytes = produce().await?;
        let size = bytes.len();
        let path = self.store.put(&name, bytes).await?;
        info!(artifact = %name, size, path = %path.display(), "Created artifact");
        Ok(CacheLookup::Created(path))
    }

    /// Deletes entries last modified before `cutoff`. The store is read
    /// `batch` entries at a time, yielding to the runtime between batches.
    /// Names being produced are left alone.
    ///
    /// # Errors
    /// Returns an error only if the listing cannot be started. Deletion
    /// failures are logged and counted. A listing that fails part way ends
    /// the pass with what was processed so far.
    pub async fn sweep_expired(&self, cutoff: SystemTime, batch: usize) -> StoreResult<SweepReport> {
        let mut listing = self.store.list_with_age().await?;
        let mut report = SweepReport::default();

        loop {
            let entries = match listing.next_batch(batch.max(1)).await {
                Ok(entries) if entries.is_empty() => break,
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        error = &e as &(dyn std::error::Error + 'static),
                        "Artifact listing ended early"
                    );
                    break;
                }
            };
            report.scanned += entries.len();

            for entry in entries {
                if entry.modified >= cutoff || self.is_in_flight(&entry.name) {
                    continue;
                }
                let name = entry.name;
                match self.store.delete(&name).await {
                    Ok(true) => {
                        debug!(artifact = %name, "Removed expired artifact");
                        report.removed += 1;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            artifact = %name,
                            error = &e as &(dyn std::error::Error + 'static),
                            "Failed to remove expired artifact"
                        );
                        report.failed += 1;
                    }
                }
            }
            tokio::task::yield_now().await;
        }

        Ok(report)
    }

    /// Returns true while some request is producing `name`.
    #[must_use]
    pub fn is_in_flight(&self, name: &ArtifactName) -> bool {
        self.in_flight.lock().contains_key(name)
    }

    fn claim(&self, name: &ArtifactName) -> Flight<'_> {
        let lock = self
            .in_flight
            .lock()
            .entry(name.clone())
            .or_default()
            .clone();
        Flight {
            cache: self,
            name: name.clone(),
            lock,
        }
    }
}

/// A claim on a name's production lock. The map entry is removed when the
/// last claim is dropped.
struct Flight<'a> {
    cache: &'a ArtifactCache,
    name: ArtifactName,
    lock: FlightLock,
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.cache.in_flight.lock();
        // One reference in the map, one held here.
        if Arc::strong_count(&self.lock) <= 2 {
            in_flight.remove(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::domain::entities::{ContentHash, Noun};
    use crate::domain::errors::MemeError;
    use crate::domain::ports::mocks::{MemoryArtifactStore, collect_listing};

    fn key(hash: u64, noun: &str) -> CacheKey {
        CacheKey::new(ContentHash::new(hash), Noun::parse(noun).unwrap())
    }

    fn cache() -> (Arc<MemoryArtifactStore>, ArtifactCache) {
        let store = Arc::new(MemoryArtifactStore::new());
        let cache = ArtifactCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_miss_runs_producer_once() {
        let (store, cache) = cache();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = key(1, "cat");

        let lookup = cache
            .get_or_create(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(b"GIF89a".to_vec())
            })
            .await
            .unwrap();

        assert!(!lookup.is_hit());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(store.contains(&key.artifact_name()));
        assert!(lookup.path().ends_with("1-cat.gif"));
    }

    #[tokio::test]
    async fn test_hit_skips_producer() {
        let (store, cache) = cache();
        let key = key(2, "dog");
        store.put(&key.artifact_name(), b"GIF89a".to_vec()).await.unwrap();

        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let lookup = cache
            .get_or_create(&key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            })
            .await
            .unwrap();

        assert!(lookup.is_hit());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(lookup.path(), store.path_of(&key.artifact_name()).as_path());
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_production() {
        let (_store, cache) = cache();
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let key = key(3, "bird");

        let produce = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(b"GIF89a".to_vec())
        };

        let (a, b) = tokio::join!(
            cache.get_or_create(&key, produce),
            cache.get_or_create(&key, produce)
        );

        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(a.path(), b.path());
        assert!(a.is_hit() != b.is_hit());
        assert!(!cache.is_in_flight(&key.artifact_name()));
    }

    #[tokio::test]
    async fn test_failed_production_stores_nothing() {
        let (store, cache) = cache();
        let key = key(4, "fish");

        let result = cache
            .get_or_create(&key, || async { Err(MemeError::encode("boom")) })
            .await;

        assert!(matches!(result, Err(MemeError::Encode { .. })));
        assert!(!store.contains(&key.artifact_name()));
        assert!(!cache.is_in_flight(&key.artifact_name()));
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_entries() {
        let (store, cache) = cache();
        let now = SystemTime::now();
        let old = key(5, "old").artifact_name();
        let fresh = key(6, "fresh").artifact_name();
        store.insert_at(old.clone(), now - Duration::from_secs(3600));
        store.insert_at(fresh.clone(), now);

        let report = cache
            .sweep_expired(now - Duration::from_secs(60), 10)
            .await
            .unwrap();

        assert_eq!(
            report,
            SweepReport {
                scanned: 2,
                removed: 1,
                failed: 0
            }
        );
        assert!(!store.contains(&old));
        assert!(store.contains(&fresh));
    }

    #[tokio::test]
    async fn test_sweep_spans_batches() {
        let (store, cache) = cache();
        let long_ago = SystemTime::UNIX_EPOCH + Duration::from_secs(1);
        for i in 0..25 {
            store.insert_at(key(i, "old").artifact_name(), long_ago);
        }

        let report = cache.sweep_expired(SystemTime::now(), 10).await.unwrap();

        assert_eq!(report.scanned, 25);
        assert_eq!(report.removed, 25);
        assert!(collect_listing(store.as_ref()).await.is_empty());
    }

    #[tokio::test]
    async fn test_sweep_skips_names_in_production() {
        let (store, cache) = cache();
        let name = key(7, "busy").artifact_name();
        store.insert_at(name.clone(), SystemTime::UNIX_EPOCH);

        let flight = cache.claim(&name);
        let report = cache.sweep_expired(SystemTime::now(), 10).await.unwrap();
        drop(flight);

        assert_eq!(report.removed, 0);
        assert!(store.contains(&name));
        assert!(!cache.is_in_flight(&name));
    }

    #[tokio::test]
    async fn test_sweep_counts_failed_deletes() {
        let (store, cache) = cache();
        store.insert_at(key(8, "a").artifact_name(), SystemTime::UNIX_EPOCH);
        store.insert_at(key(9, "b").artifact_name(), SystemTime::UNIX_EPOCH);
        store.set_fail_deletes(true);

        let report = cache.sweep_expired(SystemTime::now(), 1).await.unwrap();

        assert_eq!(report.failed, 2);
        assert_eq!(report.removed, 0);
    }
}
