//! Filesystem-backed artifact store.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, trace, warn};

use crate::domain::entities::ArtifactName;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::ports::{ArtifactListing, ArtifactStore, StoredArtifact};

/// Artifact store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Opens a store in `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created.
    pub async fn new(root: PathBuf) -> StoreResult<Self> {
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Directory holding the artifacts.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    fn path_of(&self, name: &ArtifactName) -> PathBuf {
        self.root.join(name.as_str())
    }

    async fn get(&self, name: &ArtifactName) -> StoreResult<Option<PathBuf>> {
        let path = self.path_of(name);
        match fs::try_exists(&path).await {
            Ok(true) => {
                trace!(name = %name, "Artifact present");
                Ok(Some(path))
            }
            Ok(false) => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn put(&self, name: &ArtifactName, bytes: Vec<u8>) -> StoreResult<PathBuf> {
        let root = self.root.clone();
        let path = self.path_of(name);
        let size = bytes.len();

        let path = tokio::task::spawn_blocking(move || -> StoreResult<PathBuf> {
            let mut temp_file =
                tempfile::NamedTempFile::new_in(&root).map_err(|e| StoreError::io(&root, e))?;
            if let Err(e) = temp_file.write_all(&bytes).and_then(|()| temp_file.flush()) {
                return Err(StoreError::io(temp_file.path(), e));
            }
            temp_file
                .persist(&path)
                .map_err(|e| StoreError::io(&path, e.error))?;
            Ok(path)
        })
        .await
        .map_err(|e| StoreError::Task {
            message: format!("write task panicked: {e}"),
        })??;

        debug!(name = %name, path = %path.display(), size, "Stored artifact");
        Ok(path)
    }

    async fn read(&self, name: &ArtifactName) -> StoreResult<Option<Vec<u8>>> {
        let path = self.path_of(name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn delete(&self, name: &ArtifactName) -> StoreResult<bool> {
        let path = self.path_of(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(name = %name, "Deleted artifact");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn list_with_age(&self) -> StoreResult<Box<dyn ArtifactListing>> {
        let entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::io(&self.root, e))?;
        Ok(Box::new(FsListing {
            root: self.root.clone(),
            entries,
        }))
    }
}

/// Reads the store directory until end-of-stream, one batch at a time.
struct FsListing {
    root: PathBuf,
    entries: fs::ReadDir,
}

#[async_trait]
impl ArtifactListing for FsListing {
    async fn next_batch(&mut self, max: usize) -> StoreResult<Vec<StoredArtifact>> {
        let mut listed = Vec::with_capacity(max.min(64));
        while listed.len() < max {
            let Some(entry) = self
                .entries
                .next_entry()
                .await
                .map_err(|e| StoreError::io(&self.root, e))?
            else {
                break;
            };
            let path = entry.path();
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(e) => {
                    // Entries can vanish between listing and stat.
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!(path = %path.display(), error = %e, "Failed to stat cache entry");
                    }
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            let Ok(modified) = meta.modified() else {
                warn!(path = %path.display(), "Modification time unavailable");
                continue;
            };
            listed.push(StoredArtifact {
                name: ArtifactName::from_listing(entry.file_name().to_string_lossy()),
                modified,
            });
        }
        Ok(listed)
    }
}
