//! Artifact creation and maintenance DTOs.

use std::path::PathBuf;

use crate::domain::entities::ArtifactName;

/// Outcome of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMemeResponse {
    /// Artifact file name, also its URL segment under `/img/`.
    pub name: ArtifactName,
    /// Location in the store.
    pub path: PathBuf,
    /// Whether the artifact already existed.
    pub cache_hit: bool,
}

impl CreateMemeResponse {
    /// Creates new create response.
    #[must_use]
    pub const fn new(name: ArtifactName, path: PathBuf, cache_hit: bool) -> Self {
        Self {
            name,
            path,
            cache_hit,
        }
    }

    /// Path the client is redirected to.
    #[must_use]
    pub fn location(&self) -> String {
        format!("/img/{}", self.name)
    }
}

/// Counters of one retention pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries listed.
    pub scanned: usize,
    /// Entries deleted.
    pub removed: usize,
    /// Deletions that failed.
    pub failed: usize,
}

impl std::fmt::Display for SweepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scanned {}, removed {}, failed {}",
            self.scanned, self.removed, self.failed
        )
    }
}
