//! Application services shared by the request path and the sweeper.

mod artifact_cache;
mod retention_sweeper;

pub use artifact_cache::{ArtifactCache, CacheLookup};
pub use retention_sweeper::RetentionSweeper;
