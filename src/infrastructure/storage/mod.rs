//! Artifact storage adapters.

mod fs_artifact_store;

pub use fs_artifact_store::FsArtifactStore;
