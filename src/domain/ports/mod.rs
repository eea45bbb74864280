//! Ports the domain depends on.

mod artifact_store_port;
mod caption_renderer_port;

pub use artifact_store_port::{ArtifactListing, ArtifactStore, StoredArtifact};
pub use caption_renderer_port::CaptionRenderer;

#[cfg(test)]
/// Test doubles for the ports.
pub mod mocks {
    pub use super::artifact_store_port::mock::{MemoryArtifactStore, collect_listing};
    pub use super::caption_renderer_port::mock::MockCaptionRenderer;
}
