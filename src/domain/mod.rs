//! Domain layer with core entities, pipeline services and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Hashing, jitter, layout and compositing.
pub mod services;

pub use entities::{ArtifactName, CacheKey, ContentHash, Frame, Noun, Size, TextMask};
pub use errors::{MemeError, MemeResult, StoreError, StoreResult};
pub use ports::{ArtifactListing, ArtifactStore, CaptionRenderer, StoredArtifact};
