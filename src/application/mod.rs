//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Caching and retention services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{CreateMemeResponse, SweepReport};
pub use services::{ArtifactCache, CacheLookup, RetentionSweeper};
pub use use_cases::CreateMemeUseCase;
