//! Intensify - shaking-caption meme animations over HTTP.
//!
//! An uploaded image and a noun become an infinitely looping GIF in which
//! the picture shakes behind a steady `[noun intensifies]` caption.
//! Artifacts are cached by content hash and expire after a retention period.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases, services and DTOs.
pub mod application;
/// Domain layer containing entities, errors, ports and pure pipeline services.
pub mod domain;
/// Infrastructure layer containing filesystem, font and codec adapters.
pub mod infrastructure;
/// Presentation layer containing the HTTP routes.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "intensify";
