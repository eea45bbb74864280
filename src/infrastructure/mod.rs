//! Infrastructure layer with filesystem, font and codec adapters.

/// Application configuration.
pub mod config;
/// Caption font rendering.
pub mod font;
/// Image handling (upload decoding, GIF assembly).
pub mod image;
/// Artifact storage adapters.
pub mod storage;

pub use config::{AppConfig, CliArgs, ConfigError, ConfigLoader, LogLevel};
pub use font::{FontError, RusttypeCaptionRenderer};
pub use image::{AddressedImage, ContentAddresser, encode_gif, encode_mask_png};
pub use storage::FsArtifactStore;
