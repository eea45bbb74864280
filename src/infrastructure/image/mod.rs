//! Image handling infrastructure.
//!
//! This module provides:
//! - Hash-while-receiving upload decoding
//! - GIF assembly of composited frames
//! - Debug dumps of caption masks

pub mod content_addresser;
pub mod gif_encoder;

pub use content_addresser::{AddressedImage, ContentAddresser, DEFAULT_UPLOAD_LIMIT};
pub use gif_encoder::{encode_gif, encode_mask_png};
