//! Domain entity definitions.

mod cache_key;
mod content_hash;
mod frame;
mod noun;
mod text_mask;

pub use cache_key::{ArtifactName, CacheKey};
pub use content_hash::ContentHash;
pub use frame::{Frame, WEB_SAFE, WEB_SAFE_LEN, nearest_web_safe};
pub use noun::{MAX_NOUN_LEN, Noun};
pub use text_mask::{Size, TextMask};
