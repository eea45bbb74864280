//! Port definition for caption rasterization.

use crate::domain::entities::{Size, TextMask};
use crate::domain::errors::MemeResult;

/// Port for turning caption text into an alpha mask.
///
/// Rendering is CPU bound and synchronous; callers run it on a blocking
/// thread. Implementations are shared across requests without locking.
pub trait CaptionRenderer: Send + Sync {
    /// Rasterizes `caption` into a mask of exactly `size`.
    ///
    /// Captions wider than the mask are clipped, not wrapped or scaled.
    ///
    /// # Errors
    /// Returns [`crate::domain::errors::MemeError::Render`] if the caption
    /// cannot be rasterized.
    fn render(&self, caption: &str, size: Size) -> MemeResult<TextMask>;
}
