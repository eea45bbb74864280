//! Rendered caption coverage.

use image::GrayImage;

/// Width of the caption mask relative to the crop.
const MASK_WIDTH_RATIO: f64 = 0.8;
/// Height of the caption mask relative to the crop.
const MASK_HEIGHT_RATIO: f64 = 0.15;

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Caption mask size for a crop of this size.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn caption_mask(self) -> Self {
        Self {
            width: (f64::from(self.width) * MASK_WIDTH_RATIO) as u32,
            height: (f64::from(self.height) * MASK_HEIGHT_RATIO) as u32,
        }
    }
}

/// Alpha-only raster of a rendered caption.
///
/// Each luma sample is glyph coverage in `0..=255`. `advance` is the pen
/// position after the last glyph and may exceed the mask width when the
/// caption does not fit.
#[derive(Debug, Clone)]
pub struct TextMask {
    alpha: GrayImage,
    advance: u32,
}

impl TextMask {
    /// Creates a mask.
    #[must_use]
    pub const fn new(alpha: GrayImage, advance: u32) -> Self {
        Self { alpha, advance }
    }

    /// Fully transparent mask of the given size.
    #[must_use]
    pub fn blank(size: Size) -> Self {
        Self::new(GrayImage::new(size.width, size.height), 0)
    }

    /// Coverage raster.
    #[must_use]
    pub const fn alpha(&self) -> &GrayImage {
        &self.alpha
    }

    /// Rendered advance width in pixels.
    #[must_use]
    pub const fn advance(&self) -> u32 {
        self.advance
    }

    /// Mask dimensions.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.alpha.width(), self.alpha.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_mask_ratios() {
        assert_eq!(Size::new(180, 180).caption_mask(), Size::new(144, 27));
        assert_eq!(Size::new(1, 1).caption_mask(), Size::new(0, 0));
    }
}
