//! Caption placement within the crop.

use crate::domain::entities::Size;

/// Vertical position of the caption's top edge relative to crop height.
const CAPTION_TOP_RATIO: f64 = 0.8;

/// Top-left corner of the caption mask in frame coordinates.
///
/// Either coordinate may fall outside the frame; pixels outside are clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// Horizontal offset in pixels.
    pub x: i64,
    /// Vertical offset in pixels.
    pub y: i64,
}

/// Centres a caption of `advance` pixels within the crop.
///
/// The offset is left unclamped: a caption wider than the crop starts left of
/// the frame edge.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn caption_anchor(crop: Size, advance: u32) -> Anchor {
    let mid = i64::from(crop.width) / 2;
    Anchor {
        x: mid - i64::from(advance) / 2,
        y: (f64::from(crop.height) * CAPTION_TOP_RATIO) as i64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centres_caption() {
        let anchor = caption_anchor(Size::new(180, 180), 100);
        assert_eq!(anchor, Anchor { x: 40, y: 144 });
    }

    #[test]
    fn test_wide_caption_goes_negative() {
        let anchor = caption_anchor(Size::new(100, 50), 300);
        assert_eq!(anchor.x, -100);
        assert_eq!(anchor.y, 40);
    }
}
