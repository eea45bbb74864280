//! Caption rasterization with an outline font.

use std::path::{Path, PathBuf};

use image::GrayImage;
use rusttype::{Font, Scale, point};
use thiserror::Error;
use tracing::trace;

use crate::domain::entities::{Size, TextMask};
use crate::domain::errors::MemeResult;
use crate::domain::ports::CaptionRenderer;

/// Default font, an Impact face as shipped by the msttcorefonts package.
pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/msttcorefonts/impact.ttf";
/// Default caption size in points.
pub const DEFAULT_FONT_SIZE: f32 = 20.0;
/// Default rendering resolution.
pub const DEFAULT_DPI: f32 = 96.0;

const POINTS_PER_INCH: f32 = 72.0;

/// Errors loading the caption font. Fatal at startup.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum FontError {
    #[error("failed to read font {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font {} is not a valid TrueType/OpenType font", path.display())]
    Parse { path: PathBuf },
}

/// Renders captions with one font loaded for the lifetime of the process.
///
/// Glyphs are rasterized unhinted at `point_size * dpi / 72` pixels with the
/// baseline one em below the top of the mask.
pub struct RusttypeCaptionRenderer {
    font: Font<'static>,
    pixel_size: f32,
}

impl std::fmt::Debug for RusttypeCaptionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusttypeCaptionRenderer")
            .field("pixel_size", &self.pixel_size)
            .finish_non_exhaustive()
    }
}

impl RusttypeCaptionRenderer {
    /// Reads and parses a font file.
    ///
    /// # Errors
    /// Returns [`FontError`] if the file cannot be read or parsed.
    pub fn load(path: &Path, point_size: f32, dpi: f32) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(bytes, point_size, dpi).ok_or_else(|| FontError::Parse {
            path: path.to_path_buf(),
        })
    }

    /// Parses font data already in memory.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, point_size: f32, dpi: f32) -> Option<Self> {
        let font = Font::try_from_vec(bytes)?;
        Some(Self {
            font,
            pixel_size: point_size * dpi / POINTS_PER_INCH,
        })
    }

    /// Em size in pixels.
    #[must_use]
    pub const fn pixel_size(&self) -> f32 {
        self.pixel_size
    }
}

impl CaptionRenderer for RusttypeCaptionRenderer {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap
    )]
    fn render(&self, caption: &str, size: Size) -> MemeResult<TextMask> {
        let scale = Scale::uniform(self.pixel_size);
        let mut mask = GrayImage::new(size.width, size.height);
        let mut advance = 0.0_f32;

        for glyph in self
            .font
            .layout(caption, scale, point(0.0, self.pixel_size))
        {
            advance = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = i64::from(bb.min.x) + i64::from(gx);
                let y = i64::from(bb.min.y) + i64::from(gy);
                if x < 0 || y < 0 || x >= i64::from(size.width) || y >= i64::from(size.height) {
                    return;
                }
                let src = (coverage.clamp(0.0, 1.0) * 255.0).round() as u32;
                let dst = mask.get_pixel_mut(x as u32, y as u32);
                let under = u32::from(dst[0]);
                dst[0] = (src + (under * (255 - src) + 127) / 255) as u8;
            });
        }

        let advance = advance.max(0.0) as u32;
        trace!(caption, advance, width = size.width, "Rendered caption");
        Ok(TextMask::new(mask, advance))
    }
}
