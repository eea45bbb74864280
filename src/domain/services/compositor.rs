//! Jittered multi-frame compositing.

use image::{Rgba, RgbaImage};
use tracing::trace;

use super::jitter_rng::JitterRng;
use super::layout::Anchor;
use crate::domain::entities::{ContentHash, Frame, Size, TextMask, WEB_SAFE, nearest_web_safe};
use crate::domain::errors::{MemeError, MemeResult};

/// Default number of frames per animation.
pub const DEFAULT_FRAMES: usize = 10;
/// Default maximum jitter in pixels per axis.
pub const DEFAULT_SHAKE: u32 = 20;
/// Default frame delay in centiseconds.
pub const DEFAULT_DELAY_CS: u16 = 5;

/// Parameters of the shake animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositorSettings {
    /// Number of frames.
    pub frames: usize,
    /// Maximum jitter in pixels per axis.
    pub shake: u32,
    /// Delay of every frame in centiseconds.
    pub delay_cs: u16,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            frames: DEFAULT_FRAMES,
            shake: DEFAULT_SHAKE,
            delay_cs: DEFAULT_DELAY_CS,
        }
    }
}

/// Builds the frames of a shaking caption animation.
#[derive(Debug, Clone, Copy)]
pub struct FrameCompositor {
    settings: CompositorSettings,
}

impl FrameCompositor {
    /// Creates a compositor.
    #[must_use]
    pub const fn new(settings: CompositorSettings) -> Self {
        Self { settings }
    }

    /// Size of every frame for a source of `source` size.
    ///
    /// # Errors
    /// Returns [`MemeError::DegenerateGeometry`] if either dimension is not
    /// larger than the shake amplitude.
    pub fn crop_size(&self, source: Size) -> MemeResult<Size> {
        let shake = self.settings.shake;
        if source.width <= shake || source.height <= shake {
            return Err(MemeError::DegenerateGeometry {
                width: source.width,
                height: source.height,
                shake,
            });
        }
        Ok(Size::new(source.width - shake, source.height - shake))
    }

    /// Top-left crop offsets, one per frame, in draw order.
    #[must_use]
    pub fn jitter_offsets(&self, seed: ContentHash) -> Vec<(u32, u32)> {
        let mut rng = JitterRng::new(seed.seed());
        (0..self.settings.frames)
            .map(|_| {
                let x = rng.below(self.settings.shake);
                let y = rng.below(self.settings.shake);
                (x, y)
            })
            .collect()
    }

    /// Composes all frames.
    ///
    /// The background shakes by the per-frame jitter while the caption stays
    /// at `anchor`.
    ///
    /// # Errors
    /// Returns [`MemeError::DegenerateGeometry`] for sources too small to crop.
    pub fn compose(
        &self,
        source: &RgbaImage,
        mask: &TextMask,
        anchor: Anchor,
        seed: ContentHash,
    ) -> MemeResult<Vec<Frame>> {
        let crop = self.crop_size(Size::new(source.width(), source.height()))?;

        let frames = self
            .jitter_offsets(seed)
            .into_iter()
            .map(|offset| {
                trace!(x = offset.0, y = offset.1, "Compositing frame");
                self.compose_frame(source, crop, offset, mask, anchor)
            })
            .collect();

        Ok(frames)
    }

    fn compose_frame(
        &self,
        source: &RgbaImage,
        crop: Size,
        (jx, jy): (u32, u32),
        mask: &TextMask,
        anchor: Anchor,
    ) -> Frame {
        let mut indices = Vec::with_capacity(crop.width as usize * crop.height as usize);
        for y in 0..crop.height {
            for x in 0..crop.width {
                let px = source.get_pixel(x + jx, y + jy);
                indices.push(nearest_web_safe(premultiplied(*px)));
            }
        }

        let alpha = mask.alpha();
        for my in 0..alpha.height() {
            let Some(fy) = frame_coord(anchor.y, my, crop.height) else {
                continue;
            };
            for mx in 0..alpha.width() {
                let Some(fx) = frame_coord(anchor.x, mx, crop.width) else {
                    continue;
                };
                let coverage = alpha.get_pixel(mx, my)[0];
                if coverage == 0 {
                    continue;
                }
                let i = fy * crop.width as usize + fx;
                let under = WEB_SAFE[usize::from(indices[i])];
                indices[i] = nearest_web_safe(white_over(under, coverage));
            }
        }

        Frame::new(crop.width, crop.height, indices, self.settings.delay_cs)
    }
}

/// Maps a mask coordinate into the frame, or `None` if clipped.
fn frame_coord(origin: i64, offset: u32, limit: u32) -> Option<usize> {
    let pos = origin + i64::from(offset);
    if pos < 0 || pos >= i64::from(limit) {
        return None;
    }
    usize::try_from(pos).ok()
}

#[allow(clippy::cast_possible_truncation)]
fn premultiplied(Rgba([r, g, b, a]): Rgba<u8>) -> [u8; 3] {
    let a = u32::from(a);
    [r, g, b].map(|c| ((u32::from(c) * a + 127) / 255) as u8)
}

#[allow(clippy::cast_possible_truncation)]
fn white_over(under: [u8; 3], coverage: u8) -> [u8; 3] {
    let a = u32::from(coverage);
    under.map(|c| ((u32::from(c) * (255 - a) + 255 * a + 127) / 255) as u8)
}
