//! Palette-quantized animation frames.

/// Number of levels per channel in the web-safe palette.
const LEVELS: u8 = 6;
/// Distance between adjacent channel levels (`0x33`).
const STEP: u8 = 51;

/// Number of colours in the web-safe palette.
pub const WEB_SAFE_LEN: usize = 216;

/// The 216-colour web-safe palette.
///
/// Index `r * 36 + g * 6 + b` holds `(r * 0x33, g * 0x33, b * 0x33)`.
pub static WEB_SAFE: [[u8; 3]; WEB_SAFE_LEN] = build_web_safe();

const fn build_web_safe() -> [[u8; 3]; WEB_SAFE_LEN] {
    let mut palette = [[0u8; 3]; WEB_SAFE_LEN];
    let mut i = 0;
    while i < WEB_SAFE_LEN {
        let r = (i / 36) as u8;
        let g = ((i / 6) % 6) as u8;
        let b = (i % 6) as u8;
        palette[i] = [r * STEP, g * STEP, b * STEP];
        i += 1;
    }
    palette
}

/// Index of the web-safe colour nearest to `rgb`.
///
/// The palette is a regular grid, so the Euclidean nearest colour is found
/// by rounding each channel independently.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn nearest_web_safe(rgb: [u8; 3]) -> u8 {
    let level = |c: u8| (u16::from(c) + u16::from(STEP) / 2) / u16::from(STEP);
    let [r, g, b] = rgb.map(level);
    let levels = u16::from(LEVELS);
    (r * levels * levels + g * levels + b) as u8
}

/// One frame of the animation.
///
/// Stores one web-safe palette index per pixel in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    indices: Vec<u8>,
    delay_cs: u16,
}

impl Frame {
    /// Creates a frame from palette indices.
    ///
    /// # Panics
    /// Panics if `indices.len() != width * height`.
    #[must_use]
    pub fn new(width: u32, height: u32, indices: Vec<u8>, delay_cs: u16) -> Self {
        assert_eq!(
            indices.len(),
            width as usize * height as usize,
            "frame buffer does not match its dimensions"
        );
        Self {
            width,
            height,
            indices,
            delay_cs,
        }
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Display delay in hundredths of a second.
    #[must_use]
    pub const fn delay_cs(&self) -> u16 {
        self.delay_cs
    }

    /// Palette index at `(x, y)`.
    #[must_use]
    pub fn index_at(&self, x: u32, y: u32) -> u8 {
        self.indices[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Colour at `(x, y)`.
    #[must_use]
    pub fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        WEB_SAFE[usize::from(self.index_at(x, y))]
    }

    /// Expands the frame into opaque RGBA bytes.
    #[must_use]
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.indices.len() * 4);
        for &index in &self.indices {
            let [r, g, b] = WEB_SAFE[usize::from(index)];
            out.extend_from_slice(&[r, g, b, u8::MAX]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_layout() {
        assert_eq!(WEB_SAFE[0], [0, 0, 0]);
        assert_eq!(WEB_SAFE[WEB_SAFE_LEN - 1], [255, 255, 255]);
        assert_eq!(WEB_SAFE[36], [0x33, 0, 0]);
        assert_eq!(WEB_SAFE[6], [0, 0x33, 0]);
        assert_eq!(WEB_SAFE[1], [0, 0, 0x33]);
    }

    #[test]
    fn test_nearest_maps_palette_colours_to_themselves() {
        for (i, color) in WEB_SAFE.iter().enumerate() {
            assert_eq!(usize::from(nearest_web_safe(*color)), i);
        }
    }

    #[test]
    fn test_nearest_rounds_per_channel() {
        assert_eq!(WEB_SAFE[usize::from(nearest_web_safe([25, 26, 200]))], [0, 51, 204]);
        assert_eq!(WEB_SAFE[usize::from(nearest_web_safe([254, 128, 1]))], [255, 153, 0]);
    }

    #[test]
    fn test_to_rgba_is_opaque() {
        let frame = Frame::new(2, 1, vec![0, 215], 5);
        assert_eq!(frame.to_rgba(), vec![0, 0, 0, 255, 255, 255, 255, 255]);
        assert_eq!(frame.color_at(1, 0), [255, 255, 255]);
    }
}
