//! Artifact encoding.

use std::io::Cursor;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, ImageFormat, RgbaImage};

use crate::domain::entities::{Frame, TextMask};
use crate::domain::errors::{MemeError, MemeResult};

/// Encodes frames as an infinitely looping GIF.
///
/// Frames only use web-safe colours, so the encoder builds an exact palette
/// for each of them instead of re-quantizing.
///
/// # Errors
/// Returns [`MemeError::Encode`] if there are no frames or encoding fails.
pub fn encode_gif(frames: &[Frame]) -> MemeResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(MemeError::encode("animation has no frames"));
    }

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| MemeError::encode(e.to_string()))?;

        for frame in frames {
            let buffer = RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba())
                .ok_or_else(|| MemeError::encode("frame buffer does not match its size"))?;
            let delay = Delay::from_numer_denom_ms(u32::from(frame.delay_cs()) * 10, 1);
            encoder
                .encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))
                .map_err(|e| MemeError::encode(e.to_string()))?;
        }
    }

    Ok(out)
}

/// Encodes a caption mask as a grayscale PNG for debugging layout.
///
/// # Errors
/// Returns [`MemeError::Encode`] if the mask is empty or encoding fails.
pub fn encode_mask_png(mask: &TextMask) -> MemeResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    mask.alpha()
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| MemeError::encode(e.to_string()))?;
    Ok(out.into_inner())
}
