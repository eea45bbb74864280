//! Hash-while-receiving upload decoding.

use std::io::{Cursor, Read};

use image::{DynamicImage, ImageReader};
use tracing::{debug, trace};

use crate::domain::entities::ContentHash;
use crate::domain::errors::{MemeError, MemeResult};
use crate::domain::services::Fnv1a64;

/// Default upload limit (10 MiB).
pub const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// A decoded upload and the hash of its bytes.
#[derive(Debug, Clone)]
pub struct AddressedImage {
    /// Hash of the raw upload bytes.
    pub hash: ContentHash,
    /// Decoded raster.
    pub image: DynamicImage,
}

/// Accumulates an upload chunk by chunk.
///
/// Every chunk is hashed as it arrives and appended to the one buffer that
/// is later handed to the decoder, so the hash covers exactly the decoded
/// bytes.
#[derive(Debug)]
pub struct ContentAddresser {
    hasher: Fnv1a64,
    buffer: Vec<u8>,
    limit: usize,
}

impl ContentAddresser {
    /// Creates an accumulator refusing uploads over `limit` bytes.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            hasher: Fnv1a64::new(),
            buffer: Vec::new(),
            limit,
        }
    }

    /// Hashes and buffers the next chunk.
    ///
    /// # Errors
    /// Returns [`MemeError::UploadTooLarge`] once the limit is exceeded.
    pub fn feed(&mut self, chunk: &[u8]) -> MemeResult<()> {
        if self.buffer.len().saturating_add(chunk.len()) > self.limit {
            return Err(MemeError::UploadTooLarge { limit: self.limit });
        }
        self.hasher.write(chunk);
        self.buffer.extend_from_slice(chunk);
        trace!(received = self.buffer.len(), "Upload chunk received");
        Ok(())
    }

    /// Bytes received so far.
    #[must_use]
    pub fn received_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Decodes the received bytes. CPU bound.
    ///
    /// # Errors
    /// Returns [`MemeError::Decode`] if the bytes are empty, of an unknown
    /// format, or corrupt.
    pub fn finish(self) -> MemeResult<AddressedImage> {
        if self.buffer.is_empty() {
            return Err(MemeError::decode("upload is empty"));
        }

        let hash = self.hasher.finish();
        let size = self.buffer.len();
        let reader = ImageReader::new(Cursor::new(self.buffer))
            .with_guessed_format()
            .map_err(|e| MemeError::decode(e.to_string()))?;
        let format = reader.format();
        let image = reader
            .decode()
            .map_err(|e| MemeError::decode(e.to_string()))?;

        debug!(
            hash = %hash,
            size,
            format = ?format,
            width = image.width(),
            height = image.height(),
            "Decoded upload"
        );

        Ok(AddressedImage { hash, image })
    }

    /// Drives an accumulator from a blocking reader.
    ///
    /// # Errors
    /// Returns [`MemeError::MalformedUpload`] on read failure, otherwise the
    /// errors of [`Self::feed`] and [`Self::finish`].
    pub fn address_reader<R: Read>(mut reader: R, limit: usize) -> MemeResult<AddressedImage> {
        let mut addresser = Self::with_limit(limit);
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(MemeError::malformed(e.to_string())),
            };
            addresser.feed(&chunk[..read])?;
        }
        addresser.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_identical_bytes_hash_identically() {
        let bytes = png_bytes(32, 16);
        let a = ContentAddresser::address_reader(bytes.as_slice(), DEFAULT_UPLOAD_LIMIT).unwrap();
        let b = ContentAddresser::address_reader(bytes.as_slice(), DEFAULT_UPLOAD_LIMIT).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!((a.image.width(), a.image.height()), (32, 16));
    }

    #[test]
    fn test_hash_covers_all_bytes_regardless_of_chunking() {
        let bytes = png_bytes(20, 20);
        let mut whole = Fnv1a64::new();
        whole.write(&bytes);

        let mut addresser = ContentAddresser::with_limit(DEFAULT_UPLOAD_LIMIT);
        for chunk in bytes.chunks(7) {
            addresser.feed(chunk).unwrap();
        }
        assert_eq!(addresser.received_bytes(), bytes.len());
        let addressed = addresser.finish().unwrap();

        assert_eq!(addressed.hash, whole.finish());
    }

    #[test]
    fn test_different_bytes_hash_differently() {
        let a = ContentAddresser::address_reader(png_bytes(8, 8).as_slice(), 1 << 20).unwrap();
        let b = ContentAddresser::address_reader(png_bytes(8, 9).as_slice(), 1 << 20).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn test_non_image_fails_to_decode() {
        let err = ContentAddresser::address_reader(&b"definitely not an image"[..], 1 << 20)
            .unwrap_err();
        assert!(matches!(err, MemeError::Decode { .. }));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_truncated_image_fails_to_decode() {
        let bytes = png_bytes(64, 64);
        let err = ContentAddresser::address_reader(&bytes[..bytes.len() / 2], 1 << 20)
            .unwrap_err();
        assert!(matches!(err, MemeError::Decode { .. }));
    }

    #[test]
    fn test_empty_upload_fails_to_decode() {
        let err = ContentAddresser::with_limit(16).finish().unwrap_err();
        assert!(matches!(err, MemeError::Decode { .. }));
    }

    #[test]
    fn test_limit_is_enforced() {
        let mut addresser = ContentAddresser::with_limit(10);
        addresser.feed(&[0; 6]).unwrap();
        let err = addresser.feed(&[0; 5]).unwrap_err();
        assert!(matches!(err, MemeError::UploadTooLarge { limit: 10 }));
        assert_eq!(addresser.received_bytes(), 6);
    }
}
