//! Content hash of an uploaded image.

use std::fmt;

/// 64-bit FNV-1a fingerprint of the raw bytes of an upload.
///
/// Not collision resistant. Identical byte sequences always produce the
/// same value, which is all the artifact cache relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(u64);

impl ContentHash {
    /// Wraps a raw hash value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw hash value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Seed for the jitter generator. Stable for a given upload.
    #[must_use]
    pub const fn seed(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
