//! Errors raised while turning an upload into an artifact.

use thiserror::Error;

use super::StoreError;

/// Per-request pipeline error.
///
/// Client errors are problems with the upload itself and map to 4xx;
/// the rest are server-side failures that a caller may retry.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum MemeError {
    #[error("malformed upload: {reason}")]
    MalformedUpload { reason: String },

    #[error("missing form field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid noun: {reason}")]
    InvalidNoun { reason: String },

    #[error("upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },

    #[error("unsupported or corrupt image: {message}")]
    Decode { message: String },

    #[error("image is {width}x{height}, too small to shake by {shake}px")]
    DegenerateGeometry { width: u32, height: u32, shake: u32 },

    #[error("caption rendering failed: {message}")]
    Render { message: String },

    #[error("gif encoding failed: {message}")]
    Encode { message: String },

    #[error("artifact storage failed")]
    Store(#[from] StoreError),

    #[error("pipeline task failed: {message}")]
    Task { message: String },
}

impl MemeError {
    /// Creates malformed upload error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedUpload {
            reason: reason.into(),
        }
    }

    /// Creates invalid noun error.
    #[must_use]
    pub fn invalid_noun(reason: impl Into<String>) -> Self {
        Self::InvalidNoun {
            reason: reason.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates render error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Creates encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates task error.
    #[must_use]
    pub fn task(message: impl Into<String>) -> Self {
        Self::Task {
            message: message.into(),
        }
    }

    /// Returns whether the upload itself is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedUpload { .. }
                | Self::MissingField { .. }
                | Self::InvalidNoun { .. }
                | Self::UploadTooLarge { .. }
                | Self::Decode { .. }
                | Self::DegenerateGeometry { .. }
        )
    }
}

/// Result type for pipeline operations.
pub type MemeResult<T> = Result<T, MemeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_and_server_classification() {
        assert!(MemeError::decode("not an image").is_client_error());
        assert!(
            MemeError::DegenerateGeometry {
                width: 10,
                height: 10,
                shake: 20
            }
            .is_client_error()
        );
        assert!(!MemeError::encode("disk full").is_client_error());
        assert!(!MemeError::task("panicked").is_client_error());
    }
}
