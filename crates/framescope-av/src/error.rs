//! Error types for framescope-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing a media file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file is missing or unreadable, or the container was not recognized.
    #[error("could not open {}: {message}", path.display())]
    OpenFailed { path: PathBuf, message: String },

    /// The container opened but its stream information could not be read.
    #[error("could not read stream info from {}: {message}", path.display())]
    HeaderUnreadable { path: PathBuf, message: String },

    /// No decoder is registered for the stream's codec.
    #[error("no decoder for stream {stream} (codec {codec})")]
    DecoderNotFound { stream: usize, codec: String },

    /// Copying codec parameters or opening the decoder failed.
    #[error("failed to open decoder for stream {stream}: {message}")]
    DecoderOpenFailed { stream: usize, message: String },

    /// The codec library could not be initialized.
    #[error("codec library initialization failed: {0}")]
    Init(String),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unsupported operation or build configuration.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create an open failed error.
    pub fn open_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::OpenFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a header unreadable error.
    pub fn header_unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::HeaderUnreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a decoder not found error.
    pub fn decoder_not_found(stream: usize, codec: impl Into<String>) -> Self {
        Self::DecoderNotFound {
            stream,
            codec: codec.into(),
        }
    }

    /// Create a decoder open failed error.
    pub fn decoder_open_failed(stream: usize, message: impl Into<String>) -> Self {
        Self::DecoderOpenFailed {
            stream,
            message: message.into(),
        }
    }

    /// Whether this error means the input is not a readable container at all.
    pub fn is_unreadable_input(&self) -> bool {
        matches!(
            self,
            Self::OpenFailed { .. } | Self::HeaderUnreadable { .. }
        )
    }
}
