//! Error types for composing and exporting

use thiserror::Error;

/// Result type alias for composer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing or exporting an image
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read a selected file
    #[error("Failed to read file: {0}")]
    ReadError(String),

    /// A data URL could not be parsed or decoded into an image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// Failed to rasterize the frame
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// A remote asset could not be loaded and tainting is not allowed
    #[error("Failed to load asset {url}: {reason}")]
    AssetError { url: String, reason: String },

    /// Failed to encode the bitmap
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Failed to save the exported file
    #[error("Download failed: {0}")]
    DownloadError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::DecodeError(err.to_string())
    }
}
