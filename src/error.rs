/// Error types shared by the gallery store and the platform capabilities
///
/// Every failure propagates to the caller of `load()` / `take_photo()`.
/// Nothing is retried or recovered inside the store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// The user dismissed the capture surface without taking a photo
    #[error("Capture cancelled")]
    CaptureCancelled,

    /// The camera failed or returned an unusable result
    #[error("Capture failed: {0}")]
    Capture(String),

    /// A second capture was requested while one is still running
    #[error("A capture is already in progress")]
    CaptureInProgress,

    /// Capture requested before the saved photos were loaded
    #[error("Saved photos have not been loaded")]
    NotLoaded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Malformed durable content
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data URL / base64 conversion failed
    #[error("Conversion error: {0}")]
    Conversion(String),
}

pub type Result<T> = std::result::Result<T, GalleryError>;

impl From<base64::DecodeError> for GalleryError {
    fn from(err: base64::DecodeError) -> Self {
        GalleryError::Conversion(format!("Invalid base64 data: {}", err))
    }
}
