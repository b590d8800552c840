/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the durable store and the UI layer.

use serde::{Deserialize, Serialize};

use crate::config::PHOTO_EXTENSION;

/// Represents a single saved photo
///
/// Only `storage_path` is persisted. `display_url` depends on the runtime
/// and is re-derived on every load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Durable file location, stable across restarts
    #[serde(rename = "storagePath", alias = "filepath")]
    pub storage_path: String,
    /// URL the grid can load directly (file path or data URL)
    #[serde(skip)]
    pub display_url: Option<String>,
}

impl PhotoRecord {
    /// Record with no display URL resolved yet
    #[cfg(test)]
    pub fn new(storage_path: impl Into<String>) -> Self {
        Self {
            storage_path: storage_path.into(),
            display_url: None,
        }
    }
}

/// Convert the photo list to its durable JSON form
pub fn collection_to_json(photos: &[PhotoRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(photos)
}

/// Parse the photo list from its durable JSON form
pub fn collection_from_json(json: &str) -> Result<Vec<PhotoRecord>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Filename for a capture taken at `timestamp_millis` (ms since epoch).
/// Two captures in the same millisecond get the same name.
pub fn photo_filename(timestamp_millis: i64) -> String {
    format!("{}.{}", timestamp_millis, PHOTO_EXTENSION)
}
