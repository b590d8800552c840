/// Application settings and fixed constants
///
/// Settings come from environment variables with platform defaults:
/// - `PHOTO_GALLERY_RUNTIME`  - `native` (default) or `web`
/// - `PHOTO_GALLERY_DATA_DIR` - app-private data directory
/// - `PHOTO_GALLERY_CACHE_DIR` - cache directory for transient captures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Key under which the whole photo list is stored
pub const PHOTO_STORAGE_KEY: &str = "photos";

/// MIME type used when inlining stored photos as data URLs
pub const JPEG_MIME: &str = "image/jpeg";

/// Quality requested from the camera (0-100)
pub const CAPTURE_QUALITY: u8 = 100;

/// Extension appended to capture filenames
pub const PHOTO_EXTENSION: &str = "jpeg";

const APP_DIR_NAME: &str = "photo-gallery";
const DATABASE_FILE: &str = "storage.db";

/// Execution context the gallery runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeKind {
    /// Direct filesystem access; display URLs are converted file URIs
    #[default]
    Native,
    /// Sandbox-style behavior; stored photos are displayed as inlined data URLs
    Web,
}

impl FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "hybrid" => Ok(RuntimeKind::Native),
            "web" => Ok(RuntimeKind::Web),
            other => Err(format!("Unknown runtime '{}'", other)),
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeKind::Native => write!(f, "native"),
            RuntimeKind::Web => write!(f, "web"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub runtime: RuntimeKind,
    /// App-private directory holding saved photos and the storage database
    pub data_dir: PathBuf,
    /// Directory for transient camera captures
    pub cache_dir: PathBuf,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("PHOTO_GALLERY_RUNTIME").ok(),
            std::env::var("PHOTO_GALLERY_DATA_DIR").ok(),
            std::env::var("PHOTO_GALLERY_CACHE_DIR").ok(),
        )
    }

    fn from_vars(runtime: Option<String>, data_dir: Option<String>, cache_dir: Option<String>) -> Self {
        let runtime = match runtime {
            Some(value) => value.parse().unwrap_or_else(|err| {
                warn!("{}, falling back to native", err);
                RuntimeKind::Native
            }),
            None => RuntimeKind::Native,
        };

        let data_dir = data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir(dirs::data_dir()));
        let cache_dir = cache_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| default_dir(dirs::cache_dir()));

        Settings { runtime, data_dir, cache_dir }
    }

    /// Path of the SQLite key-value database
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Where the camera leaves captures before they are saved
    pub fn capture_dir(&self) -> PathBuf {
        self.cache_dir.join("captures")
    }
}

/// Platform directory, falling back to the home directory and then the working directory
///
/// - Linux: ~/.local/share/photo-gallery
/// - macOS: ~/Library/Application Support/photo-gallery
/// - Windows: %APPDATA%\photo-gallery
fn default_dir(base: Option<PathBuf>) -> PathBuf {
    let mut path = base
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR_NAME);
    path
}
