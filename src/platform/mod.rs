/// Platform capabilities consumed by the gallery store
///
/// This module defines the contracts the store talks to:
/// - `Camera` - captures a single photo
/// - `Filesystem` - reads and writes base64 file payloads
/// - `KeyValueStore` - durable text values under fixed keys
/// - `RuntimeStrategy` - native vs web persistence and display rules (runtime.rs)
///
/// Desktop implementations live in camera.rs, filesystem.rs and kv.rs.

pub mod camera;
pub mod filesystem;
pub mod kv;
pub mod runtime;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

pub use camera::DialogCamera;
pub use filesystem::LocalFilesystem;
pub use kv::SqliteStore;
pub use runtime::{split_data_url, RuntimeStrategy};

/// Base directory a relative filesystem path is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directory {
    /// App-private data directory
    Data,
}

/// A single live-camera capture, handed back by reference
/// (native path plus a web-loadable URL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// JPEG quality, 0-100
    pub quality: u8,
}

impl CaptureOptions {
    pub fn camera(quality: u8) -> Self {
        Self {
            quality: quality.min(100),
        }
    }
}

/// What the camera returns for one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    /// Native file reference, when the runtime exposes one
    pub path: Option<String>,
    /// Transient URL the rendering layer can load for this session
    pub web_path: Option<String>,
    /// Image format, e.g. "jpeg"
    pub format: String,
}

#[async_trait]
pub trait Camera: Send + Sync {
    /// Capture one photo. Rejects when the user cancels or the device fails.
    async fn capture(&self, options: CaptureOptions) -> Result<CapturedPhoto>;
}

#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Read a file and return its contents as base64 text.
    /// Without a directory the path is used as given.
    async fn read_file(&self, path: &str, directory: Option<Directory>) -> Result<String>;

    /// Write base64 `data` under `path` and return the durable URI of the file.
    async fn write_file(&self, path: &str, data: &str, directory: Directory) -> Result<String>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// `file://` URL for a local path
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Local path for a `file://` URL; anything else is taken as a path already
pub fn local_path(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
}
