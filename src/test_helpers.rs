//! In-memory capability doubles for the gallery test suite.
//!
//! - `MockCamera` replays queued capture results
//! - `GatedCamera` blocks inside `capture` until released
//! - `MemoryFilesystem` keeps base64 payloads in a map rooted at `/data`
//! - `MemoryStore` is a map-backed key-value store

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::error::{GalleryError, Result};
use crate::platform::{local_path, Camera, CaptureOptions, CapturedPhoto, Directory, Filesystem, KeyValueStore};

/// Web-style capture with only a transient URL
pub fn captured(web_path: &str) -> CapturedPhoto {
    CapturedPhoto {
        path: None,
        web_path: Some(web_path.to_string()),
        format: "jpeg".to_string(),
    }
}

// =========================================================================
// Camera
// =========================================================================

#[derive(Default)]
pub struct MockCamera {
    results: Mutex<VecDeque<Result<CapturedPhoto>>>,
    requests: Mutex<Vec<CaptureOptions>>,
}

impl MockCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capture(self, photo: CapturedPhoto) -> Self {
        self.results.lock().unwrap().push_back(Ok(photo));
        self
    }

    pub fn with_error(self, err: GalleryError) -> Self {
        self.results.lock().unwrap().push_back(Err(err));
        self
    }

    /// Options of every capture request so far
    pub fn requests(&self) -> Vec<CaptureOptions> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Camera for MockCamera {
    async fn capture(&self, options: CaptureOptions) -> Result<CapturedPhoto> {
        self.requests.lock().unwrap().push(options);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GalleryError::Capture("No capture queued".into())))
    }
}

pub struct GatedCamera {
    photo: CapturedPhoto,
    entered: Notify,
    release: Notify,
}

impl GatedCamera {
    pub fn new(photo: CapturedPhoto) -> Self {
        Self {
            photo,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }

    pub async fn wait_until_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl Camera for GatedCamera {
    async fn capture(&self, _options: CaptureOptions) -> Result<CapturedPhoto> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.photo.clone())
    }
}

// =========================================================================
// Filesystem
// =========================================================================

#[derive(Default)]
pub struct MemoryFilesystem {
    files: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file at an absolute key such as `/data/1.jpeg`
    pub fn insert(&self, path: &str, data: &str) {
        self.files.lock().unwrap().insert(path.to_string(), data.to_string());
    }

    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.files.lock().unwrap().is_empty()
    }

    /// Make every following write fail with an I/O error
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn key(path: &str, directory: Option<Directory>) -> String {
        let path = local_path(path).to_string_lossy().into_owned();
        if path.starts_with('/') {
            return path;
        }
        match directory {
            Some(Directory::Data) => format!("/data/{}", path),
            None => path,
        }
    }
}

#[async_trait]
impl Filesystem for MemoryFilesystem {
    async fn read_file(&self, path: &str, directory: Option<Directory>) -> Result<String> {
        let key = Self::key(path, directory);
        self.contents(&key).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{} not found", key)).into()
        })
    }

    async fn write_file(&self, path: &str, data: &str, directory: Directory) -> Result<String> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
        }
        let key = Self::key(path, Some(directory));
        self.insert(&key, data);
        Ok(format!("file://{}", key))
    }
}

// =========================================================================
// Key-value store
// =========================================================================

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        self
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Make every following `set` fail with an I/O error
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "database is locked").into());
        }
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
