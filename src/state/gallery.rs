use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use super::data::{collection_from_json, collection_to_json, photo_filename, PhotoRecord};
use crate::config::{RuntimeKind, Settings, CAPTURE_QUALITY, PHOTO_STORAGE_KEY};
use crate::error::{GalleryError, Result};
use crate::platform::runtime::strategy_for;
use crate::platform::{
    CaptureOptions, CapturedPhoto, Camera, DialogCamera, Filesystem, KeyValueStore,
    LocalFilesystem, RuntimeStrategy, SqliteStore,
};

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// The PhotoGallery owns the ordered photo list (newest first) and keeps it
/// in sync with its durable copy under the `photos` key.
///
/// Observers get every change through `subscribe()`.
pub struct PhotoGallery {
    camera: Arc<dyn Camera>,
    filesystem: Arc<dyn Filesystem>,
    storage: Arc<dyn KeyValueStore>,
    runtime: Box<dyn RuntimeStrategy>,
    /// Milliseconds since epoch, used for capture filenames
    clock: Clock,
    photos: watch::Sender<Vec<PhotoRecord>>,
    loaded: AtomicBool,
    /// Held for the whole of a load or capture
    in_flight: Mutex<()>,
}

impl PhotoGallery {
    pub fn new(
        camera: Arc<dyn Camera>,
        filesystem: Arc<dyn Filesystem>,
        storage: Arc<dyn KeyValueStore>,
        runtime: Box<dyn RuntimeStrategy>,
    ) -> Self {
        let (photos, _) = watch::channel(Vec::new());
        Self {
            camera,
            filesystem,
            storage,
            runtime,
            clock: Box::new(|| Utc::now().timestamp_millis()),
            photos,
            loaded: AtomicBool::new(false),
            in_flight: Mutex::new(()),
        }
    }

    /// Wire up the desktop capabilities described by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let storage = SqliteStore::open(settings.database_path())?;
        let filesystem = LocalFilesystem::new(settings.data_dir.clone());
        let camera = DialogCamera::new(settings.capture_dir());
        camera.clear_captures()?;

        Ok(Self::new(
            Arc::new(camera),
            Arc::new(filesystem),
            Arc::new(storage),
            strategy_for(settings.runtime),
        ))
    }

    /// Replace the wall clock used for capture filenames
    #[cfg(test)]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn runtime_kind(&self) -> RuntimeKind {
        self.runtime.kind()
    }

    /// Current photo list
    pub fn photos(&self) -> Vec<PhotoRecord> {
        self.photos.borrow().clone()
    }

    /// Receive the photo list every time it changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<PhotoRecord>> {
        self.photos.subscribe()
    }

    /// Populate the list from durable storage.
    ///
    /// Runs once per gallery; later calls return the current list untouched.
    /// The in-memory list is replaced wholesale, never merged.
    pub async fn load(&self) -> Result<Vec<PhotoRecord>> {
        let _guard = self.in_flight.lock().await;
        if self.loaded.load(Ordering::Acquire) {
            return Ok(self.photos());
        }

        let mut photos = match self.storage.get(PHOTO_STORAGE_KEY).await? {
            Some(value) if !value.is_empty() => collection_from_json(&value)?,
            _ => Vec::new(),
        };

        self.runtime
            .resolve_display_urls(self.filesystem.as_ref(), &mut photos)
            .await?;

        info!("🖼️  Loaded {} photos ({} runtime)", photos.len(), self.runtime.kind());

        self.photos.send_replace(photos.clone());
        self.loaded.store(true, Ordering::Release);
        Ok(photos)
    }

    /// Capture a photo, save it and put it at the head of the list.
    ///
    /// Rejects with `CaptureInProgress` while another load or capture runs,
    /// and with `NotLoaded` until `load()` has succeeded, so a capture can
    /// never overwrite a durable list that was not read.
    ///
    /// The durable list is written before the in-memory list changes. On any
    /// failure the in-memory list is left unchanged.
    pub async fn take_photo(&self) -> Result<PhotoRecord> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| GalleryError::CaptureInProgress)?;
        if !self.loaded.load(Ordering::Acquire) {
            return Err(GalleryError::NotLoaded);
        }

        let photo = self.camera.capture(CaptureOptions::camera(CAPTURE_QUALITY)).await?;
        let filename = photo_filename((self.clock)());
        let saved = self.save_picture(&photo, &filename).await?;

        let mut updated = self.photos();
        updated.insert(0, saved.clone());

        let json = collection_to_json(&updated)?;
        self.storage.set(PHOTO_STORAGE_KEY, &json).await?;
        self.photos.send_replace(updated);

        info!("📸 Saved photo {}", saved.storage_path);
        Ok(saved)
    }

    /// Write a capture under `filename` and build its record
    pub async fn save_picture(&self, photo: &CapturedPhoto, filename: &str) -> Result<PhotoRecord> {
        debug!(filename, "saving picture");
        self.runtime
            .save_picture(self.filesystem.as_ref(), photo, filename)
            .await
    }
}

impl std::fmt::Debug for PhotoGallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoGallery")
            .field("runtime", &self.runtime.kind())
            .field("photos", &self.photos.borrow().len())
            .finish()
    }
}
