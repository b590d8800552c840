/// Desktop camera capability
///
/// Desktops have no reliable live camera, so the capture surface is a native
/// file dialog. The chosen image is re-encoded as a JPEG at the requested
/// quality and left in a transient capture directory, which is what a mobile
/// camera plugin hands back as well.
///
/// Captures live for one session: web runtimes display a new photo straight
/// from its capture file, so they are only cleared at the next startup.

use async_trait::async_trait;
use chrono::Utc;
use image::{codecs::jpeg::JpegEncoder, DynamicImage};
use rfd::FileDialog;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{info, warn};

use super::{file_url, CaptureOptions, CapturedPhoto, Camera};
use crate::error::{GalleryError, Result};

/// Extensions the capture dialog accepts
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone)]
pub struct DialogCamera {
    capture_dir: PathBuf,
}

impl DialogCamera {
    pub fn new(capture_dir: PathBuf) -> Self {
        Self { capture_dir }
    }

    /// Remove captures left behind by earlier sessions.
    /// Returns the number of files deleted.
    pub fn clear_captures(&self) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.capture_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) => warn!("⚠️  Could not remove stale capture {}: {}", path.display(), err),
            }
        }

        if removed > 0 {
            info!("🧹 Removed {} stale captures", removed);
        }
        Ok(removed)
    }
}

#[async_trait]
impl Camera for DialogCamera {
    async fn capture(&self, options: CaptureOptions) -> Result<CapturedPhoto> {
        // The dialog blocks its thread until dismissed
        let picked = task::spawn_blocking(|| {
            FileDialog::new()
                .set_title("Take Photo")
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file()
        })
        .await
        .map_err(|e| GalleryError::Capture(format!("Task join error: {}", e)))?;

        let source = picked.ok_or(GalleryError::CaptureCancelled)?;
        info!("📸 Capturing from {}", source.display());

        let quality = options.quality;
        let jpeg = task::spawn_blocking(move || encode_jpeg(&source, quality))
            .await
            .map_err(|e| GalleryError::Capture(format!("Task join error: {}", e)))??;

        tokio::fs::create_dir_all(&self.capture_dir).await?;
        let path = self
            .capture_dir
            .join(format!("capture-{}.jpeg", Utc::now().timestamp_millis()));
        tokio::fs::write(&path, &jpeg).await?;

        Ok(CapturedPhoto {
            path: Some(path.to_string_lossy().into_owned()),
            web_path: Some(file_url(&path)),
            format: "jpeg".to_string(),
        })
    }
}

/// Decode any supported image file and re-encode it as JPEG
fn encode_jpeg(source: &Path, quality: u8) -> Result<Vec<u8>> {
    let img = image::open(source)
        .map_err(|e| GalleryError::Capture(format!("Failed to decode {}: {}", source.display(), e)))?;
    encode_image(&img, quality)
}

fn encode_image(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)))
        .map_err(|e| GalleryError::Capture(format!("Failed to encode JPEG: {}", e)))?;
    Ok(out)
}
