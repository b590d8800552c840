/// Native vs web persistence rules
///
/// The store never branches on the runtime itself. One `RuntimeStrategy` is
/// picked at startup and decides:
/// - how a capture is turned into a saved file and a `PhotoRecord`
/// - how display URLs are re-derived for records loaded from storage

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::debug;

use super::{local_path, CapturedPhoto, Directory, Filesystem};
use crate::config::{RuntimeKind, JPEG_MIME};
use crate::error::{GalleryError, Result};
use crate::state::data::PhotoRecord;

#[async_trait]
pub trait RuntimeStrategy: Send + Sync {
    fn kind(&self) -> RuntimeKind;

    /// Persist a capture under `filename` in the data directory
    async fn save_picture(
        &self,
        filesystem: &dyn Filesystem,
        photo: &CapturedPhoto,
        filename: &str,
    ) -> Result<PhotoRecord>;

    /// Fill in `display_url` for records just read from durable storage
    async fn resolve_display_urls(
        &self,
        filesystem: &dyn Filesystem,
        photos: &mut [PhotoRecord],
    ) -> Result<()>;
}

/// Strategy for the given runtime
pub fn strategy_for(kind: RuntimeKind) -> Box<dyn RuntimeStrategy> {
    match kind {
        RuntimeKind::Native => Box::new(NativeRuntime),
        RuntimeKind::Web => Box::new(WebRuntime),
    }
}

/// Direct file access: files are copied by native path and displayed by URI
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

#[async_trait]
impl RuntimeStrategy for NativeRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Native
    }

    async fn save_picture(
        &self,
        filesystem: &dyn Filesystem,
        photo: &CapturedPhoto,
        filename: &str,
    ) -> Result<PhotoRecord> {
        let path = photo
            .path
            .as_deref()
            .ok_or_else(|| GalleryError::Capture("Capture has no native file path".into()))?;

        let data = filesystem.read_file(path, None).await?;
        let uri = filesystem.write_file(filename, &data, Directory::Data).await?;

        debug!(%uri, "saved native capture");
        Ok(PhotoRecord {
            display_url: Some(to_displayable_url(&uri)),
            storage_path: uri,
        })
    }

    async fn resolve_display_urls(
        &self,
        _filesystem: &dyn Filesystem,
        photos: &mut [PhotoRecord],
    ) -> Result<()> {
        // storage_path is already a durable URI; converting it needs no I/O
        for photo in photos.iter_mut() {
            photo.display_url = Some(to_displayable_url(&photo.storage_path));
        }
        Ok(())
    }
}

/// Sandbox behavior: captures are fetched from their transient URL and
/// stored photos are displayed as inlined JPEG data URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct WebRuntime;

#[async_trait]
impl RuntimeStrategy for WebRuntime {
    fn kind(&self) -> RuntimeKind {
        RuntimeKind::Web
    }

    async fn save_picture(
        &self,
        filesystem: &dyn Filesystem,
        photo: &CapturedPhoto,
        filename: &str,
    ) -> Result<PhotoRecord> {
        let web_path = photo
            .web_path
            .as_deref()
            .ok_or_else(|| GalleryError::Capture("Capture has no web path".into()))?;

        let data_url = base64_from_path(web_path).await?;
        let (_, payload) = split_data_url(&data_url)?;
        filesystem.write_file(filename, payload, Directory::Data).await?;

        debug!(filename, "saved web capture");
        // The transient capture URL stays valid for this session; load() rebuilds from the file next time
        Ok(PhotoRecord {
            storage_path: filename.to_string(),
            display_url: Some(web_path.to_string()),
        })
    }

    async fn resolve_display_urls(
        &self,
        filesystem: &dyn Filesystem,
        photos: &mut [PhotoRecord],
    ) -> Result<()> {
        for photo in photos.iter_mut() {
            let data = filesystem
                .read_file(&photo.storage_path, Some(Directory::Data))
                .await?;
            photo.display_url = Some(format!("data:{};base64,{}", JPEG_MIME, data));
        }
        Ok(())
    }
}

/// Convert a durable file URI into something the renderer loads directly.
/// For iced that is the plain local path; other URIs pass through untouched.
pub fn to_displayable_url(uri: &str) -> String {
    if uri.starts_with("file://") {
        local_path(uri).to_string_lossy().into_owned()
    } else {
        uri.to_string()
    }
}

/// Fetch the resource at `path` and return it as a base64 data URL.
///
/// Accepts `data:` URLs, `file://` URLs and plain filesystem paths.
pub async fn base64_from_path(path: &str) -> Result<String> {
    let (mime, bytes) = fetch(path).await?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// Split a base64 data URL into (MIME type, base64 payload)
pub fn split_data_url(url: &str) -> Result<(&str, &str)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| GalleryError::Conversion("Not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| GalleryError::Conversion("Data URL has no payload".into()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| GalleryError::Conversion("Data URL is not base64-encoded".into()))?;
    Ok((mime, payload))
}

async fn fetch(path: &str) -> Result<(String, Vec<u8>)> {
    if path.starts_with("data:") {
        let (mime, payload) = split_data_url(path)?;
        let bytes = STANDARD.decode(payload)?;
        let mime = if mime.is_empty() { JPEG_MIME } else { mime };
        return Ok((mime.to_string(), bytes));
    }

    let file_path = local_path(path);
    let bytes = tokio::fs::read(&file_path).await?;
    Ok((mime_for(&file_path).to_string(), bytes))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => JPEG_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MemoryFilesystem;
    use tempfile::TempDir;

    fn capture(path: Option<&str>, web_path: Option<&str>) -> CapturedPhoto {
        CapturedPhoto {
            path: path.map(String::from),
            web_path: web_path.map(String::from),
            format: "jpeg".into(),
        }
    }

    #[test]
    fn test_split_data_url() {
        let (mime, payload) = split_data_url("data:image/png;base64,iVBO").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(payload, "iVBO");

        assert!(matches!(split_data_url("file:///x.jpeg"), Err(GalleryError::Conversion(_))));
        assert!(matches!(split_data_url("data:text/plain,hello"), Err(GalleryError::Conversion(_))));
        assert!(matches!(split_data_url("data:image/jpeg;base64"), Err(GalleryError::Conversion(_))));
    }

    #[test]
    fn test_to_displayable_url() {
        assert_eq!(to_displayable_url("file:///data/1.jpeg"), "/data/1.jpeg");
        assert_eq!(to_displayable_url("1.jpeg"), "1.jpeg");
    }

    #[tokio::test]
    async fn test_base64_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("capture.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let url = base64_from_path(&format!("file://{}", path.display())).await.unwrap();
        assert_eq!(url, "data:image/png;base64,AQID");

        let url = base64_from_path(path.to_str().unwrap()).await.unwrap();
        assert_eq!(url, "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_base64_from_data_url() {
        let url = base64_from_path("data:image/jpeg;base64,AA==").await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,AA==");

        let url = base64_from_path("data:;base64,AA==").await.unwrap();
        assert_eq!(url, "data:image/jpeg;base64,AA==");
    }

    #[tokio::test]
    async fn test_base64_from_non_base64_data_url_fails() {
        let err = base64_from_path("data:text/plain,hello").await.unwrap_err();
        assert!(matches!(err, GalleryError::Conversion(_)));

        let err = base64_from_path("data:image/jpeg;base64,@@@").await.unwrap_err();
        assert!(matches!(err, GalleryError::Conversion(_)));
    }

    #[tokio::test]
    async fn test_native_save_copies_native_path() {
        let fs = MemoryFilesystem::new();
        fs.insert("/tmp/capture.jpeg", "AA==");

        let record = NativeRuntime
            .save_picture(&fs, &capture(Some("/tmp/capture.jpeg"), Some("file:///tmp/capture.jpeg")), "123.jpeg")
            .await
            .unwrap();

        assert_eq!(record.storage_path, "file:///data/123.jpeg");
        assert_eq!(record.display_url.as_deref(), Some("/data/123.jpeg"));
        assert_eq!(fs.contents("/data/123.jpeg").as_deref(), Some("AA=="));
    }

    #[tokio::test]
    async fn test_native_save_without_path_is_capture_error() {
        let fs = MemoryFilesystem::new();
        let err = NativeRuntime
            .save_picture(&fs, &capture(None, Some("data:image/jpeg;base64,AA==")), "1.jpeg")
            .await
            .unwrap_err();

        assert!(matches!(err, GalleryError::Capture(_)));
        assert!(fs.is_empty());
    }

    #[tokio::test]
    async fn test_web_save_keeps_transient_display_url() {
        let fs = MemoryFilesystem::new();
        let web_path = "data:image/jpeg;base64,AAEC";

        let record = WebRuntime
            .save_picture(&fs, &capture(None, Some(web_path)), "123.jpeg")
            .await
            .unwrap();

        assert_eq!(record.storage_path, "123.jpeg");
        assert_eq!(record.display_url.as_deref(), Some(web_path));
        // Only the payload is written, so load() can rebuild the data URL
        assert_eq!(fs.contents("/data/123.jpeg").as_deref(), Some("AAEC"));
    }

    #[tokio::test]
    async fn test_web_save_without_web_path_is_capture_error() {
        let fs = MemoryFilesystem::new();
        let err = WebRuntime
            .save_picture(&fs, &capture(Some("/tmp/x.jpeg"), None), "1.jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Capture(_)));
    }

    #[tokio::test]
    async fn test_web_resolve_inlines_stored_bytes() {
        let fs = MemoryFilesystem::new();
        fs.insert("/data/123.jpeg", "AA==");
        let mut photos = vec![PhotoRecord::new("123.jpeg")];

        WebRuntime.resolve_display_urls(&fs, &mut photos).await.unwrap();

        assert_eq!(photos[0].display_url.as_deref(), Some("data:image/jpeg;base64,AA=="));
    }

    #[tokio::test]
    async fn test_web_resolve_missing_file_fails() {
        let fs = MemoryFilesystem::new();
        let mut photos = vec![PhotoRecord::new("gone.jpeg")];

        let err = WebRuntime.resolve_display_urls(&fs, &mut photos).await.unwrap_err();
        assert!(matches!(err, GalleryError::Io(_)));
    }

    #[tokio::test]
    async fn test_native_resolve_converts_uri_without_io() {
        let fs = MemoryFilesystem::new();
        let mut photos = vec![PhotoRecord::new("file:///data/1.jpeg")];

        NativeRuntime.resolve_display_urls(&fs, &mut photos).await.unwrap();

        assert_eq!(photos[0].display_url.as_deref(), Some("/data/1.jpeg"));
    }

    #[test]
    fn test_strategy_for() {
        assert_eq!(strategy_for(RuntimeKind::Native).kind(), RuntimeKind::Native);
        assert_eq!(strategy_for(RuntimeKind::Web).kind(), RuntimeKind::Web);
    }
}
