use std::path::PathBuf;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::fs;
use tracing::debug;

use super::{file_url, local_path, Directory, Filesystem};
use crate::error::Result;

/// Filesystem capability backed by the local disk.
///
/// Payloads cross the capability boundary as base64 text, matching what the
/// store keeps in data URLs; bytes on disk are the decoded image.
#[derive(Debug, Clone)]
pub struct LocalFilesystem {
    data_dir: PathBuf,
}

impl LocalFilesystem {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Resolve `path` against `directory` unless it is already absolute
    fn resolve(&self, path: &str, directory: Option<Directory>) -> PathBuf {
        let path = local_path(path);
        if path.is_absolute() {
            return path;
        }

        match directory {
            Some(Directory::Data) => self.data_dir.join(path),
            None => path,
        }
    }
}

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn read_file(&self, path: &str, directory: Option<Directory>) -> Result<String> {
        let full_path = self.resolve(path, directory);
        let bytes = fs::read(&full_path).await?;
        debug!(path = %full_path.display(), bytes = bytes.len(), "read file");
        Ok(STANDARD.encode(bytes))
    }

    async fn write_file(&self, path: &str, data: &str, directory: Directory) -> Result<String> {
        let full_path = self.resolve(path, Some(directory));
        let bytes = STANDARD.decode(data)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full_path, &bytes).await?;

        debug!(path = %full_path.display(), bytes = bytes.len(), "wrote file");
        Ok(file_url(&full_path))
    }
}
