use std::path::{Path, PathBuf};

use async_trait::async_trait;
use seed_errors::SeedResult;
use tracing::{debug, warn};

use crate::store::FileUpload;

/// A downloaded asset waiting in scratch storage.
///
/// The local file is removed when the value is dropped, so every exit
/// path of the per-item work leaves the scratch directory clean.
#[derive(Debug)]
pub struct StagedAsset {
    local_path: PathBuf,
    file_name: String,
    mime_type: String,
    byte_size: u64,
}

impl StagedAsset {
    pub fn new(
        local_path: PathBuf, file_name: String, mime_type: String,
        byte_size: u64,
    ) -> Self {
        Self {
            local_path,
            file_name,
            mime_type,
            byte_size,
        }
    }

    pub fn local_path(&self) -> &Path { &self.local_path }

    pub fn file_name(&self) -> &str { &self.file_name }

    pub fn mime_type(&self) -> &str { &self.mime_type }

    pub fn byte_size(&self) -> u64 { self.byte_size }

    pub fn set_byte_size(&mut self, byte_size: u64) {
        self.byte_size = byte_size;
    }

    pub fn upload(&self) -> FileUpload {
        FileUpload {
            local_path: self.local_path.clone(),
            name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size: self.byte_size,
        }
    }
}

impl Drop for StagedAsset {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.local_path) {
            Ok(()) => {
                debug!("Removed staged asset {}", self.local_path.display())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staged asset {}: {}",
                self.local_path.display(),
                e
            ),
        }
    }
}

/// Retrieves a remote asset into local scratch storage.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch_and_stage(&self, remote_url: &str)
    -> SeedResult<StagedAsset>;
}
