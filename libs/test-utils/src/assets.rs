use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use seed_errors::{SeedError, SeedResult};
use store_traits::{AssetSource, StagedAsset};
use tempfile::TempDir;

/// Stages fixed bytes for any URL instead of downloading.
#[derive(Debug)]
pub struct FakeAssetSource {
    scratch: TempDir,
    bytes: Vec<u8>,
    missing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl FakeAssetSource {
    pub fn new() -> Self {
        Self {
            scratch: tempfile::tempdir().expect("create scratch dir"),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10],
            missing: Mutex::new(HashSet::new()),
            fetched: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    /// Fetching `url` yields `SeedError::NotFound`.
    pub fn missing(self, url: &str) -> Self {
        self.missing
            .lock()
            .expect("missing set poisoned")
            .insert(url.to_string());
        self
    }

    pub fn scratch_dir(&self) -> &Path { self.scratch.path() }

    /// Files currently left in the scratch directory.
    pub fn leftover_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.scratch.path())
            .map(|entries| {
                entries.filter_map(|e| e.ok()).map(|e| e.path()).collect()
            })
            .unwrap_or_default()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().expect("fetch log poisoned").clone()
    }

    pub fn byte_len(&self) -> u64 { self.bytes.len() as u64 }
}

impl Default for FakeAssetSource {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl AssetSource for FakeAssetSource {
    async fn fetch_and_stage(
        &self, remote_url: &str,
    ) -> SeedResult<StagedAsset> {
        self.fetched
            .lock()
            .expect("fetch log poisoned")
            .push(remote_url.to_string());

        let name = remote_url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("image.jpg")
            .to_string();
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let local_path = self.scratch.path().join(format!("{n}-{name}"));

        let is_missing = self
            .missing
            .lock()
            .expect("missing set poisoned")
            .contains(remote_url);
        if is_missing {
            return Err(SeedError::NotFound { path: local_path });
        }

        tokio::fs::write(&local_path, &self.bytes).await?;
        Ok(StagedAsset::new(
            local_path,
            name,
            "image/jpeg".to_string(),
            self.byte_len(),
        ))
    }
}
