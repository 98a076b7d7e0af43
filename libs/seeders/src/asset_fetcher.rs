use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use seed_errors::{SeedError, SeedResult};
use store_traits::{AssetSource, StagedAsset};
use tracing::{info, instrument};
use url::Url;
use uuid::Uuid;

const DEFAULT_MIME: &str = "image/jpeg";

/// Downloads images into a scratch directory, one attempt per URL.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    http: Client,
    scratch_dir: PathBuf,
}

impl HttpAssetFetcher {
    pub fn new(scratch_dir: PathBuf, timeout: Duration) -> SeedResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, scratch_dir })
    }
}

/// Last non-empty path segment, or a timestamped fallback.
pub fn derive_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| {
            format!("file-{}.jpg", Utc::now().timestamp_millis())
        })
}

pub fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        _ => DEFAULT_MIME,
    }
}

#[async_trait]
impl AssetSource for HttpAssetFetcher {
    #[instrument(skip(self))]
    async fn fetch_and_stage(
        &self, remote_url: &str,
    ) -> SeedResult<StagedAsset> {
        let url = Url::parse(remote_url)?;
        let file_name = derive_file_name(&url);
        let mime_type = mime_for(&file_name).to_string();

        tokio::fs::create_dir_all(&self.scratch_dir).await?;
        let local_path = self
            .scratch_dir
            .join(format!("{}-{}", Uuid::now_v7().simple(), file_name));

        info!("Downloading image: {}", remote_url);
        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        // Guard first so a failed write or check still cleans up.
        let mut staged =
            StagedAsset::new(local_path.clone(), file_name, mime_type, 0);
        tokio::fs::write(&local_path, &bytes).await?;

        let metadata = tokio::fs::metadata(&local_path)
            .await
            .map_err(|_| SeedError::NotFound {
                path: local_path.clone(),
            })?;
        if !metadata.is_file() {
            return Err(SeedError::NotFound { path: local_path });
        }
        staged.set_byte_size(metadata.len());

        info!("Downloaded to: {}", local_path.display());
        Ok(staged)
    }
}
