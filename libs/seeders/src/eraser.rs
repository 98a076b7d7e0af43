use std::collections::HashSet;

use seed_errors::{SeedError, SeedResult};
use store_traits::{PageRequest, RemoteStore};
use tracing::{info, instrument};

use crate::{
    progress::ProgressTracker,
    report::Stage,
    throttle::{Pace, Throttle},
};

/// Drains collections and the asset bucket.
///
/// Every pass re-lists the first page until the store reports nothing
/// left, so remnants beyond a single page are never left behind.
pub struct Eraser<'a> {
    store: &'a dyn RemoteStore,
    throttle: &'a Throttle,
    page_size: u32,
    progress: Option<&'a ProgressTracker>,
}

impl<'a> Eraser<'a> {
    pub fn new(
        store: &'a dyn RemoteStore, throttle: &'a Throttle, page_size: u32,
    ) -> Self {
        Self {
            store,
            throttle,
            page_size,
            progress: None,
        }
    }

    pub fn with_progress(
        mut self, progress: Option<&'a ProgressTracker>,
    ) -> Self {
        self.progress = progress;
        self
    }

    fn report(&self, deleted: usize, total: usize, message: String) {
        if let Some(tracker) = self.progress {
            tracker.update(Stage::Erase, deleted, total, message);
        }
    }

    /// Deletes every document in `collection_id`; returns how many.
    #[instrument(skip(self))]
    pub async fn erase_collection(
        &self, collection_id: &str,
    ) -> SeedResult<usize> {
        let mut deleted = HashSet::new();

        loop {
            let request = PageRequest::first(self.page_size);
            let page =
                self.store.list_documents(collection_id, request).await?;
            if page.documents.is_empty() {
                break;
            }
            let total = deleted.len() + page.total as usize;

            for doc in page.documents {
                if !deleted.insert(doc.id.clone()) {
                    return Err(SeedError::StoreInconsistent {
                        target: collection_id.to_string(),
                        id: doc.id,
                    });
                }
                self.throttle.before(Pace::Document).await;
                info!("Deleting document {} in {}", doc.id, collection_id);
                self.store.delete_document(collection_id, &doc.id).await?;
                self.report(
                    deleted.len(),
                    total,
                    format!("{collection_id}: deleted {}", doc.id),
                );
            }
        }

        info!("Cleared {} documents from {}", deleted.len(), collection_id);
        Ok(deleted.len())
    }

    /// Deletes every file in `bucket_id`; returns how many.
    #[instrument(skip(self))]
    pub async fn erase_bucket(&self, bucket_id: &str) -> SeedResult<usize> {
        let mut deleted = HashSet::new();

        loop {
            let page = self
                .store
                .list_files(bucket_id, PageRequest::first(self.page_size))
                .await?;
            if page.files.is_empty() {
                break;
            }
            let total = deleted.len() + page.total as usize;

            for file in page.files {
                if !deleted.insert(file.id.clone()) {
                    return Err(SeedError::StoreInconsistent {
                        target: bucket_id.to_string(),
                        id: file.id,
                    });
                }
                self.throttle.before(Pace::Document).await;
                info!("Deleting file {}", file.id);
                self.store.delete_file(bucket_id, &file.id).await?;
                self.report(
                    deleted.len(),
                    total,
                    format!("{bucket_id}: deleted {}", file.id),
                );
            }
        }

        info!("Cleared {} files from {}", deleted.len(), bucket_id);
        Ok(deleted.len())
    }
}
