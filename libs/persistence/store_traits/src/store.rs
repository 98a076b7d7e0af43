use std::path::PathBuf;

use async_trait::async_trait;
use menu_models::{Document, StoredFile};
use seed_errors::SeedResult;
use serde_json::{Map, Value};
use url::Url;

use crate::page::{DocumentPage, FilePage, PageRequest};

/// A local artifact to be uploaded into a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub local_path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Document and file operations the seeding pipeline needs from the
/// backend. Listing returns a single page; callers decide how to page.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list_documents(
        &self, collection_id: &str, page: PageRequest,
    ) -> SeedResult<DocumentPage>;

    async fn create_document(
        &self, collection_id: &str, document_id: &str,
        fields: Map<String, Value>,
    ) -> SeedResult<Document>;

    async fn delete_document(
        &self, collection_id: &str, document_id: &str,
    ) -> SeedResult<()>;

    async fn list_files(
        &self, bucket_id: &str, page: PageRequest,
    ) -> SeedResult<FilePage>;

    async fn create_file(
        &self, bucket_id: &str, file_id: &str, upload: FileUpload,
    ) -> SeedResult<StoredFile>;

    async fn delete_file(&self, bucket_id: &str, file_id: &str)
    -> SeedResult<()>;

    fn file_public_url(&self, bucket_id: &str, file_id: &str)
    -> SeedResult<Url>;
}
