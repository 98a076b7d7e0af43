use async_trait::async_trait;
use menu_models::{Document, StoredFile};
use reqwest::{
    Client, RequestBuilder, Response,
    multipart::{Form, Part},
};
use seed_errors::{SeedError, SeedResult};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use store_traits::{
    DocumentPage, FilePage, FileUpload, PageRequest, RemoteStore,
};
use tracing::{debug, instrument};
use url::Url;

use crate::config::AppwriteConfig;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// REST client for the document database and storage APIs.
#[derive(Debug, Clone)]
pub struct AppwriteClient {
    http: Client,
    config: AppwriteConfig,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl AppwriteClient {
    pub fn new(config: AppwriteConfig) -> SeedResult<Self> {
        if config.endpoint.cannot_be_a_base() {
            return Err(SeedError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &AppwriteConfig { &self.config }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.config.endpoint.clone();
        // cannot-be-a-base endpoints are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn documents_url(&self, collection_id: &str) -> Url {
        self.url(&[
            "databases",
            &self.config.database_id,
            "collections",
            collection_id,
            "documents",
        ])
    }

    fn files_url(&self, bucket_id: &str) -> Url {
        self.url(&["storage", "buckets", bucket_id, "files"])
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(PROJECT_HEADER, &self.config.project_id)
            .header(KEY_HEADER, &self.config.api_key)
    }

    fn page_queries(page: &PageRequest) -> Vec<(&'static str, String)> {
        let mut queries = vec![(
            "queries[]",
            json!({ "method": "limit", "values": [page.limit] }).to_string(),
        )];
        if let Some(cursor) = &page.cursor_after {
            queries.push((
                "queries[]",
                json!({ "method": "cursorAfter", "values": [cursor] })
                    .to_string(),
            ));
        }
        queries
    }

    async fn send(&self, request: RequestBuilder) -> SeedResult<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|err| err.message)
            .unwrap_or(body);
        Err(SeedError::api(status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self, request: RequestBuilder,
    ) -> SeedResult<T> {
        let bytes = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RemoteStore for AppwriteClient {
    #[instrument(skip(self, page), fields(limit = page.limit))]
    async fn list_documents(
        &self, collection_id: &str, page: PageRequest,
    ) -> SeedResult<DocumentPage> {
        let request = self
            .http
            .get(self.documents_url(collection_id))
            .query(&Self::page_queries(&page));
        self.send_json(request).await
    }

    #[instrument(skip(self, fields))]
    async fn create_document(
        &self, collection_id: &str, document_id: &str,
        fields: Map<String, Value>,
    ) -> SeedResult<Document> {
        let request = self.http.post(self.documents_url(collection_id)).json(
            &json!({
                "documentId": document_id,
                "data": fields,
            }),
        );
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn delete_document(
        &self, collection_id: &str, document_id: &str,
    ) -> SeedResult<()> {
        let mut url = self.documents_url(collection_id);
        if let Ok(mut path) = url.path_segments_mut() {
            path.push(document_id);
        }
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    #[instrument(skip(self, page), fields(limit = page.limit))]
    async fn list_files(
        &self, bucket_id: &str, page: PageRequest,
    ) -> SeedResult<FilePage> {
        let request = self
            .http
            .get(self.files_url(bucket_id))
            .query(&Self::page_queries(&page));
        self.send_json(request).await
    }

    #[instrument(
        skip(self, upload),
        fields(name = %upload.name, size = upload.size)
    )]
    async fn create_file(
        &self, bucket_id: &str, file_id: &str, upload: FileUpload,
    ) -> SeedResult<StoredFile> {
        let bytes = tokio::fs::read(&upload.local_path).await?;
        debug!(
            "Uploading {} bytes from {}",
            bytes.len(),
            upload.local_path.display()
        );

        let part = Part::bytes(bytes)
            .file_name(upload.name)
            .mime_str(&upload.mime_type)?;
        let form = Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let request = self.http.post(self.files_url(bucket_id)).multipart(form);
        self.send_json(request).await
    }

    #[instrument(skip(self))]
    async fn delete_file(
        &self, bucket_id: &str, file_id: &str,
    ) -> SeedResult<()> {
        let mut url = self.files_url(bucket_id);
        if let Ok(mut path) = url.path_segments_mut() {
            path.push(file_id);
        }
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    fn file_public_url(
        &self, bucket_id: &str, file_id: &str,
    ) -> SeedResult<Url> {
        let mut url = self.url(&[
            "storage", "buckets", bucket_id, "files", file_id, "view",
        ]);
        url.query_pairs_mut()
            .append_pair("project", &self.config.project_id);
        Ok(url)
    }
}
