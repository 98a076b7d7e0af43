use std::{
    collections::{BTreeMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use menu_models::{Document, StoredFile};
use seed_errors::{SeedError, SeedResult};
use serde_json::{Map, Value};
use store_traits::{
    DocumentPage, FilePage, FileUpload, PageRequest, RemoteStore,
};
use url::Url;

/// Operations the in-memory store can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    ListDocuments,
    CreateDocument,
    DeleteDocument,
    ListFiles,
    CreateFile,
    DeleteFile,
}

/// One recorded call against the store, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ListDocuments { collection: String },
    CreateDocument { collection: String, id: String },
    DeleteDocument { collection: String, id: String },
    ListFiles { bucket: String },
    CreateFile { bucket: String, id: String, name: String },
    DeleteFile { bucket: String, id: String },
}

#[derive(Debug)]
struct FailPoint {
    op: StoreOp,
    target: String,
    /// 1-based occurrence of `op` on `target` that fails.
    nth: usize,
    seen: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    collections: BTreeMap<String, Vec<Document>>,
    buckets: BTreeMap<String, Vec<StoredFile>>,
    calls: Vec<StoreCall>,
    fail_points: Vec<FailPoint>,
    seeded: usize,
}

/// A `RemoteStore` kept entirely in memory for tests.
///
/// Listing honours `limit` and `cursor_after` and is additionally capped
/// by `max_page_size`, mimicking the backend's server-side page limit.
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    max_page_size: u32,
    ignore_deletes: bool,
    public_base: Url,
}

impl Default for InMemoryStore {
    fn default() -> Self { Self::new() }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            max_page_size: 25,
            ignore_deletes: false,
            public_base: Url::parse("https://store.test/v1/")
                .expect("static url"),
        }
    }

    pub fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size.max(1);
        self
    }

    /// Deletes report success but leave the entity in place.
    pub fn ignoring_deletes(mut self) -> Self {
        self.ignore_deletes = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store state poisoned")
    }

    /// Fail the `nth` (1-based) `op` issued against `target`.
    pub fn fail_nth(&self, op: StoreOp, target: &str, nth: usize) {
        self.state().fail_points.push(FailPoint {
            op,
            target: target.to_string(),
            nth,
            seen: 0,
        });
    }

    pub fn insert_documents(&self, collection: &str, count: usize) {
        let mut state = self.state();
        for _ in 0..count {
            state.seeded += 1;
            let doc = Document {
                id: format!("pre-{}", state.seeded),
                collection_id: collection.to_string(),
                created_at: Some(Utc::now()),
                fields: Map::new(),
            };
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(doc);
        }
    }

    pub fn insert_files(&self, bucket: &str, count: usize) {
        let mut state = self.state();
        for _ in 0..count {
            state.seeded += 1;
            let file = StoredFile {
                id: format!("pre-file-{}", state.seeded),
                bucket_id: bucket.to_string(),
                name: "old.jpg".to_string(),
                mime_type: "image/jpeg".to_string(),
                size: 1,
            };
            state.buckets.entry(bucket.to_string()).or_default().push(file);
        }
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.state()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.documents(collection).into_iter().find(|d| d.id == id)
    }

    pub fn files(&self, bucket: &str) -> Vec<StoredFile> {
        self.state().buckets.get(bucket).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<StoreCall> { self.state().calls.clone() }

    pub fn count_calls(
        &self, predicate: impl Fn(&StoreCall) -> bool,
    ) -> usize {
        self.state().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Position of the first call matching `predicate` in the call log.
    pub fn position(
        &self, predicate: impl Fn(&StoreCall) -> bool,
    ) -> Option<usize> {
        self.state().calls.iter().position(|c| predicate(c))
    }

    fn check(
        state: &mut StoreState, op: StoreOp, target: &str,
    ) -> SeedResult<()> {
        for point in state
            .fail_points
            .iter_mut()
            .filter(|p| p.op == op && p.target == target)
        {
            point.seen += 1;
            if point.seen == point.nth {
                return Err(SeedError::api(
                    503,
                    format!("injected {op:?} failure on {target}"),
                ));
            }
        }
        Ok(())
    }

    fn window<T: Clone>(
        items: &[T], id: impl Fn(&T) -> &str, page: &PageRequest,
        cap: u32,
    ) -> Vec<T> {
        let start = match &page.cursor_after {
            Some(cursor) => items
                .iter()
                .position(|item| id(item) == cursor)
                .map_or(items.len(), |pos| pos + 1),
            None => 0,
        };
        let limit = page.limit.min(cap) as usize;
        items.iter().skip(start).take(limit).cloned().collect()
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn list_documents(
        &self, collection_id: &str, page: PageRequest,
    ) -> SeedResult<DocumentPage> {
        let mut state = self.state();
        state.calls.push(StoreCall::ListDocuments {
            collection: collection_id.to_string(),
        });
        Self::check(&mut state, StoreOp::ListDocuments, collection_id)?;

        let docs = state
            .collections
            .get(collection_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(DocumentPage {
            total: docs.len() as u64,
            documents: Self::window(
                docs,
                |d| d.id.as_str(),
                &page,
                self.max_page_size,
            ),
        })
    }

    async fn create_document(
        &self, collection_id: &str, document_id: &str,
        fields: Map<String, Value>,
    ) -> SeedResult<Document> {
        let mut state = self.state();
        state.calls.push(StoreCall::CreateDocument {
            collection: collection_id.to_string(),
            id: document_id.to_string(),
        });
        Self::check(&mut state, StoreOp::CreateDocument, collection_id)?;

        let docs = state
            .collections
            .entry(collection_id.to_string())
            .or_default();
        if docs.iter().any(|d| d.id == document_id) {
            return Err(SeedError::api(
                409,
                format!("document {document_id} already exists"),
            ));
        }

        let doc = Document {
            id: document_id.to_string(),
            collection_id: collection_id.to_string(),
            created_at: Some(Utc::now()),
            fields,
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn delete_document(
        &self, collection_id: &str, document_id: &str,
    ) -> SeedResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::DeleteDocument {
            collection: collection_id.to_string(),
            id: document_id.to_string(),
        });
        Self::check(&mut state, StoreOp::DeleteDocument, collection_id)?;

        let docs = state
            .collections
            .entry(collection_id.to_string())
            .or_default();
        let before = docs.len();
        if !self.ignore_deletes {
            docs.retain(|d| d.id != document_id);
        }
        if self.ignore_deletes || docs.len() < before {
            Ok(())
        } else {
            Err(SeedError::api(
                404,
                format!("document {document_id} not found"),
            ))
        }
    }

    async fn list_files(
        &self, bucket_id: &str, page: PageRequest,
    ) -> SeedResult<FilePage> {
        let mut state = self.state();
        state.calls.push(StoreCall::ListFiles {
            bucket: bucket_id.to_string(),
        });
        Self::check(&mut state, StoreOp::ListFiles, bucket_id)?;

        let files = state
            .buckets
            .get(bucket_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(FilePage {
            total: files.len() as u64,
            files: Self::window(
                files,
                |f| f.id.as_str(),
                &page,
                self.max_page_size,
            ),
        })
    }

    async fn create_file(
        &self, bucket_id: &str, file_id: &str, upload: FileUpload,
    ) -> SeedResult<StoredFile> {
        let mut state = self.state();
        state.calls.push(StoreCall::CreateFile {
            bucket: bucket_id.to_string(),
            id: file_id.to_string(),
            name: upload.name.clone(),
        });
        Self::check(&mut state, StoreOp::CreateFile, bucket_id)?;

        // The upload must read from a staged file that still exists.
        let size = std::fs::metadata(&upload.local_path)?.len();
        let file = StoredFile {
            id: file_id.to_string(),
            bucket_id: bucket_id.to_string(),
            name: upload.name,
            mime_type: upload.mime_type,
            size,
        };
        state
            .buckets
            .entry(bucket_id.to_string())
            .or_default()
            .push(file.clone());
        Ok(file)
    }

    async fn delete_file(
        &self, bucket_id: &str, file_id: &str,
    ) -> SeedResult<()> {
        let mut state = self.state();
        state.calls.push(StoreCall::DeleteFile {
            bucket: bucket_id.to_string(),
            id: file_id.to_string(),
        });
        Self::check(&mut state, StoreOp::DeleteFile, bucket_id)?;

        if !self.ignore_deletes {
            if let Some(files) = state.buckets.get_mut(bucket_id) {
                files.retain(|f| f.id != file_id);
            }
        }
        Ok(())
    }

    fn file_public_url(
        &self, bucket_id: &str, file_id: &str,
    ) -> SeedResult<Url> {
        Ok(self
            .public_base
            .join(&format!("buckets/{bucket_id}/files/{file_id}/view"))?)
    }
}

/// Ids of every document in `calls` created in `collection`, in order.
pub fn created_ids(calls: &[StoreCall], collection: &str) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            StoreCall::CreateDocument { collection: c, id }
                if c == collection =>
            {
                Some(id.clone())
            }
            _ => None,
        })
        .collect()
}

/// Distinct targets listed or deleted, in first-touched order.
pub fn erase_order(calls: &[StoreCall]) -> Vec<String> {
    let mut seen = HashSet::new();
    calls
        .iter()
        .filter_map(|call| match call {
            StoreCall::ListDocuments { collection } => Some(collection.clone()),
            StoreCall::ListFiles { bucket } => Some(bucket.clone()),
            _ => None,
        })
        .filter(|target| seen.insert(target.clone()))
        .collect()
}
