use menu_models::{Document, StoredFile};
use serde::Deserialize;

pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor_after: Option<String>,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            cursor_after: None,
        }
    }

    pub fn after(limit: u32, cursor: impl Into<String>) -> Self {
        Self {
            limit: limit.max(1),
            cursor_after: Some(cursor.into()),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self::first(DEFAULT_PAGE_SIZE) }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilePage {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub files: Vec<StoredFile>,
}
