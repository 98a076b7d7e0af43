use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::source::{SourceCategory, SourceCustomization, SourceMenuItem};

/// A document as returned by the store after creation or listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$collectionId", default)]
    pub collection_id: String,
    #[serde(
        rename = "$createdAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId", default)]
    pub bucket_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal", default)]
    pub size: u64,
}

/// Serializable payloads written as document fields.
pub trait DocumentFields: Serialize {
    fn to_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "document fields must be an object, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryRecord {
    pub name: String,
    pub description: String,
}

impl From<&SourceCategory> for CategoryRecord {
    fn from(source: &SourceCategory) -> Self {
        Self {
            name: source.name.clone(),
            description: source.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomizationRecord {
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&SourceCustomization> for CustomizationRecord {
    fn from(source: &SourceCustomization) -> Self {
        Self {
            name: source.name.clone(),
            price: source.price,
            kind: source.kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuItemRecord {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub rating: f64,
    pub calories: u32,
    pub protein: u32,
    /// Created category id; `None` is written as a null reference.
    pub categories: Option<String>,
}

impl MenuItemRecord {
    pub fn new(
        source: &SourceMenuItem, image_url: String, category_id: Option<String>,
    ) -> Self {
        Self {
            name: source.name.clone(),
            description: source.description.clone(),
            image_url,
            price: source.price,
            rating: source.rating,
            calories: source.calories,
            protein: source.protein,
            categories: category_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MenuCustomizationLink {
    pub menu: String,
    pub customizations: String,
}

impl DocumentFields for CategoryRecord {}
impl DocumentFields for CustomizationRecord {}
impl DocumentFields for MenuItemRecord {}
impl DocumentFields for MenuCustomizationLink {}
