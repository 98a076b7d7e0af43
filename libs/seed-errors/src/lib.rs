use std::{fmt, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Entity kinds that can be the target of a name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Customization,
    MenuItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Customization => write!(f, "customization"),
            Self::MenuItem => write!(f, "menu item"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Store rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Staged asset not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Unresolved {kind} reference '{name}' on '{referenced_by}'")]
    UnresolvedReference {
        kind: EntityKind,
        name: String,
        referenced_by: String,
    },
    #[error("Store listed '{id}' in {target} again after deleting it")]
    StoreInconsistent { target: String, id: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Coarse classification used in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TransientNetworkFailure,
    Api,
    NotFound,
    ReferenceResolutionGap,
    StoreInconsistent,
    Local,
}

impl SeedError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn unresolved(
        kind: EntityKind, name: &str, referenced_by: &str,
    ) -> Self {
        Self::UnresolvedReference {
            kind,
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::TransientNetworkFailure,
            Self::Api { .. } => ErrorKind::Api,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnresolvedReference { .. } => {
                ErrorKind::ReferenceResolutionGap
            }
            Self::StoreInconsistent { .. } => ErrorKind::StoreInconsistent,
            Self::Io(_) | Self::Serialization(_) | Self::InvalidUrl(_) => {
                ErrorKind::Local
            }
        }
    }
}

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid price {price} on {kind} '{name}'")]
    InvalidPrice {
        kind: EntityKind,
        name: String,
        price: f64,
    },
}
