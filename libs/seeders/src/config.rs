use std::{path::PathBuf, str::FromStr, time::Duration};

use appwrite_connection::{env_parsed, env_required};
use clap::ValueEnum;
use seed_errors::ConfigError;
use store_traits::page::DEFAULT_PAGE_SIZE;

/// What to do with a menu item whose category or customization name has
/// no created counterpart in this run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UnresolvedReferencePolicy {
    /// Fail the run before touching the store for that item.
    #[default]
    Abort,
    /// Leave the item out and keep going.
    Skip,
    /// Create the item with a null category and without the missing links.
    Dangling,
}

impl FromStr for UnresolvedReferencePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(value, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionIds {
    pub categories: String,
    pub customizations: String,
    pub menu: String,
    pub menu_customizations: String,
}

impl CollectionIds {
    /// Erase order: referenced collections first, links last.
    pub fn erase_order(&self) -> [&str; 4] {
        [
            &self.categories,
            &self.customizations,
            &self.menu,
            &self.menu_customizations,
        ]
    }
}

/// Minimum spacing after each kind of remote mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub document_interval_ms: u64,
    pub media_interval_ms: u64,
}

impl ThrottleConfig {
    pub fn none() -> Self {
        Self {
            document_interval_ms: 0,
            media_interval_ms: 0,
        }
    }

    pub fn document_interval(&self) -> Duration {
        Duration::from_millis(self.document_interval_ms)
    }

    pub fn media_interval(&self) -> Duration {
        Duration::from_millis(self.media_interval_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            document_interval_ms: document_interval_default(),
            media_interval_ms: media_interval_default(),
        }
    }
}

fn document_interval_default() -> u64 { 100 }

fn media_interval_default() -> u64 { 200 }

/// Settings for one seeding run. Built once and handed to the runner.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub collections: CollectionIds,
    pub bucket_id: String,
    pub scratch_dir: PathBuf,
    pub page_size: u32,
    pub throttle: ThrottleConfig,
    pub unresolved_references: UnresolvedReferencePolicy,
}

fn scratch_dir_default() -> PathBuf { std::env::temp_dir().join("menu-seed") }

fn page_size_default() -> u32 { DEFAULT_PAGE_SIZE }

impl SeedConfig {
    pub fn new(
        collections: CollectionIds, bucket_id: impl Into<String>,
    ) -> Self {
        Self {
            collections,
            bucket_id: bucket_id.into(),
            scratch_dir: scratch_dir_default(),
            page_size: page_size_default(),
            throttle: ThrottleConfig::default(),
            unresolved_references: UnresolvedReferencePolicy::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let collections = CollectionIds {
            categories: env_required(
                &lookup,
                "APPWRITE_CATEGORIES_COLLECTION_ID",
            )?,
            customizations: env_required(
                &lookup,
                "APPWRITE_CUSTOMIZATIONS_COLLECTION_ID",
            )?,
            menu: env_required(&lookup, "APPWRITE_MENU_COLLECTION_ID")?,
            menu_customizations: env_required(
                &lookup,
                "APPWRITE_MENU_CUSTOMIZATIONS_COLLECTION_ID",
            )?,
        };

        Ok(Self {
            collections,
            bucket_id: env_required(&lookup, "APPWRITE_BUCKET_ID")?,
            scratch_dir: env_parsed(
                &lookup,
                "SEED_SCRATCH_DIR",
                scratch_dir_default(),
            )?,
            page_size: env_parsed(
                &lookup,
                "SEED_PAGE_SIZE",
                page_size_default(),
            )?,
            throttle: ThrottleConfig {
                document_interval_ms: env_parsed(
                    &lookup,
                    "SEED_DOCUMENT_INTERVAL_MS",
                    document_interval_default(),
                )?,
                media_interval_ms: env_parsed(
                    &lookup,
                    "SEED_MEDIA_INTERVAL_MS",
                    media_interval_default(),
                )?,
            },
            unresolved_references: env_parsed(
                &lookup,
                "SEED_ON_UNRESOLVED",
                UnresolvedReferencePolicy::default(),
            )?,
        })
    }
}
