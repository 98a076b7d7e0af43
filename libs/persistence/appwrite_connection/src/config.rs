use std::{str::FromStr, time::Duration};

use seed_errors::ConfigError;
use url::Url;

pub const ENDPOINT_VAR: &str = "APPWRITE_ENDPOINT";
pub const PROJECT_VAR: &str = "APPWRITE_PROJECT_ID";
pub const API_KEY_VAR: &str = "APPWRITE_API_KEY";
pub const DATABASE_VAR: &str = "APPWRITE_DATABASE_ID";
pub const TIMEOUT_VAR: &str = "APPWRITE_TIMEOUT_SECS";

/// Connection settings for the backend's REST API.
#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    /// API root including the version segment, e.g.
    /// `https://cloud.appwrite.io/v1`.
    pub endpoint: Url,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub request_timeout_secs: u64,
}

impl AppwriteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = env_required(&lookup, ENDPOINT_VAR)?;
        let endpoint =
            Url::parse(&endpoint).map_err(|_| ConfigError::Invalid {
                name: ENDPOINT_VAR,
                value: endpoint.clone(),
            })?;

        Ok(Self {
            endpoint,
            project_id: env_required(&lookup, PROJECT_VAR)?,
            api_key: env_required(&lookup, API_KEY_VAR)?,
            database_id: env_required(&lookup, DATABASE_VAR)?,
            request_timeout_secs: env_parsed(
                &lookup,
                TIMEOUT_VAR,
                request_timeout_default(),
            )?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn request_timeout_default() -> u64 { 30 }

pub fn env_required<F>(
    lookup: &F, name: &'static str,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

pub fn env_parsed<F, T>(
    lookup: &F, name: &'static str, default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
