pub use client::AppwriteClient;
pub use config::{AppwriteConfig, env_parsed, env_required};
pub use store_traits;

mod client;
pub mod config;
