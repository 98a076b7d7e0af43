pub mod asset_fetcher;
pub mod category_stage;
pub mod cli;
pub mod cli_progress;
pub mod config;
pub mod context;
pub mod customization_stage;
pub mod erase_stage;
pub mod eraser;
pub mod menu_item_stage;
pub mod name_index;
pub mod progress;
pub mod report;
pub mod seed_runner;
pub mod throttle;

use async_trait::async_trait;
use seed_errors::SeedResult;

/// One step of the pipeline. Stages run strictly in sequence and share
/// state only through the `RunContext` they are lent.
#[async_trait]
pub trait SeedStage: Send + Sync {
    async fn run(&self, ctx: &mut RunContext<'_>) -> SeedResult<()>;
    fn stage(&self) -> Stage;
}

pub use asset_fetcher::HttpAssetFetcher;
pub use category_stage::CategoryStage;
pub use config::{
    CollectionIds, SeedConfig, ThrottleConfig, UnresolvedReferencePolicy,
};
pub use context::RunContext;
pub use customization_stage::CustomizationStage;
pub use erase_stage::EraseStage;
pub use eraser::Eraser;
pub use menu_item_stage::MenuItemStage;
pub use name_index::NameIndex;
pub use progress::{ProgressEvent, ProgressTracker, ProgressUpdate};
pub use report::{Counts, Outcome, RunReport, Stage};
pub use seed_runner::SeedRunner;
pub use throttle::{IntervalGate, Pace, Throttle};
