use menu_models::{Document, DocumentFields, SeedDataset};
use seed_errors::SeedResult;
use store_traits::{AssetSource, IdGenerator, RemoteStore};

use crate::{
    config::SeedConfig,
    name_index::{Categories, Customizations, MenuItems, NameIndex},
    progress::ProgressTracker,
    report::{RunReport, Stage},
    throttle::{Pace, Throttle},
};

/// Collaborators and per-run state lent to one stage at a time.
pub struct RunContext<'a> {
    pub store: &'a dyn RemoteStore,
    pub assets: &'a dyn AssetSource,
    pub ids: &'a dyn IdGenerator,
    pub config: &'a SeedConfig,
    pub throttle: &'a Throttle,
    pub progress: Option<&'a ProgressTracker>,
    pub dataset: &'a SeedDataset,
    pub categories: NameIndex<Categories>,
    pub customizations: NameIndex<Customizations>,
    /// Created menu item ids. Not consulted by later stages; recording
    /// still logs duplicate item names.
    pub menu_items: NameIndex<MenuItems>,
    pub report: RunReport,
    /// Source name of the entity being worked on, for failure reports.
    pub current: Option<String>,
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(
        store: &'a dyn RemoteStore, assets: &'a dyn AssetSource,
        ids: &'a dyn IdGenerator, config: &'a SeedConfig,
        throttle: &'a Throttle, progress: Option<&'a ProgressTracker>,
        dataset: &'a SeedDataset,
    ) -> Self {
        Self {
            store,
            assets,
            ids,
            config,
            throttle,
            progress,
            dataset,
            categories: NameIndex::new(),
            customizations: NameIndex::new(),
            menu_items: NameIndex::new(),
            report: RunReport::start(),
            current: None,
        }
    }

    /// Waits on the throttle, then creates one document under a fresh id.
    pub async fn create_document<F>(
        &self, collection_id: &str, pace: Pace, record: &F,
    ) -> SeedResult<Document>
    where
        F: DocumentFields + Sync,
    {
        let fields = record.to_fields()?;
        self.throttle.before(pace).await;
        self.store
            .create_document(collection_id, &self.ids.unique(), fields)
            .await
    }

    pub fn update_progress(
        &self, stage: Stage, current: usize, total: usize, message: String,
    ) {
        if let Some(tracker) = self.progress {
            tracker.update(stage, current, total, message);
        }
    }
}
