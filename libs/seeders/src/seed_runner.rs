use std::{sync::Arc, time::Instant};

use menu_models::SeedDataset;
use store_traits::{AssetSource, IdGenerator, RemoteStore, UniqueIdGenerator};
use tracing::{error, info, instrument};

use crate::{
    CategoryStage, CustomizationStage, EraseStage, MenuItemStage, SeedStage,
    config::SeedConfig, context::RunContext, progress::ProgressTracker,
    report::RunReport, throttle::Throttle,
};

/// Sequences the stages of a run and turns the first failure into the
/// run's outcome. Nothing is retried or rolled back.
pub struct SeedRunner {
    config: SeedConfig,
    store: Arc<dyn RemoteStore>,
    assets: Arc<dyn AssetSource>,
    ids: Arc<dyn IdGenerator>,
    throttle: Throttle,
    progress_tracker: Option<ProgressTracker>,
}

impl SeedRunner {
    pub fn new(
        config: SeedConfig, store: Arc<dyn RemoteStore>,
        assets: Arc<dyn AssetSource>,
    ) -> Self {
        Self {
            throttle: Throttle::new(config.throttle),
            config,
            store,
            assets,
            ids: Arc::new(UniqueIdGenerator),
            progress_tracker: None,
        }
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_progress(mut self, progress_tracker: ProgressTracker) -> Self {
        self.progress_tracker = Some(progress_tracker);
        self
    }

    pub fn config(&self) -> &SeedConfig { &self.config }

    /// Erase, then categories, customizations and menu items.
    #[instrument(skip_all)]
    pub async fn run(&self, dataset: &SeedDataset) -> RunReport {
        info!(
            "Starting seeding process: {} categories, {} customizations, {} \
             menu items",
            dataset.categories.len(),
            dataset.customizations.len(),
            dataset.menu.len()
        );
        self.execute(dataset, &[
            &EraseStage,
            &CategoryStage,
            &CustomizationStage,
            &MenuItemStage,
        ])
        .await
    }

    /// Teardown only.
    #[instrument(skip_all)]
    pub async fn erase_only(&self) -> RunReport {
        self.execute(&SeedDataset::default(), &[&EraseStage]).await
    }

    async fn execute(
        &self, dataset: &SeedDataset, stages: &[&dyn SeedStage],
    ) -> RunReport {
        let mut ctx = RunContext::new(
            self.store.as_ref(),
            self.assets.as_ref(),
            self.ids.as_ref(),
            &self.config,
            &self.throttle,
            self.progress_tracker.as_ref(),
            dataset,
        );

        for stage in stages {
            let stage_start = Instant::now();
            info!("Running stage: {}", stage.stage());

            match stage.run(&mut ctx).await {
                Ok(()) => {
                    info!(
                        "Stage '{}' completed successfully in {:.2}s",
                        stage.stage(),
                        stage_start.elapsed().as_secs_f64()
                    );

                    if let Some(tracker) = &self.progress_tracker {
                        tracker.complete(stage.stage());
                    }
                }
                Err(e) => {
                    let entity = ctx.current.take();
                    error!(
                        "Stage '{}' failed after {:.2}s{}: {}",
                        stage.stage(),
                        stage_start.elapsed().as_secs_f64(),
                        entity
                            .as_deref()
                            .map(|name| format!(" on '{name}'"))
                            .unwrap_or_default(),
                        e
                    );

                    if let Some(tracker) = &self.progress_tracker {
                        tracker.error(stage.stage(), e.to_string());
                    }

                    ctx.report.fail(stage.stage(), entity, &e);
                    return ctx.report.finish();
                }
            }
        }

        info!("Seeding complete");
        ctx.report.finish()
    }
}
