use async_trait::async_trait;
use seed_errors::SeedResult;
use tracing::{info, instrument};

use crate::{SeedStage, context::RunContext, eraser::Eraser, report::Stage};

/// Clears every seeded collection, links last, then the asset bucket.
pub struct EraseStage;

#[async_trait]
impl SeedStage for EraseStage {
    #[instrument(skip_all)]
    async fn run(&self, ctx: &mut RunContext<'_>) -> SeedResult<()> {
        let config = ctx.config;
        let eraser = Eraser::new(ctx.store, ctx.throttle, config.page_size)
            .with_progress(ctx.progress);

        info!("Clearing collections...");
        let deleted = &mut ctx.report.deleted;
        let counters = [
            &mut deleted.categories,
            &mut deleted.customizations,
            &mut deleted.menu_items,
            &mut deleted.links,
        ];
        for (collection_id, counter) in
            config.collections.erase_order().into_iter().zip(counters)
        {
            *counter = eraser.erase_collection(collection_id).await?;
        }
        ctx.report.deleted.files =
            eraser.erase_bucket(&config.bucket_id).await?;

        info!("Collections cleared: {} entities", ctx.report.deleted.total());
        Ok(())
    }

    fn stage(&self) -> Stage { Stage::Erase }
}
