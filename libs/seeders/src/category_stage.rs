use async_trait::async_trait;
use menu_models::CategoryRecord;
use seed_errors::SeedResult;
use tracing::{info, instrument};

use crate::{
    SeedStage, context::RunContext, report::Stage, throttle::Pace,
};

pub struct CategoryStage;

#[async_trait]
impl SeedStage for CategoryStage {
    #[instrument(skip_all)]
    async fn run(&self, ctx: &mut RunContext<'_>) -> SeedResult<()> {
        let categories = &ctx.dataset.categories;
        let collection = &ctx.config.collections.categories;
        info!("Creating {} categories...", categories.len());

        for (i, category) in categories.iter().enumerate() {
            ctx.current = Some(category.name.clone());
            let doc = ctx
                .create_document(
                    collection,
                    Pace::Document,
                    &CategoryRecord::from(category),
                )
                .await?;

            ctx.categories.record(&category.name, doc.id);
            ctx.report.created.categories += 1;
            info!("Category created: {}", category.name);
            ctx.update_progress(
                Stage::CreateCategories,
                i + 1,
                categories.len(),
                category.name.clone(),
            );
        }

        ctx.current = None;
        Ok(())
    }

    fn stage(&self) -> Stage { Stage::CreateCategories }
}
