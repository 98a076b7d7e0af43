use async_trait::async_trait;
use menu_models::CustomizationRecord;
use seed_errors::SeedResult;
use tracing::{info, instrument};

use crate::{
    SeedStage, context::RunContext, report::Stage, throttle::Pace,
};

pub struct CustomizationStage;

#[async_trait]
impl SeedStage for CustomizationStage {
    #[instrument(skip_all)]
    async fn run(&self, ctx: &mut RunContext<'_>) -> SeedResult<()> {
        let customizations = &ctx.dataset.customizations;
        let collection = &ctx.config.collections.customizations;
        info!("Creating {} customizations...", customizations.len());

        for (i, customization) in customizations.iter().enumerate() {
            ctx.current = Some(customization.name.clone());
            let doc = ctx
                .create_document(
                    collection,
                    Pace::Document,
                    &CustomizationRecord::from(customization),
                )
                .await?;

            ctx.customizations.record(&customization.name, doc.id);
            ctx.report.created.customizations += 1;
            info!(
                "Customization created: {} ({})",
                customization.name, customization.kind
            );
            ctx.update_progress(
                Stage::CreateCustomizations,
                i + 1,
                customizations.len(),
                customization.name.clone(),
            );
        }

        ctx.current = None;
        Ok(())
    }

    fn stage(&self) -> Stage { Stage::CreateCustomizations }
}
