use async_trait::async_trait;
use menu_models::{MenuCustomizationLink, MenuItemRecord, SourceMenuItem};
use seed_errors::{SeedError, SeedResult};
use tracing::{info, instrument, warn};

use crate::{
    SeedStage,
    config::UnresolvedReferencePolicy,
    context::RunContext,
    report::{Stage, UnresolvedEntry},
    throttle::Pace,
};

/// Creates menu items with their uploaded images and customization links.
pub struct MenuItemStage;

/// References of one menu item, looked up before any remote call.
#[derive(Debug, Default)]
struct ResolvedRefs {
    category_id: Option<String>,
    /// (customization name, created customization id), in source order.
    links: Vec<(String, String)>,
    gaps: Vec<SeedError>,
}

fn resolve_refs(
    ctx: &RunContext<'_>, item: &SourceMenuItem,
) -> ResolvedRefs {
    let mut refs = ResolvedRefs::default();

    match ctx.categories.require(&item.category_name, &item.name) {
        Ok(id) => refs.category_id = Some(id.to_string()),
        Err(e) => refs.gaps.push(e),
    }

    for name in &item.customizations {
        match ctx.customizations.require(name, &item.name) {
            Ok(id) => refs.links.push((name.clone(), id.to_string())),
            Err(e) => refs.gaps.push(e),
        }
    }

    refs
}

impl MenuItemStage {
    /// Upload, document, links: the nested per-item sub-stage.
    async fn create_item(
        ctx: &mut RunContext<'_>, item: &SourceMenuItem, refs: ResolvedRefs,
    ) -> SeedResult<()> {
        let bucket = &ctx.config.bucket_id;
        let collections = &ctx.config.collections;

        let staged = ctx.assets.fetch_and_stage(&item.image_url).await?;
        ctx.throttle.before(Pace::Media).await;
        let file = ctx
            .store
            .create_file(bucket, &ctx.ids.unique(), staged.upload())
            .await?;
        drop(staged);
        ctx.report.created.files += 1;

        let image_url = ctx.store.file_public_url(bucket, &file.id)?;
        info!("Uploaded: {}", image_url);

        let record = MenuItemRecord::new(
            item,
            image_url.to_string(),
            refs.category_id,
        );
        let doc = ctx
            .create_document(&collections.menu, Pace::Media, &record)
            .await?;
        ctx.menu_items.record(&item.name, doc.id.clone());
        ctx.report.created.menu_items += 1;
        info!("Menu item created: {}", item.name);

        info!("Creating menu_customizations for: {}", item.name);
        for (name, customization_id) in refs.links {
            let link = MenuCustomizationLink {
                menu: doc.id.clone(),
                customizations: customization_id,
            };
            ctx.create_document(
                &collections.menu_customizations,
                Pace::Document,
                &link,
            )
            .await?;
            ctx.report.created.links += 1;
            info!("Linked customization: {}", name);
        }

        Ok(())
    }
}

#[async_trait]
impl SeedStage for MenuItemStage {
    #[instrument(skip_all)]
    async fn run(&self, ctx: &mut RunContext<'_>) -> SeedResult<()> {
        let menu = &ctx.dataset.menu;
        let policy = ctx.config.unresolved_references;
        info!("Creating {} menu items...", menu.len());

        for (i, item) in menu.iter().enumerate() {
            ctx.current = Some(item.name.clone());
            info!("Processing menu item: {}", item.name);

            let mut refs = resolve_refs(ctx, item);
            if !refs.gaps.is_empty() {
                let entries =
                    refs.gaps.iter().filter_map(UnresolvedEntry::from_error);
                ctx.report.unresolved.extend(entries);
                let error = refs.gaps.swap_remove(0);

                match policy {
                    UnresolvedReferencePolicy::Abort => return Err(error),
                    UnresolvedReferencePolicy::Skip => {
                        warn!("Skipping menu item: {}", error);
                        ctx.report.skipped_items.push(item.name.clone());
                        ctx.update_progress(
                            Stage::CreateMenuItems,
                            i + 1,
                            menu.len(),
                            format!("skipped {}", item.name),
                        );
                        continue;
                    }
                    UnresolvedReferencePolicy::Dangling => {
                        warn!("Creating with dangling reference: {}", error);
                    }
                }
            }

            Self::create_item(ctx, item, refs).await?;
            ctx.update_progress(
                Stage::CreateMenuItems,
                i + 1,
                menu.len(),
                item.name.clone(),
            );
        }

        ctx.current = None;
        Ok(())
    }

    fn stage(&self) -> Stage { Stage::CreateMenuItems }
}
