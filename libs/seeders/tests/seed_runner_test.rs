use std::{collections::BTreeSet, sync::Arc, time::Duration};

use menu_models::{CustomizationKind, Document, SeedDataset};
use seed_errors::{EntityKind, ErrorKind};
use seeders::{
    CollectionIds, Outcome, ProgressEvent, ProgressTracker, SeedConfig,
    SeedRunner, Stage, ThrottleConfig, UnresolvedReferencePolicy,
};
use serde_json::Value;
use tokio::time::Instant;
use test_utils::{
    FakeAssetSource, InMemoryStore, SequentialIds, StoreCall, StoreOp,
    category, created_ids, customization, diner_dataset, erase_order,
    menu_item, pizza_dataset,
};

const CATEGORIES: &str = "categories";
const CUSTOMIZATIONS: &str = "customizations";
const MENU: &str = "menu";
const LINKS: &str = "menu_customizations";
const BUCKET: &str = "assets";

fn config() -> SeedConfig {
    let mut config = SeedConfig::new(
        CollectionIds {
            categories: CATEGORIES.to_string(),
            customizations: CUSTOMIZATIONS.to_string(),
            menu: MENU.to_string(),
            menu_customizations: LINKS.to_string(),
        },
        BUCKET,
    );
    config.throttle = ThrottleConfig::none();
    config
}

fn runner(
    store: &Arc<InMemoryStore>, assets: &Arc<FakeAssetSource>,
    config: SeedConfig,
) -> SeedRunner {
    SeedRunner::new(config, store.clone(), assets.clone())
        .with_ids(Arc::new(SequentialIds::default()))
}

fn by_name(docs: &[Document], name: &str) -> Document {
    docs.iter()
        .find(|d| d.str_field("name") == Some(name))
        .cloned()
        .unwrap_or_else(|| panic!("no document named {name}"))
}

/// (menu item name, customization name) for every link in the store.
fn link_names(store: &InMemoryStore) -> BTreeSet<(String, String)> {
    let menu = store.documents(MENU);
    let customizations = store.documents(CUSTOMIZATIONS);
    let name_of = |docs: &[Document], id: &str| {
        docs.iter()
            .find(|d| d.id == id)
            .and_then(|d| d.str_field("name"))
            .unwrap()
            .to_string()
    };

    store
        .documents(LINKS)
        .iter()
        .map(|link| {
            (
                name_of(&menu, link.str_field("menu").unwrap()),
                name_of(
                    &customizations,
                    link.str_field("customizations").unwrap(),
                ),
            )
        })
        .collect()
}

fn dataset_link_names(dataset: &SeedDataset) -> BTreeSet<(String, String)> {
    dataset
        .menu
        .iter()
        .flat_map(|item| {
            item.customizations
                .iter()
                .map(|c| (item.name.clone(), c.clone()))
        })
        .collect()
}

fn create_positions(calls: &[StoreCall], collection: &str) -> Vec<usize> {
    calls
        .iter()
        .enumerate()
        .filter_map(|(i, call)| match call {
            StoreCall::CreateDocument { collection: c, .. }
                if c == collection =>
            {
                Some(i)
            }
            _ => None,
        })
        .collect()
}

fn create_position(store: &InMemoryStore, document_id: &str) -> usize {
    store
        .position(|call| {
            matches!(
                call,
                StoreCall::CreateDocument { id, .. } if id == document_id
            )
        })
        .unwrap()
}

fn is_create(call: &StoreCall) -> bool {
    matches!(
        call,
        StoreCall::CreateDocument { .. } | StoreCall::CreateFile { .. }
    )
}

/// Dataset whose dessert item references a category nobody declared.
fn dessert_dataset() -> SeedDataset {
    let mut dataset = pizza_dataset();
    dataset.menu.push(menu_item("Tiramisu", "Desserts", &["Extra Cheese"]));
    dataset.menu.push(menu_item("Lemonade", "Drinks", &["Ice"]));
    dataset
}

#[tokio::test]
async fn test_pizza_scenario() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&pizza_dataset()).await;

    assert!(report.is_success(), "{:?}", report.failure);
    assert_eq!(report.created.categories, 2);
    assert_eq!(report.created.customizations, 1);
    assert_eq!(report.created.menu_items, 1);
    assert_eq!(report.created.links, 1);
    assert_eq!(report.created.files, 1);
    assert!(report.finished_at.is_some());

    let pizza = by_name(&store.documents(CATEGORIES), "Pizza");
    let cheese = by_name(&store.documents(CUSTOMIZATIONS), "Extra Cheese");
    assert_eq!(cheese.str_field("type"), Some("topping"));

    let margherita = by_name(&store.documents(MENU), "Margherita");
    assert_eq!(margherita.str_field("categories"), Some(pizza.id.as_str()));

    let files = store.files(BUCKET);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "margherita.jpg");
    assert_eq!(files[0].size, assets.byte_len());
    let image_url = margherita.str_field("image_url").unwrap();
    assert!(image_url.contains(&format!("/files/{}/view", files[0].id)));

    let links = store.documents(LINKS);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].str_field("menu"), Some(margherita.id.as_str()));
    assert_eq!(
        links[0].str_field("customizations"),
        Some(cheese.id.as_str())
    );
}

#[tokio::test]
async fn test_creation_order_respects_references() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&diner_dataset()).await;
    assert!(report.is_success());

    let calls = store.calls();
    let categories = create_positions(&calls, CATEGORIES);
    let customizations = create_positions(&calls, CUSTOMIZATIONS);
    let menu = create_positions(&calls, MENU);

    assert!(categories.iter().max() < customizations.iter().min());
    assert!(customizations.iter().max() < menu.iter().min());

    // Every link is created after the menu document it points at.
    let menu_ids = created_ids(&calls, MENU);
    for link in store.documents(LINKS) {
        let menu_id = link.str_field("menu").unwrap();
        assert!(menu_ids.iter().any(|id| id == menu_id));
        assert!(
            create_position(&store, menu_id)
                < create_position(&store, &link.id)
        );
    }

    // Each upload precedes the menu document that embeds its URL.
    let first_upload = store
        .position(|c| matches!(c, StoreCall::CreateFile { .. }))
        .unwrap();
    assert!(first_upload < menu[0]);
}

#[tokio::test]
async fn test_erase_runs_first_in_fixed_order() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_documents(MENU, 3);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&pizza_dataset()).await;
    assert!(report.is_success());

    let calls = store.calls();
    assert_eq!(erase_order(&calls), vec![
        CATEGORIES,
        CUSTOMIZATIONS,
        MENU,
        LINKS,
        BUCKET
    ]);

    let last_erase_call = calls
        .iter()
        .rposition(|c| {
            matches!(
                c,
                StoreCall::ListDocuments { .. }
                    | StoreCall::ListFiles { .. }
                    | StoreCall::DeleteDocument { .. }
                    | StoreCall::DeleteFile { .. }
            )
        })
        .unwrap();
    let first_create = calls.iter().position(is_create).unwrap();
    assert!(last_erase_call < first_create);
}

#[tokio::test]
async fn test_run_fully_replaces_previous_state() {
    let store = Arc::new(InMemoryStore::new().with_max_page_size(10));
    store.insert_documents(CATEGORIES, 12);
    store.insert_documents(CUSTOMIZATIONS, 4);
    store.insert_documents(MENU, 30);
    store.insert_documents(LINKS, 45);
    store.insert_files(BUCKET, 7);
    let assets = Arc::new(FakeAssetSource::new());
    let dataset = diner_dataset();

    let report = runner(&store, &assets, config()).run(&dataset).await;

    assert!(report.is_success());
    assert_eq!(report.deleted.categories, 12);
    assert_eq!(report.deleted.customizations, 4);
    assert_eq!(report.deleted.menu_items, 30);
    assert_eq!(report.deleted.links, 45);
    assert_eq!(report.deleted.files, 7);

    for target in [CATEGORIES, CUSTOMIZATIONS, MENU, LINKS] {
        assert!(
            store.documents(target).iter().all(|d| !d.id.starts_with("pre-")),
            "stale documents left in {target}"
        );
    }
    assert!(store.files(BUCKET).iter().all(|f| !f.id.starts_with("pre-")));

    assert_eq!(store.documents(CATEGORIES).len(), dataset.categories.len());
    assert_eq!(
        store.documents(CUSTOMIZATIONS).len(),
        dataset.customizations.len()
    );
    assert_eq!(store.documents(MENU).len(), dataset.menu.len());
    assert_eq!(store.files(BUCKET).len(), dataset.menu.len());
}

#[tokio::test]
async fn test_every_declared_link_is_created() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let dataset = diner_dataset();

    let report = runner(&store, &assets, config()).run(&dataset).await;

    assert!(report.is_success());
    assert_eq!(report.created.links, dataset.link_count());
    assert_eq!(store.documents(LINKS).len(), dataset.link_count());
    assert_eq!(link_names(&store), dataset_link_names(&dataset));
}

#[tokio::test]
async fn test_category_failure_aborts_remaining_stages() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_nth(StoreOp::CreateDocument, CATEGORIES, 2);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&diner_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed {
        stage: Stage::CreateCategories
    });
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::Api);
    assert_eq!(failure.entity.as_deref(), Some("Pizza"));
    assert!(report.finished_at.is_some());

    assert_eq!(report.created.categories, 1);
    assert_eq!(store.documents(CATEGORIES).len(), 1);
    let calls = store.calls();
    assert!(created_ids(&calls, CUSTOMIZATIONS).is_empty());
    assert!(created_ids(&calls, MENU).is_empty());
    assert!(assets.fetched().is_empty());
}

#[tokio::test]
async fn test_erase_failure_prevents_creation() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_documents(MENU, 2);
    store.fail_nth(StoreOp::ListDocuments, MENU, 1);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&pizza_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed { stage: Stage::Erase });
    assert_eq!(store.count_calls(is_create), 0);
    assert_eq!(store.documents(MENU).len(), 2);
}

#[tokio::test]
async fn test_missing_category_aborts_by_default() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());

    let report =
        runner(&store, &assets, config()).run(&dessert_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed {
        stage: Stage::CreateMenuItems
    });
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::ReferenceResolutionGap);
    assert_eq!(failure.entity.as_deref(), Some("Tiramisu"));
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].kind, EntityKind::Category);
    assert_eq!(report.unresolved[0].name, "Desserts");

    // Resolution happens before any remote work for the item.
    assert_eq!(assets.fetched().len(), 1);
    assert_eq!(store.documents(MENU).len(), 1);
    assert_eq!(store.files(BUCKET).len(), 1);
}

#[tokio::test]
async fn test_skip_policy_leaves_out_unresolved_items() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let mut config = config();
    config.unresolved_references = UnresolvedReferencePolicy::Skip;

    let report = runner(&store, &assets, config).run(&dessert_dataset()).await;

    assert!(report.is_success());
    assert_eq!(report.skipped_items, vec!["Tiramisu", "Lemonade"]);
    assert_eq!(report.unresolved.len(), 2);
    assert_eq!(report.unresolved[1].kind, EntityKind::Customization);
    assert_eq!(report.unresolved[1].name, "Ice");
    assert_eq!(report.unresolved[1].referenced_by, "Lemonade");

    let menu = store.documents(MENU);
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0].str_field("name"), Some("Margherita"));
    assert_eq!(assets.fetched().len(), 1);
}

#[tokio::test]
async fn test_dangling_policy_creates_partial_items() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let mut config = config();
    config.unresolved_references = UnresolvedReferencePolicy::Dangling;

    let report = runner(&store, &assets, config).run(&dessert_dataset()).await;

    assert!(report.is_success());
    assert!(report.skipped_items.is_empty());
    assert_eq!(report.unresolved.len(), 2);
    assert_eq!(report.created.menu_items, 3);

    let tiramisu = by_name(&store.documents(MENU), "Tiramisu");
    assert_eq!(tiramisu.field("categories"), Some(&Value::Null));

    let drinks = by_name(&store.documents(CATEGORIES), "Drinks");
    let lemonade = by_name(&store.documents(MENU), "Lemonade");
    assert_eq!(lemonade.str_field("categories"), Some(drinks.id.as_str()));

    // Lemonade's only customization is missing; Tiramisu keeps its link.
    let links = link_names(&store);
    assert!(links.contains(&("Tiramisu".into(), "Extra Cheese".into())));
    assert!(!links.iter().any(|(menu, _)| menu == "Lemonade"));
    assert_eq!(report.created.links, 2);
}

#[tokio::test]
async fn test_missing_image_aborts_run() {
    let store = Arc::new(InMemoryStore::new());
    let dataset = diner_dataset();
    let missing_url = dataset.menu[1].image_url.clone();
    let assets = Arc::new(FakeAssetSource::new().missing(&missing_url));

    let report = runner(&store, &assets, config()).run(&dataset).await;

    assert_eq!(report.outcome, Outcome::Failed {
        stage: Stage::CreateMenuItems
    });
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::NotFound);
    assert_eq!(failure.entity.as_deref(), Some("Pepperoni"));
    assert_eq!(store.documents(MENU).len(), 1);
    assert_eq!(store.files(BUCKET).len(), 1);
}

#[tokio::test]
async fn test_scratch_files_removed_after_success() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&diner_dataset()).await;

    assert!(report.is_success());
    assert_eq!(assets.fetched().len(), 4);
    assert!(assets.leftover_files().is_empty());
}

#[tokio::test]
async fn test_scratch_files_removed_after_failed_upload() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_nth(StoreOp::CreateFile, BUCKET, 2);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&diner_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed {
        stage: Stage::CreateMenuItems
    });
    assert_eq!(assets.fetched().len(), 2);
    assert!(assets.leftover_files().is_empty());
}

#[tokio::test]
async fn test_erase_only_clears_without_creating() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_documents(CATEGORIES, 2);
    store.insert_documents(LINKS, 3);
    store.insert_files(BUCKET, 2);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).erase_only().await;

    assert!(report.is_success());
    assert_eq!(report.deleted.total(), 7);
    assert_eq!(report.created.total(), 0);
    assert_eq!(store.count_calls(is_create), 0);
    for target in [CATEGORIES, CUSTOMIZATIONS, MENU, LINKS] {
        assert!(store.documents(target).is_empty());
    }
    assert!(store.files(BUCKET).is_empty());
}

#[tokio::test]
async fn test_second_run_replaces_first() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let dataset = diner_dataset();
    let runner = runner(&store, &assets, config());

    let first = runner.run(&dataset).await;
    let second = runner.run(&dataset).await;

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(second.deleted, first.created);
    assert_eq!(second.created, first.created);
    assert_eq!(store.documents(MENU).len(), dataset.menu.len());
    assert_eq!(store.files(BUCKET).len(), dataset.menu.len());
    assert_eq!(link_names(&store), dataset_link_names(&dataset));
}

#[tokio::test]
async fn test_unknown_customization_kind_is_kept() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let dataset = SeedDataset {
        categories: vec![category("Sweets")],
        customizations: vec![customization(
            "Sprinkles",
            0.5,
            CustomizationKind::Other("garnish".to_string()),
        )],
        menu: vec![],
    };

    let report = runner(&store, &assets, config()).run(&dataset).await;

    assert!(report.is_success());
    let sprinkles = by_name(&store.documents(CUSTOMIZATIONS), "Sprinkles");
    assert_eq!(sprinkles.str_field("type"), Some("garnish"));
}

#[tokio::test]
async fn test_customization_failure_aborts_menu_stage() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_nth(StoreOp::CreateDocument, CUSTOMIZATIONS, 2);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&diner_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed {
        stage: Stage::CreateCustomizations
    });
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::Api);
    assert_eq!(failure.entity.as_deref(), Some("Bacon"));

    assert_eq!(report.created.categories, 3);
    assert_eq!(report.created.customizations, 1);
    assert_eq!(store.documents(CUSTOMIZATIONS).len(), 1);
    assert!(created_ids(&store.calls(), MENU).is_empty());
    assert!(store.files(BUCKET).is_empty());
    assert!(assets.fetched().is_empty());
}

#[tokio::test]
async fn test_link_failure_stops_at_current_item() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_nth(StoreOp::CreateDocument, LINKS, 2);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&diner_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed {
        stage: Stage::CreateMenuItems
    });
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.kind, ErrorKind::Api);
    assert_eq!(failure.entity.as_deref(), Some("Classic Burger"));

    assert_eq!(report.created.menu_items, 1);
    assert_eq!(report.created.links, 1);
    assert_eq!(store.documents(MENU).len(), 1);
    assert_eq!(store.documents(LINKS).len(), 1);
    assert_eq!(
        link_names(&store),
        BTreeSet::from([("Classic Burger".into(), "Extra Cheese".into())])
    );
    assert_eq!(assets.fetched().len(), 1);
    assert!(assets.leftover_files().is_empty());
}

#[tokio::test]
async fn test_bucket_listing_failure_aborts_erase() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_documents(CATEGORIES, 2);
    store.insert_files(BUCKET, 3);
    store.fail_nth(StoreOp::ListFiles, BUCKET, 1);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&pizza_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed { stage: Stage::Erase });
    assert_eq!(report.failure.as_ref().unwrap().kind, ErrorKind::Api);
    assert_eq!(report.deleted.categories, 2);
    assert_eq!(report.deleted.files, 0);
    assert_eq!(store.files(BUCKET).len(), 3);
    assert_eq!(store.count_calls(is_create), 0);
    assert!(assets.fetched().is_empty());
}

#[tokio::test]
async fn test_bucket_delete_failure_aborts_erase() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_files(BUCKET, 3);
    store.fail_nth(StoreOp::DeleteFile, BUCKET, 2);
    let assets = Arc::new(FakeAssetSource::new());

    let report = runner(&store, &assets, config()).run(&pizza_dataset()).await;

    assert_eq!(report.outcome, Outcome::Failed { stage: Stage::Erase });
    assert_eq!(report.failure.as_ref().unwrap().kind, ErrorKind::Api);
    assert_eq!(store.files(BUCKET).len(), 2);
    assert_eq!(store.count_calls(is_create), 0);
    assert!(store.documents(CATEGORIES).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_default_throttle_paces_pizza_run() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let mut config = config();
    config.throttle = ThrottleConfig::default();

    let start = Instant::now();
    let report = runner(&store, &assets, config).run(&pizza_dataset()).await;
    let elapsed = start.elapsed();

    assert!(report.is_success(), "{:?}", report.failure);
    // Two categories, one customization and the upload are 100ms apart;
    // the upload and the menu document each hold the next call for 200ms.
    assert!(elapsed >= Duration::from_millis(700), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_default_throttle_paces_deletions() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_documents(MENU, 3);
    let assets = Arc::new(FakeAssetSource::new());
    let mut config = config();
    config.throttle = ThrottleConfig::default();

    let start = Instant::now();
    let report = runner(&store, &assets, config).erase_only().await;
    let elapsed = start.elapsed();

    assert!(report.is_success());
    assert_eq!(report.deleted.menu_items, 3);
    assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(300), "{elapsed:?}");
}

#[tokio::test]
async fn test_skipped_items_advance_progress() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let mut config = config();
    config.unresolved_references = UnresolvedReferencePolicy::Skip;
    let (tracker, mut progress_rx) = ProgressTracker::new();

    let report = runner(&store, &assets, config)
        .with_progress(tracker)
        .run(&dessert_dataset())
        .await;
    assert!(report.is_success());

    let mut menu_updates = Vec::new();
    while let Ok(event) = progress_rx.try_recv() {
        match event {
            ProgressEvent::Update(update)
                if update.stage == Stage::CreateMenuItems =>
            {
                menu_updates.push((update.current, update.total));
            }
            _ => {}
        }
    }

    assert_eq!(menu_updates, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn test_duplicate_menu_item_names_are_all_created() {
    let store = Arc::new(InMemoryStore::new());
    let assets = Arc::new(FakeAssetSource::new());
    let mut dataset = pizza_dataset();
    dataset.menu.push(menu_item("Margherita", "Pizza", &[]));

    let report = runner(&store, &assets, config()).run(&dataset).await;

    assert!(report.is_success());
    assert_eq!(report.created.menu_items, 2);
    let margheritas = store
        .documents(MENU)
        .into_iter()
        .filter(|d| d.str_field("name") == Some("Margherita"))
        .count();
    assert_eq!(margheritas, 2);
    assert_eq!(store.documents(LINKS).len(), 1);
}
