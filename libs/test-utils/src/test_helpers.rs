use std::sync::atomic::{AtomicUsize, Ordering};

use menu_models::{
    CustomizationKind, SeedDataset, SourceCategory, SourceCustomization,
    SourceMenuItem,
};
use store_traits::IdGenerator;

/// Deterministic ids: `id-1`, `id-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn unique(&self) -> String {
        format!("id-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub fn category(name: &str) -> SourceCategory {
    SourceCategory {
        name: name.to_string(),
        description: format!("All things {}", name.to_lowercase()),
    }
}

pub fn customization(
    name: &str, price: f64, kind: CustomizationKind,
) -> SourceCustomization {
    SourceCustomization {
        name: name.to_string(),
        price,
        kind,
    }
}

pub fn menu_item(
    name: &str, category_name: &str, customizations: &[&str],
) -> SourceMenuItem {
    let slug = name.to_lowercase().replace(' ', "-");
    SourceMenuItem {
        name: name.to_string(),
        description: format!("House {name}"),
        image_url: format!("https://images.example.com/menu/{slug}.jpg"),
        price: 9.5,
        rating: 4.5,
        calories: 600,
        protein: 25,
        category_name: category_name.to_string(),
        customizations: customizations
            .iter()
            .map(|c| c.to_string())
            .collect(),
    }
}

/// Two categories, one customization, one menu item linking both.
pub fn pizza_dataset() -> SeedDataset {
    SeedDataset {
        categories: vec![category("Pizza"), category("Drinks")],
        customizations: vec![customization(
            "Extra Cheese",
            1.50,
            CustomizationKind::Topping,
        )],
        menu: vec![menu_item("Margherita", "Pizza", &["Extra Cheese"])],
    }
}

/// A larger dataset with several items and shared customizations.
pub fn diner_dataset() -> SeedDataset {
    SeedDataset {
        categories: vec![
            category("Burgers"),
            category("Pizza"),
            category("Drinks"),
        ],
        customizations: vec![
            customization("Extra Cheese", 1.5, CustomizationKind::Topping),
            customization("Bacon", 2.0, CustomizationKind::Topping),
            customization("Fries", 2.5, CustomizationKind::Side),
            customization("Large", 1.0, CustomizationKind::Size),
        ],
        menu: vec![
            menu_item(
                "Classic Burger",
                "Burgers",
                &["Extra Cheese", "Bacon", "Fries"],
            ),
            menu_item("Pepperoni", "Pizza", &["Extra Cheese"]),
            menu_item("Cola", "Drinks", &["Large"]),
            menu_item("Water", "Drinks", &[]),
        ],
    }
}
