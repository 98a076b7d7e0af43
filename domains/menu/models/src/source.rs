use std::{fmt, path::Path};

use seed_errors::{DatasetError, EntityKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCategory {
    pub name: String,
    pub description: String,
}

/// Customization vocabulary. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CustomizationKind {
    Topping,
    Side,
    Size,
    Crust,
    Other(String),
}

impl CustomizationKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Topping => "topping",
            Self::Side => "side",
            Self::Size => "size",
            Self::Crust => "crust",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for CustomizationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "topping" => Self::Topping,
            "side" => Self::Side,
            "size" => Self::Size,
            "crust" => Self::Crust,
            _ => Self::Other(value),
        }
    }
}

impl From<CustomizationKind> for String {
    fn from(kind: CustomizationKind) -> Self {
        match kind {
            CustomizationKind::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CustomizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCustomization {
    pub name: String,
    pub price: f64,
    #[serde(rename = "type")]
    pub kind: CustomizationKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceMenuItem {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub rating: f64,
    pub calories: u32,
    pub protein: u32,
    pub category_name: String,
    /// Customization names, in the order links are created.
    #[serde(default)]
    pub customizations: Vec<String>,
}

/// The static dataset a run replaces the remote state with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeedDataset {
    #[serde(default)]
    pub categories: Vec<SourceCategory>,
    #[serde(default)]
    pub customizations: Vec<SourceCustomization>,
    #[serde(default)]
    pub menu: Vec<SourceMenuItem>,
}

impl SeedDataset {
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path).map_err(|source| {
            DatasetError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_json_str(&raw)
    }

    /// Prices must be finite and non-negative.
    pub fn validate(&self) -> Result<(), DatasetError> {
        let customization_prices = self
            .customizations
            .iter()
            .map(|c| (EntityKind::Customization, &c.name, c.price));
        let menu_prices = self
            .menu
            .iter()
            .map(|m| (EntityKind::MenuItem, &m.name, m.price));

        for (kind, name, price) in customization_prices.chain(menu_prices) {
            if !price.is_finite() || price < 0.0 {
                return Err(DatasetError::InvalidPrice {
                    kind,
                    name: name.clone(),
                    price,
                });
            }
        }

        Ok(())
    }

    /// Total number of link documents a successful run creates.
    pub fn link_count(&self) -> usize {
        self.menu.iter().map(|item| item.customizations.len()).sum()
    }
}
