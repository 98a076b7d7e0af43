use std::{collections::HashMap, fmt, marker::PhantomData};

use seed_errors::{EntityKind, SeedError, SeedResult};
use tracing::warn;

/// Marker for the entity kind a `NameIndex` maps to.
pub trait IndexKind: Send + Sync + 'static {
    const KIND: EntityKind;
}

#[derive(Debug)]
pub enum Categories {}

#[derive(Debug)]
pub enum Customizations {}

#[derive(Debug)]
pub enum MenuItems {}

impl IndexKind for Categories {
    const KIND: EntityKind = EntityKind::Category;
}

impl IndexKind for Customizations {
    const KIND: EntityKind = EntityKind::Customization;
}

impl IndexKind for MenuItems {
    const KIND: EntityKind = EntityKind::MenuItem;
}

/// Source name -> created identifier, for one entity kind, for one run.
pub struct NameIndex<K: IndexKind> {
    ids: HashMap<String, String>,
    _kind: PhantomData<K>,
}

impl<K: IndexKind> NameIndex<K> {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            _kind: PhantomData,
        }
    }

    /// Last write wins on duplicate names.
    pub fn record(&mut self, name: &str, id: impl Into<String>) {
        let id = id.into();
        if let Some(previous) = self.ids.insert(name.to_string(), id.clone())
        {
            warn!(
                "Duplicate {} name '{}': {} replaces {}",
                K::KIND,
                name,
                id,
                previous
            );
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.ids.get(name).map(String::as_str)
    }

    pub fn require(
        &self, name: &str, referenced_by: &str,
    ) -> SeedResult<&str> {
        self.resolve(name).ok_or_else(|| {
            SeedError::unresolved(K::KIND, name, referenced_by)
        })
    }

    pub fn len(&self) -> usize { self.ids.len() }

    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
}

impl<K: IndexKind> Default for NameIndex<K> {
    fn default() -> Self { Self::new() }
}

impl<K: IndexKind> fmt::Debug for NameIndex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameIndex")
            .field("kind", &K::KIND)
            .field("ids", &self.ids)
            .finish()
    }
}
