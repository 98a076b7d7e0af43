use std::fmt;

use chrono::{DateTime, Utc};
use seed_errors::{EntityKind, ErrorKind, SeedError};
use serde::Serialize;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Erase,
    CreateCategories,
    CreateCustomizations,
    CreateMenuItems,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Erase => "erase",
            Self::CreateCategories => "create categories",
            Self::CreateCustomizations => "create customizations",
            Self::CreateMenuItems => "create menu items",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Done,
    Failed { stage: Stage },
}

/// Per-collection counters; `files` counts bucket objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub categories: usize,
    pub customizations: usize,
    pub menu_items: usize,
    pub links: usize,
    pub files: usize,
}

impl Counts {
    pub fn total(&self) -> usize {
        self.categories
            + self.customizations
            + self.menu_items
            + self.links
            + self.files
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedEntry {
    pub kind: EntityKind,
    pub name: String,
    pub referenced_by: String,
}

impl UnresolvedEntry {
    pub fn from_error(error: &SeedError) -> Option<Self> {
        match error {
            SeedError::UnresolvedReference {
                kind,
                name,
                referenced_by,
            } => Some(Self {
                kind: *kind,
                name: name.clone(),
                referenced_by: referenced_by.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub stage: Stage,
    pub kind: ErrorKind,
    /// Source name of the entity being processed, when there was one.
    pub entity: Option<String>,
    pub message: String,
}

/// Structured result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub outcome: Outcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub deleted: Counts,
    pub created: Counts,
    pub unresolved: Vec<UnresolvedEntry>,
    pub skipped_items: Vec<String>,
    pub failure: Option<FailureSummary>,
}

impl RunReport {
    pub(crate) fn start() -> Self {
        Self {
            outcome: Outcome::Done,
            started_at: Utc::now(),
            finished_at: None,
            deleted: Counts::default(),
            created: Counts::default(),
            unresolved: Vec::new(),
            skipped_items: Vec::new(),
            failure: None,
        }
    }

    pub(crate) fn fail(
        &mut self, stage: Stage, entity: Option<String>, error: &SeedError,
    ) {
        self.outcome = Outcome::Failed { stage };
        self.failure = Some(FailureSummary {
            stage,
            kind: error.kind(),
            entity,
            message: error.to_string(),
        });
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn is_success(&self) -> bool { self.outcome == Outcome::Done }
}
