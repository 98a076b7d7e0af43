use uuid::Uuid;

/// Produces client-side identifiers for created entities.
pub trait IdGenerator: Send + Sync {
    fn unique(&self) -> String;
}

/// UUID v7 in simple form: 32 lowercase hex characters, which fits the
/// store's custom id rules (max 36 chars, alphanumeric start).
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueIdGenerator;

impl IdGenerator for UniqueIdGenerator {
    fn unique(&self) -> String { Uuid::now_v7().simple().to_string() }
}
