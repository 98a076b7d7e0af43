pub mod assets;
pub mod memory_store;
pub mod test_helpers;

pub use assets::FakeAssetSource;
pub use memory_store::{
    InMemoryStore, StoreCall, StoreOp, created_ids, erase_order,
};
pub use test_helpers::*;
