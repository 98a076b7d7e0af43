pub mod asset;
pub mod id;
pub mod page;
pub mod store;

pub use asset::{AssetSource, StagedAsset};
pub use id::{IdGenerator, UniqueIdGenerator};
pub use page::{DocumentPage, FilePage, PageRequest};
pub use store::{FileUpload, RemoteStore};
