pub mod records;
pub mod source;

pub use records::{
    CategoryRecord, CustomizationRecord, Document, DocumentFields,
    MenuCustomizationLink, MenuItemRecord, StoredFile,
};
pub use source::{
    CustomizationKind, SeedDataset, SourceCategory, SourceCustomization,
    SourceMenuItem,
};
