pub mod asset_service;
pub mod naming;
pub mod reference_tables;

pub use asset_service::{AssetService, StoredBlob};
pub use naming::{increment_name, NameScope};
pub use reference_tables::ReferenceTables;
