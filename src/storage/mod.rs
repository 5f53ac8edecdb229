//! On-disk state: the configuration document and the managed audio directory.

pub mod catalog;
pub mod config_store;
pub mod filename;
pub mod layout;
pub mod upload;

pub use catalog::{Asset, AssetCatalog};
pub use config_store::ConfigStore;
pub use layout::{Migration, StorageLayout};
pub use upload::{UploadCandidate, UploadPipeline};
