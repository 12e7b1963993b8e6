pub mod manifest;
pub mod store;

pub use manifest::{Manifest, ManifestValue};
pub use store::ManifestStore;
