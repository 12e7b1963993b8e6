pub mod artifact_key;
pub mod category;

pub use artifact_key::ArtifactKey;
pub use category::Category;
