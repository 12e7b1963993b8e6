pub mod check;
pub mod errors;
pub mod key;
pub mod manifest;
pub mod merge;
pub mod pipeline;
pub mod regroup;
pub mod validate;

pub use errors::*;
