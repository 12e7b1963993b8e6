pub mod runner;
pub mod stage;

pub use runner::{PipelineConfig, PipelineRunner};
pub use stage::{RejectedKey, Stage, StagePlan};
