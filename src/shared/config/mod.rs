pub mod model;

pub use model::{
    ChannelRule, CheckConfig, LoggingConfig, MergeConfig, PathsConfig, RunConfig, Settings,
    ValidateConfig, load_settings,
};
