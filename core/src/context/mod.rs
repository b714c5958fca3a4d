mod config;

pub use config::{APP_NAME, ConfigError, EngineConfigExt};
