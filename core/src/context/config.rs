use crate::ranks::{RankTable, RankTableError};
use rankline_types::EngineConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const APP_NAME: &str = "rankline";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0:?} does not exist")]
    NotFound(PathBuf),
    #[error("failed to load config: {0}")]
    Load(#[from] confy::ConfyError),
    #[error("invalid rank table: {0}")]
    Ranks(#[from] RankTableError),
}

/// Loading and derived values for [`EngineConfig`].
pub trait EngineConfigExt: Sized {
    /// Load from the per-user config location, falling back to defaults.
    fn load() -> Self;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn config_path() -> Option<PathBuf>;

    fn rank_table(&self) -> Result<RankTable, ConfigError>;
    fn voice_tick(&self) -> Duration;
    fn persist_interval(&self) -> Duration;
    fn data_path(&self) -> PathBuf;
}

impl EngineConfigExt for EngineConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load an existing file. Unlike [`EngineConfigExt::load`], a missing
    /// file is an error rather than a fresh default written to disk.
    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Ok(confy::load_path(path)?)
    }

    fn config_path() -> Option<PathBuf> {
        confy::get_configuration_file_path(APP_NAME, None).ok()
    }

    fn rank_table(&self) -> Result<RankTable, ConfigError> {
        Ok(RankTable::from_config(&self.ranks)?)
    }

    fn voice_tick(&self) -> Duration {
        Duration::from_secs(self.voice_tick_secs.max(1))
    }

    fn persist_interval(&self) -> Duration {
        Duration::from_secs(self.persist_interval_secs.max(1))
    }

    fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_file)
    }
}
