use log::warn;
use thiserror::Error;

use crate::config::FarmConfig;

/// Error type for configuration validation issues
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Incompatible settings: {0}")]
    IncompatibleSettings(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Checks a farm configuration before a pool is built from it
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate `config`, returning the first hard error found.
    ///
    /// Settings that are legal but unusual are logged as warnings.
    pub fn validate(config: &FarmConfig) -> Result<(), ConfigValidationError> {
        if config.reward_asset.as_str().is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "reward_asset must not be empty".to_string(),
            ));
        }
        if config.stake_asset.as_str().is_empty() {
            return Err(ConfigValidationError::InvalidValue(
                "stake_asset must not be empty".to_string(),
            ));
        }
        if config.reward_asset == config.stake_asset {
            return Err(ConfigValidationError::IncompatibleSettings(format!(
                "reward and stake asset are both {}",
                config.reward_asset
            )));
        }
        if config.pool_address == config.owner {
            return Err(ConfigValidationError::IncompatibleSettings(
                "pool_address must differ from owner".to_string(),
            ));
        }

        if config.reward_rate == 0 {
            warn!("reward_rate is 0: no rewards accrue to stakers");
        }

        Ok(())
    }
}
