// Configuration module for the farm
// A pool is built from one FarmConfig, loaded from TOML with environment overrides

pub mod validation;

pub use validation::{ConfigValidationError, ConfigValidator};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::farm::DepositPolicy;
use crate::ledger::{Address, Amount, AssetId};

/// Environment prefix used by [`FarmConfig::load`]
pub const ENV_PREFIX: &str = "FARM";

/// Construction parameters for a farm pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// The only identity allowed to fund rewards
    pub owner: Address,
    /// Account that holds the pool's reward and stake balances on the ledger
    pub pool_address: Address,
    /// Asset paid out as reward ("asset A")
    pub reward_asset: AssetId,
    /// Asset deposited by stakers ("asset B")
    pub stake_asset: AssetId,
    /// Reward units accrued per time unit across the whole pool
    pub reward_rate: Amount,
    /// Which records may open a new position
    #[serde(default)]
    pub deposit_policy: DepositPolicy,
}

impl FarmConfig {
    pub fn new(
        owner: Address,
        pool_address: Address,
        reward_asset: AssetId,
        stake_asset: AssetId,
        reward_rate: Amount,
    ) -> Self {
        Self {
            owner,
            pool_address,
            reward_asset,
            stake_asset,
            reward_rate,
            deposit_policy: DepositPolicy::default(),
        }
    }

    pub fn with_deposit_policy(mut self, policy: DepositPolicy) -> Self {
        self.deposit_policy = policy;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigValidationError> {
        let config: FarmConfig =
            toml::from_str(s).map_err(|e| ConfigValidationError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigValidationError> {
        toml::to_string(self).map_err(|e| ConfigValidationError::Load(e.to_string()))
    }

    /// Load from a file, letting `FARM_*` environment variables override it
    pub fn load(path: &Path) -> Result<Self, ConfigValidationError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_env_prefix(path: &Path, prefix: &str) -> Result<Self, ConfigValidationError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(::config::Environment::with_prefix(prefix).try_parsing(true))
            .build()
            .map_err(|e| ConfigValidationError::Load(e.to_string()))?;

        let config: FarmConfig = settings
            .try_deserialize()
            .map_err(|e| ConfigValidationError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        ConfigValidator::validate(self)
    }
}
