//! Single-pool yield farm.
//!
//! One owner funds the pool with the reward asset; stakers deposit the stake
//! asset and, on harvest, collect a reward proportional to elapsed time and
//! their share of the pool, together with their full stake.

pub mod accrual;
pub mod events;
pub mod pool;

pub use accrual::{compute_reward, Settlement, MIN_PAYOUT};
pub use events::FarmEvent;
pub use pool::{DepositPolicy, PoolState, StakerRecord};

use log::info;

use crate::config::FarmConfig;
use crate::errors::{FarmError, FarmResult};
use crate::ledger::{Address, AssetId};

/// The farm contract: configuration, pool state and pending events.
///
/// Operations take the asset ledger and the current time as arguments, so any
/// number of independent pools can live side by side.
#[derive(Debug, Clone)]
pub struct FarmContract {
    owner: Address,
    address: Address,
    reward_asset: AssetId,
    stake_asset: AssetId,
    deposit_policy: DepositPolicy,
    state: PoolState,
    events: Vec<FarmEvent>,
}

impl FarmContract {
    pub fn new(config: FarmConfig) -> FarmResult<Self> {
        config.validate()?;
        info!(
            "Farm created at {}: reward {} at rate {}, stake {}",
            config.pool_address, config.reward_asset, config.reward_rate, config.stake_asset
        );

        Ok(Self {
            owner: config.owner,
            address: config.pool_address,
            reward_asset: config.reward_asset,
            stake_asset: config.stake_asset,
            deposit_policy: config.deposit_policy,
            state: PoolState::new(config.reward_rate),
            events: Vec::new(),
        })
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Ledger account holding the pool's balances
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn reward_asset(&self) -> &AssetId {
        &self.reward_asset
    }

    pub fn stake_asset(&self) -> &AssetId {
        &self.stake_asset
    }

    pub fn deposit_policy(&self) -> DepositPolicy {
        self.deposit_policy
    }

    pub fn state(&self) -> &PoolState {
        &self.state
    }

    pub fn check_invariants(&self) -> bool {
        self.state.check_invariants()
    }

    pub fn events(&self) -> &[FarmEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<FarmEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serialize the persisted pool layout as JSON
    pub fn export_state(&self) -> FarmResult<String> {
        Ok(serde_json::to_string_pretty(&self.state)?)
    }

    /// Replace the pool state with a previously exported one
    pub fn import_state(&mut self, json: &str) -> FarmResult<()> {
        let state: PoolState = serde_json::from_str(json)?;
        if !state.check_invariants() {
            return Err(FarmError::Serialization(
                "pool totals do not match staker records".to_string(),
            ));
        }
        if state.records.contains_key(&self.address) {
            return Err(FarmError::Serialization(format!(
                "pool account {} holds a staker record",
                self.address
            )));
        }
        if state.reward_rate != self.state.reward_rate {
            return Err(FarmError::Serialization(format!(
                "reward rate {} does not match configured rate {}",
                state.reward_rate, self.state.reward_rate
            )));
        }
        self.state = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
