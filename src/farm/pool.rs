use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{FarmError, FarmResult};
use crate::farm::{FarmContract, FarmEvent};
use crate::ledger::{Address, Amount, AssetLedger};
use crate::utils::Timestamp;

/// Position held by one staker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakerRecord {
    /// Currently staked quantity of the stake asset
    pub amount: Amount,
    /// When the current stake began accruing; `None` while inactive
    pub stake_start: Option<Timestamp>,
    /// Reward the pool could not pay at a previous harvest
    pub debt: Amount,
}

impl StakerRecord {
    pub fn is_active(&self) -> bool {
        self.amount > 0
    }

    fn is_empty(&self) -> bool {
        self.amount == 0 && self.debt == 0
    }
}

/// Which existing records may open a new position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// Only an open position blocks a deposit; carried debt does not
    #[default]
    RequireInactive,
    /// Carried debt also blocks a deposit
    RequireDebtFree,
}

impl DepositPolicy {
    pub fn admits(&self, record: &StakerRecord) -> bool {
        match self {
            DepositPolicy::RequireInactive => !record.is_active(),
            DepositPolicy::RequireDebtFree => !record.is_active() && record.debt == 0,
        }
    }
}

/// Aggregate counters plus every staker record.
///
/// `total_staked` and `total_debt` always equal the sums over `records`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub(crate) reward_rate: Amount,
    pub(crate) total_staked: Amount,
    pub(crate) total_debt: Amount,
    pub(crate) records: BTreeMap<Address, StakerRecord>,
}

impl PoolState {
    pub fn new(reward_rate: Amount) -> Self {
        Self {
            reward_rate,
            ..Self::default()
        }
    }

    pub fn reward_rate(&self) -> Amount {
        self.reward_rate
    }

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    pub fn total_debt(&self) -> Amount {
        self.total_debt
    }

    /// Record for `staker`, zeroed if it has never staked
    pub fn record(&self, staker: &Address) -> StakerRecord {
        self.records.get(staker).copied().unwrap_or_default()
    }

    pub fn records(&self) -> impl Iterator<Item = (&Address, &StakerRecord)> {
        self.records.iter()
    }

    /// Store `record`, dropping it entirely once it carries nothing
    pub(crate) fn put_record(&mut self, staker: Address, record: StakerRecord) {
        if record.is_empty() {
            self.records.remove(&staker);
        } else {
            self.records.insert(staker, record);
        }
    }

    /// Whether the aggregate counters match the per-staker records
    pub fn check_invariants(&self) -> bool {
        let mut staked: u128 = 0;
        let mut debt: u128 = 0;
        for record in self.records.values() {
            if record.is_active() != record.stake_start.is_some() {
                return false;
            }
            staked += record.amount as u128;
            debt += record.debt as u128;
        }
        staked == self.total_staked as u128 && debt == self.total_debt as u128
    }
}

/// Counters and one record as they were before an operation touched them
pub(crate) struct Checkpoint {
    staker: Address,
    record: StakerRecord,
    total_staked: Amount,
    total_debt: Amount,
}

impl Checkpoint {
    pub(crate) fn capture(state: &PoolState, staker: &Address) -> Self {
        Self {
            staker: *staker,
            record: state.record(staker),
            total_staked: state.total_staked,
            total_debt: state.total_debt,
        }
    }

    pub(crate) fn restore(self, state: &mut PoolState) {
        state.total_staked = self.total_staked;
        state.total_debt = self.total_debt;
        state.put_record(self.staker, self.record);
    }
}

impl FarmContract {
    /// Move `amount` of reward asset from the owner into the pool.
    ///
    /// The owner must have approved the pool for at least `amount`.
    pub fn fund_rewards<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        caller: &Address,
        amount: Amount,
        now: Timestamp,
    ) -> FarmResult<()> {
        if *caller != self.owner {
            return Err(FarmError::Unauthorized { caller: *caller });
        }
        if amount == 0 {
            return Err(FarmError::InvalidAmount);
        }

        ledger.transfer_from(&self.reward_asset, &self.address, caller, &self.address, amount)?;

        info!("Pool funded with {} {} by {}", amount, self.reward_asset, caller);
        self.events.push(FarmEvent::RewardsFunded {
            funder: *caller,
            amount,
            at: now,
        });
        Ok(())
    }

    /// Open a position of `amount` stake asset for `staker`, accruing from `now`
    pub fn deposit<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        staker: &Address,
        amount: Amount,
        now: Timestamp,
    ) -> FarmResult<()> {
        if amount == 0 {
            return Err(FarmError::InvalidAmount);
        }
        // Transfers to and from the pool itself move nothing on the ledger
        if *staker == self.address {
            return Err(FarmError::PoolSelfStake { pool: self.address });
        }

        let balance = self.balance_of_reward_asset(&*ledger);
        if balance < self.state.reward_rate {
            return Err(FarmError::RewardUnavailable {
                balance,
                required: self.state.reward_rate,
            });
        }

        let record = self.state.record(staker);
        if !self.deposit_policy.admits(&record) {
            debug!(
                "Deposit refused for {}: amount={} debt={} policy={:?}",
                staker, record.amount, record.debt, self.deposit_policy
            );
            return Err(FarmError::AlreadyStaked { staker: *staker });
        }

        let total_staked = self
            .state
            .total_staked
            .checked_add(amount)
            .ok_or(FarmError::ArithmeticOverflow)?;

        let checkpoint = Checkpoint::capture(&self.state, staker);
        self.state.total_staked = total_staked;
        self.state.put_record(
            *staker,
            StakerRecord {
                amount,
                stake_start: Some(now),
                debt: record.debt,
            },
        );

        if let Err(err) =
            ledger.transfer_from(&self.stake_asset, &self.address, staker, &self.address, amount)
        {
            warn!("Deposit by {} rolled back: {}", staker, err);
            checkpoint.restore(&mut self.state);
            return Err(err.into());
        }

        info!(
            "{} staked {} {} (pool total {})",
            staker, amount, self.stake_asset, self.state.total_staked
        );
        self.events.push(FarmEvent::Deposited {
            staker: *staker,
            amount,
            at: now,
        });
        Ok(())
    }

    /// Reward asset currently held by the pool
    pub fn balance_of_reward_asset<L: AssetLedger + ?Sized>(&self, ledger: &L) -> Amount {
        ledger.balance_of(&self.reward_asset, &self.address)
    }

    /// Stake asset currently held by the pool
    pub fn balance_of_stake_asset<L: AssetLedger + ?Sized>(&self, ledger: &L) -> Amount {
        ledger.balance_of(&self.stake_asset, &self.address)
    }

    pub fn record_of(&self, staker: &Address) -> StakerRecord {
        self.state.record(staker)
    }

    pub fn debt_of(&self, staker: &Address) -> Amount {
        self.state.record(staker).debt
    }

    pub fn total_debt(&self) -> Amount {
        self.state.total_debt
    }

    pub fn total_staked(&self) -> Amount {
        self.state.total_staked
    }

    pub fn reward_rate(&self) -> Amount {
        self.state.reward_rate
    }

    /// Every staker with an open position or carried debt
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, &StakerRecord)> {
        self.state.records()
    }

    pub fn active_stakers(&self) -> usize {
        self.state.records.values().filter(|r| r.is_active()).count()
    }
}
