//! Reward accrual and debt reconciliation.
//!
//! A harvest runs in two phases. [`FarmContract::settle`] computes the payout
//! and commits every counter change; only then does [`FarmContract::harvest`]
//! move assets. A ledger that calls back into the pool during a payout
//! therefore sees the position already closed.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{FarmError, FarmResult};
use crate::farm::pool::{Checkpoint, StakerRecord};
use crate::farm::{FarmContract, FarmEvent};
use crate::ledger::{Address, Amount, AssetLedger};
use crate::utils::{elapsed_between, format_duration, Timestamp};

/// Smallest reward paid for any period with a strictly positive raw reward
pub const MIN_PAYOUT: Amount = 1;

/// Reward earned by `amount` out of `total_staked` over `elapsed` time units.
///
/// Computes `elapsed * reward_rate * amount / total_staked` exactly, rounds half
/// up, and lifts a non-zero result that rounds to 0 up to [`MIN_PAYOUT`].
pub fn compute_reward(
    elapsed: u64,
    reward_rate: Amount,
    amount: Amount,
    total_staked: Amount,
) -> FarmResult<Amount> {
    if total_staked == 0 {
        return Ok(0);
    }

    let numerator = (elapsed as u128)
        .checked_mul(reward_rate as u128)
        .and_then(|v| v.checked_mul(amount as u128))
        .ok_or(FarmError::ArithmeticOverflow)?;
    if numerator == 0 {
        return Ok(0);
    }

    let denominator = total_staked as u128;
    // floor(n / d + 1/2) == floor((2n + d) / 2d)
    let rounded = numerator
        .checked_mul(2)
        .and_then(|v| v.checked_add(denominator))
        .ok_or(FarmError::ArithmeticOverflow)?
        / (denominator * 2);

    let reward = Amount::try_from(rounded).map_err(|_| FarmError::ArithmeticOverflow)?;
    Ok(reward.max(MIN_PAYOUT))
}

/// Outcome of one harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub staker: Address,
    /// Whole time units the position accrued
    pub elapsed: u64,
    /// Reward earned before clamping to the pool balance
    pub reward: Amount,
    /// Reward actually paid, never above the pool balance
    pub payable: Amount,
    /// Unpaid part of `reward`, booked as debt
    pub shortfall: Amount,
    /// Stake asset returned to the staker
    pub principal: Amount,
    pub settled_at: Timestamp,
}

impl FarmContract {
    /// What a harvest by `staker` at `now` would produce, without touching state
    pub fn pending_reward<L: AssetLedger + ?Sized>(
        &self,
        ledger: &L,
        staker: &Address,
        now: Timestamp,
    ) -> FarmResult<Settlement> {
        let available = self.balance_of_reward_asset(ledger);
        self.quote(staker, now, available)
    }

    fn quote(&self, staker: &Address, now: Timestamp, available: Amount) -> FarmResult<Settlement> {
        let record = self.state.record(staker);
        if !record.is_active() {
            return Err(FarmError::NoActiveStake { staker: *staker });
        }

        let start = record.stake_start.unwrap_or(now);
        let elapsed = elapsed_between(start, now);
        let reward = compute_reward(
            elapsed,
            self.state.reward_rate,
            record.amount,
            self.state.total_staked,
        )?;
        let payable = reward.min(available);

        debug!(
            "Accrual for {}: {} x rate {} x {}/{} -> reward {}, payable {}",
            staker,
            format_duration(elapsed),
            self.state.reward_rate,
            record.amount,
            self.state.total_staked,
            reward,
            payable
        );

        Ok(Settlement {
            staker: *staker,
            elapsed,
            reward,
            payable,
            shortfall: reward - payable,
            principal: record.amount,
            settled_at: now,
        })
    }

    /// Compute `staker`'s payout against `available` reward balance and commit
    /// the resulting state: debt booked, position closed, total reduced.
    ///
    /// Moves no assets; the caller owes the staker `payable` reward and
    /// `principal` stake once this returns.
    pub fn settle(
        &mut self,
        staker: &Address,
        now: Timestamp,
        available: Amount,
    ) -> FarmResult<Settlement> {
        let settlement = self.quote(staker, now, available)?;
        let record = self.state.record(staker);

        let debt = record
            .debt
            .checked_add(settlement.shortfall)
            .ok_or(FarmError::ArithmeticOverflow)?;
        let total_debt = self
            .state
            .total_debt
            .checked_add(settlement.shortfall)
            .ok_or(FarmError::ArithmeticOverflow)?;

        self.state.total_debt = total_debt;
        self.state.total_staked -= settlement.principal;
        self.state.put_record(
            *staker,
            StakerRecord {
                amount: 0,
                stake_start: None,
                debt,
            },
        );

        if settlement.shortfall > 0 {
            warn!(
                "Pool short by {} {} for {}; booked as debt (total debt {})",
                settlement.shortfall, self.reward_asset, staker, total_debt
            );
        }
        Ok(settlement)
    }

    /// Pay `staker` its reward and return its full stake.
    ///
    /// The principal is returned even when the pool cannot cover the reward;
    /// the unpaid part becomes debt. If either transfer fails the contract
    /// state is restored and the error is returned.
    pub fn harvest<L: AssetLedger + ?Sized>(
        &mut self,
        ledger: &mut L,
        staker: &Address,
        now: Timestamp,
    ) -> FarmResult<Settlement> {
        let available = self.balance_of_reward_asset(&*ledger);
        let checkpoint = Checkpoint::capture(&self.state, staker);
        let settlement = self.settle(staker, now, available)?;

        if let Err(err) = self.pay_out(ledger, &settlement) {
            warn!("Harvest by {} rolled back: {}", staker, err);
            checkpoint.restore(&mut self.state);
            return Err(err);
        }

        info!(
            "{} harvested {} {} (earned {}) and withdrew {} {}",
            staker,
            settlement.payable,
            self.reward_asset,
            settlement.reward,
            settlement.principal,
            self.stake_asset
        );
        self.events.push(FarmEvent::Harvested {
            staker: *staker,
            reward: settlement.reward,
            paid: settlement.payable,
            principal: settlement.principal,
            at: now,
        });
        if settlement.shortfall > 0 {
            self.events.push(FarmEvent::DebtRecorded {
                staker: *staker,
                shortfall: settlement.shortfall,
                total_debt: self.state.total_debt,
                at: now,
            });
        }
        Ok(settlement)
    }

    fn pay_out<L: AssetLedger + ?Sized>(
        &self,
        ledger: &mut L,
        settlement: &Settlement,
    ) -> FarmResult<()> {
        ledger.transfer(
            &self.reward_asset,
            &self.address,
            &settlement.staker,
            settlement.payable,
        )?;
        ledger.transfer(
            &self.stake_asset,
            &self.address,
            &settlement.staker,
            settlement.principal,
        )?;
        Ok(())
    }
}
