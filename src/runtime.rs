//! Transaction host for a farm contract.
//!
//! The host owns the contract and the asset ledger behind one lock, so calls
//! are totally ordered no matter how many threads submit them. Each call is a
//! transaction: `now` is read once, and on any error both the contract and the
//! ledger are put back exactly as they were.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::errors::FarmResult;
use crate::farm::{FarmContract, FarmEvent, Settlement, StakerRecord};
use crate::ledger::{Address, Amount, AssetLedger};
use crate::utils::{current_time, Timestamp};

/// Source of the current timestamp for each transaction
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock seconds since the Unix epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        current_time()
    }
}

/// Settable clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

struct HostState<L> {
    farm: FarmContract,
    ledger: L,
}

/// Serializes and commits farm transactions
pub struct Host<L, C> {
    inner: Mutex<HostState<L>>,
    clock: C,
}

impl<L, C> Host<L, C>
where
    L: AssetLedger + Clone,
    C: Clock,
{
    pub fn new(farm: FarmContract, ledger: L, clock: C) -> Self {
        Self {
            inner: Mutex::new(HostState { farm, ledger }),
            clock,
        }
    }

    /// Run `op` as one all-or-nothing transaction
    pub fn execute<T, F>(&self, op: F) -> FarmResult<T>
    where
        F: FnOnce(&mut FarmContract, &mut L, Timestamp) -> FarmResult<T>,
    {
        let mut guard = self.inner.lock();
        let now = self.clock.now();
        let farm_snapshot = guard.farm.clone();
        let ledger_snapshot = guard.ledger.clone();

        let state = &mut *guard;
        match op(&mut state.farm, &mut state.ledger, now) {
            Ok(value) => {
                debug!("Transaction committed at {}", now);
                Ok(value)
            }
            Err(err) => {
                warn!("Transaction at {} reverted: {}", now, err);
                state.farm = farm_snapshot;
                state.ledger = ledger_snapshot;
                Err(err)
            }
        }
    }

    /// Read-only access to the committed contract and ledger
    pub fn view<T>(&self, f: impl FnOnce(&FarmContract, &L) -> T) -> T {
        let guard = self.inner.lock();
        f(&guard.farm, &guard.ledger)
    }

    /// Like [`Host::view`], with `now` read while the lock is held
    fn view_at<T>(&self, f: impl FnOnce(&FarmContract, &L, Timestamp) -> T) -> T {
        let guard = self.inner.lock();
        let now = self.clock.now();
        f(&guard.farm, &guard.ledger, now)
    }

    /// Direct ledger access for activity outside the farm (minting, approvals)
    pub fn with_ledger<T>(&self, f: impl FnOnce(&mut L) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut guard.ledger)
    }

    pub fn fund_rewards(&self, caller: &Address, amount: Amount) -> FarmResult<()> {
        self.execute(|farm, ledger, now| farm.fund_rewards(ledger, caller, amount, now))
    }

    pub fn deposit(&self, staker: &Address, amount: Amount) -> FarmResult<()> {
        self.execute(|farm, ledger, now| farm.deposit(ledger, staker, amount, now))
    }

    pub fn harvest(&self, staker: &Address) -> FarmResult<Settlement> {
        self.execute(|farm, ledger, now| farm.harvest(ledger, staker, now))
    }

    pub fn pending_reward(&self, staker: &Address) -> FarmResult<Settlement> {
        self.view_at(|farm, ledger, now| farm.pending_reward(ledger, staker, now))
    }

    pub fn balance_of_reward_asset(&self) -> Amount {
        self.view(|farm, ledger| farm.balance_of_reward_asset(ledger))
    }

    pub fn balance_of_stake_asset(&self) -> Amount {
        self.view(|farm, ledger| farm.balance_of_stake_asset(ledger))
    }

    pub fn record_of(&self, staker: &Address) -> StakerRecord {
        self.view(|farm, _| farm.record_of(staker))
    }

    pub fn debt_of(&self, staker: &Address) -> Amount {
        self.view(|farm, _| farm.debt_of(staker))
    }

    pub fn total_debt(&self) -> Amount {
        self.view(|farm, _| farm.total_debt())
    }

    pub fn total_staked(&self) -> Amount {
        self.view(|farm, _| farm.total_staked())
    }

    pub fn check_invariants(&self) -> bool {
        self.view(|farm, _| farm.check_invariants())
    }

    pub fn drain_events(&self) -> Vec<FarmEvent> {
        self.inner.lock().farm.drain_events()
    }
}
