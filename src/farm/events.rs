use serde::{Deserialize, Serialize};

use crate::ledger::{Address, Amount};
use crate::utils::Timestamp;

/// Observable outcome of a successful farm operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FarmEvent {
    RewardsFunded {
        funder: Address,
        amount: Amount,
        at: Timestamp,
    },
    Deposited {
        staker: Address,
        amount: Amount,
        at: Timestamp,
    },
    /// `paid` may be zero when the pool is empty; `principal` is always the full stake
    Harvested {
        staker: Address,
        reward: Amount,
        paid: Amount,
        principal: Amount,
        at: Timestamp,
    },
    DebtRecorded {
        staker: Address,
        shortfall: Amount,
        total_debt: Amount,
        at: Timestamp,
    },
}

impl FarmEvent {
    pub fn timestamp(&self) -> Timestamp {
        match self {
            FarmEvent::RewardsFunded { at, .. }
            | FarmEvent::Deposited { at, .. }
            | FarmEvent::Harvested { at, .. }
            | FarmEvent::DebtRecorded { at, .. } => *at,
        }
    }
}
