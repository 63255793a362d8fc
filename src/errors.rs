use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::ledger::{Address, Amount, AssetId};

/// Failures reported by an asset ledger. A failed call has moved nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient {asset} balance: have {have}, need {need}")]
    InsufficientBalance { asset: AssetId, have: Amount, need: Amount },

    #[error("Insufficient {asset} allowance: have {have}, need {need}")]
    InsufficientAllowance { asset: AssetId, have: Amount, need: Amount },

    #[error("Zero amount not allowed")]
    ZeroAmount,

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Errors surfaced by farm operations. Every one of them aborts the
/// operation with no state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FarmError {
    #[error("Caller {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("Amount must be more than zero")]
    InvalidAmount,

    #[error("Reward is not available: pool holds {balance}, needs at least {required}")]
    RewardUnavailable { balance: Amount, required: Amount },

    #[error("Staker {staker} already has an open position")]
    AlreadyStaked { staker: Address },

    #[error("Pool account {pool} cannot stake in itself")]
    PoolSelfStake { pool: Address },

    #[error("Staker {staker} has nothing staked")]
    NoActiveStake { staker: Address },

    #[error("Asset transfer failed: {0}")]
    TransferFailure(#[from] LedgerError),

    #[error("Reward arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigValidationError),

    #[error("State serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FarmError {
    fn from(err: serde_json::Error) -> Self {
        FarmError::Serialization(err.to_string())
    }
}

/// Result type for farm operations
pub type FarmResult<T> = Result<T, FarmError>;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
