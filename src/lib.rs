pub mod config;
pub mod errors;
pub mod farm;
pub mod ledger;
pub mod runtime;
pub mod utils;

// Re-export commonly used items
pub use crate::config::{ConfigValidationError, FarmConfig};
pub use errors::{FarmError, FarmResult, LedgerError, LedgerResult};
pub use farm::{
    compute_reward, DepositPolicy, FarmContract, FarmEvent, PoolState, Settlement, StakerRecord,
};
pub use ledger::{Address, Amount, AssetId, AssetLedger, MemoryLedger};
pub use runtime::{Clock, Host, ManualClock, SystemClock};
pub use utils::Timestamp;
