
use crate::config::FarmConfig;
use crate::farm::{DepositPolicy, FarmContract};
use crate::ledger::{Address, Amount, AssetId, AssetLedger, MemoryLedger};
use crate::utils::Timestamp;

pub const REWARD_RATE: Amount = 200;
pub const START: Timestamp = 1_700_000_000;
const OWNER_SUPPLY: Amount = 10_000_000;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A farm plus a ledger where the owner holds reward asset approved for the pool
pub struct Fixture {
    pub farm: FarmContract,
    pub ledger: MemoryLedger,
    pub owner: Address,
    pub pool: Address,
    pub reward: AssetId,
    pub stake: AssetId,
}

impl Fixture {
    pub fn new(reward_rate: Amount) -> Self {
        Self::with_policy(reward_rate, DepositPolicy::default())
    }

    pub fn with_policy(reward_rate: Amount, policy: DepositPolicy) -> Self {
        init_logging();
        let owner = Address::derive(b"governor");
        let pool = Address::derive(b"farm-pool");
        let reward = AssetId::new("A");
        let stake = AssetId::new("B");

        let config = FarmConfig::new(owner, pool, reward.clone(), stake.clone(), reward_rate)
            .with_deposit_policy(policy);
        let farm = FarmContract::new(config).unwrap();

        let mut ledger = MemoryLedger::new();
        ledger.mint(&reward, &owner, OWNER_SUPPLY).unwrap();
        ledger.approve(&reward, &owner, &pool, OWNER_SUPPLY);

        Self {
            farm,
            ledger,
            owner,
            pool,
            reward,
            stake,
        }
    }

    /// A staker holding `balance` stake asset, all of it approved for the pool
    pub fn staker(&mut self, seed: &[u8], balance: Amount) -> Address {
        let staker = Address::derive(seed);
        self.ledger.mint(&self.stake, &staker, balance).unwrap();
        self.ledger.approve(&self.stake, &staker, &self.pool, balance);
        staker
    }

    pub fn fund(&mut self, amount: Amount) {
        let owner = self.owner;
        self.farm
            .fund_rewards(&mut self.ledger, &owner, amount, START)
            .unwrap();
    }

    pub fn reward_balance(&self, holder: &Address) -> Amount {
        self.ledger.balance_of(&self.reward, holder)
    }

    pub fn stake_balance(&self, holder: &Address) -> Amount {
        self.ledger.balance_of(&self.stake, holder)
    }
}
