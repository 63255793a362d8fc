use std::sync::Arc;
use std::thread;

use yield_farm_core::{
    Address, Amount, AssetId, AssetLedger, FarmConfig, FarmContract, FarmError, FarmEvent, Host,
    ManualClock, MemoryLedger,
};

const REWARD_RATE: Amount = 200;
const FUNDING: Amount = 50_000;

struct Farm {
    host: Host<MemoryLedger, ManualClock>,
    clock: ManualClock,
    governor: Address,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn reward_asset() -> AssetId {
    AssetId::new("A")
}

fn stake_asset() -> AssetId {
    AssetId::new("B")
}

// Governor holds 10^6 A approved for the pool; each seed gets `stake` B approved
fn setup(stakers: &[(&str, Amount)]) -> (Farm, Vec<Address>) {
    init_logging();
    let governor = Address::derive(b"governor");
    let pool = Address::derive(b"farm-contract");

    let mut ledger = MemoryLedger::new();
    ledger.mint(&reward_asset(), &governor, 1_000_000).unwrap();
    ledger.approve(&reward_asset(), &governor, &pool, 1_000_000);

    let addresses = stakers
        .iter()
        .map(|(seed, stake)| {
            let staker = Address::derive(seed.as_bytes());
            ledger.mint(&stake_asset(), &staker, *stake).unwrap();
            ledger.approve(&stake_asset(), &staker, &pool, *stake);
            staker
        })
        .collect();

    let config = FarmConfig::new(governor, pool, reward_asset(), stake_asset(), REWARD_RATE);
    let clock = ManualClock::new(1_700_000_000);
    let host = Host::new(FarmContract::new(config).unwrap(), ledger, clock.clone());
    (
        Farm {
            host,
            clock,
            governor,
        },
        addresses,
    )
}

#[test]
fn test_full_reward_single_staker() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    farm.host.fund_rewards(&farm.governor, FUNDING).unwrap();
    farm.host.deposit(&bob, 100).unwrap();
    farm.clock.advance(25);
    farm.host.harvest(&bob).unwrap();

    assert_eq!(farm.host.balance_of_reward_asset(), FUNDING - 25 * REWARD_RATE);
    assert_eq!(farm.host.balance_of_stake_asset(), 0);
    assert_eq!(farm.host.debt_of(&bob), 0);
    assert_eq!(farm.host.record_of(&bob).amount, 0);
    farm.host.with_ledger(|ledger| {
        assert_eq!(ledger.balance_of(&reward_asset(), &bob), 5_000);
        assert_eq!(ledger.balance_of(&stake_asset(), &bob), 100);
    });
}

#[test]
fn test_overdrawn_pool_books_debt() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    farm.host.fund_rewards(&farm.governor, FUNDING).unwrap();
    farm.host.deposit(&bob, 100).unwrap();
    farm.clock.advance(50_000);
    let settlement = farm.host.harvest(&bob).unwrap();

    let raw_reward = 50_000 * REWARD_RATE;
    assert_eq!(settlement.reward, raw_reward);
    assert_eq!(farm.host.balance_of_reward_asset(), 0);
    assert_eq!(farm.host.balance_of_stake_asset(), 0);
    assert!(farm.host.total_debt() > 0);
    assert_eq!(farm.host.total_debt(), raw_reward - FUNDING);
    farm.host.with_ledger(|ledger| {
        assert_eq!(ledger.balance_of(&stake_asset(), &bob), 100);
    });
}

#[test]
fn test_two_stakers_share_at_harvest() {
    let (farm, stakers) = setup(&[("alice", 100), ("bob", 300)]);
    let (alice, bob) = (stakers[0], stakers[1]);

    farm.host.fund_rewards(&farm.governor, FUNDING).unwrap();
    farm.host.deposit(&alice, 100).unwrap();
    farm.clock.advance(25);
    farm.host.deposit(&bob, 300).unwrap();
    farm.clock.advance(25);
    let settlement = farm.host.harvest(&alice).unwrap();

    assert_eq!(settlement.reward, 2_500);
    assert_eq!(farm.host.balance_of_reward_asset(), FUNDING - 2_500);
    assert_eq!(farm.host.total_staked(), 300);
}

#[test]
fn test_tiny_share_gets_minimum_payout() {
    let (farm, stakers) = setup(&[("alice", 100), ("whale", 1_000_000)]);
    let (alice, whale) = (stakers[0], stakers[1]);

    farm.host.fund_rewards(&farm.governor, FUNDING).unwrap();
    farm.host.deposit(&alice, 100).unwrap();
    farm.clock.advance(25);
    farm.host.deposit(&whale, 1_000_000).unwrap();
    farm.clock.advance(25);
    let settlement = farm.host.harvest(&alice).unwrap();

    assert_eq!(settlement.reward, 1);
    assert_eq!(farm.host.balance_of_reward_asset(), FUNDING - 1);
}

#[test]
fn test_zero_deposit_rejected() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    assert_eq!(farm.host.deposit(&bob, 0), Err(FarmError::InvalidAmount));
    farm.host.fund_rewards(&farm.governor, FUNDING).unwrap();
    assert_eq!(farm.host.deposit(&bob, 0), Err(FarmError::InvalidAmount));
}

#[test]
fn test_funding_by_non_owner_rejected() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    let result = farm.host.fund_rewards(&bob, 100);

    assert_eq!(result, Err(FarmError::Unauthorized { caller: bob }));
    assert_eq!(farm.host.balance_of_reward_asset(), 0);
    assert_eq!(farm.host.total_staked(), 0);
    assert_eq!(farm.host.total_debt(), 0);
    assert!(farm.host.drain_events().is_empty());
}

#[test]
fn test_deposit_before_funding_rejected() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    let result = farm.host.deposit(&bob, 100);
    assert!(matches!(result, Err(FarmError::RewardUnavailable { .. })));
    assert_eq!(farm.host.balance_of_stake_asset(), 0);
}

#[test]
fn test_double_harvest_in_same_block() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    farm.host.fund_rewards(&farm.governor, FUNDING).unwrap();
    farm.host.deposit(&bob, 100).unwrap();
    farm.clock.advance(25);

    farm.host.harvest(&bob).unwrap();
    assert_eq!(
        farm.host.harvest(&bob),
        Err(FarmError::NoActiveStake { staker: bob })
    );
    assert_eq!(farm.host.balance_of_reward_asset(), FUNDING - 5_000);
}

#[test]
fn test_event_log_through_host() {
    let (farm, stakers) = setup(&[("bob", 100)]);
    let bob = stakers[0];

    farm.host.fund_rewards(&farm.governor, 300).unwrap();
    farm.host.deposit(&bob, 100).unwrap();
    farm.clock.advance(2);
    farm.host.harvest(&bob).unwrap();

    let events = farm.host.drain_events();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[2], FarmEvent::Harvested { paid: 300, reward: 400, .. }));
    assert!(matches!(events[3], FarmEvent::DebtRecorded { shortfall: 100, .. }));

    let json = serde_json::to_string(&events[3]).unwrap();
    assert!(json.contains("\"event\":\"debt_recorded\""));
}

#[test]
fn test_concurrent_stakers_are_serialized() {
    let seeds: Vec<String> = (0..8).map(|i| format!("staker-{}", i)).collect();
    let specs: Vec<(&str, Amount)> = seeds.iter().map(|s| (s.as_str(), 500)).collect();
    let (farm, stakers) = setup(&specs);
    farm.host.fund_rewards(&farm.governor, 1_000_000).unwrap();

    let host = Arc::new(farm.host);
    let handles: Vec<_> = stakers
        .iter()
        .copied()
        .map(|staker| {
            let host = Arc::clone(&host);
            thread::spawn(move || {
                host.deposit(&staker, 500).unwrap();
                host.harvest(&staker).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(host.check_invariants());
    assert_eq!(host.total_staked(), 0);
    assert_eq!(host.balance_of_stake_asset(), 0);
    assert_eq!(host.total_debt(), 0);
    for staker in &stakers {
        assert_eq!(host.record_of(staker).amount, 0);
    }
}
