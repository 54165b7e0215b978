//! Rewards forwarding against an in-memory token ledger.

use opset_primitives::{
    Address, OperatorDirectedRewardsSubmission, OperatorReward, RewardsSubmission,
    StrategyAndMultiplier, U256,
};
use opset_service_manager::{InsufficientResourceError, ServiceEvent, ServiceManagerError};
use opset_test_utils::{
    ArbitraryGenerator, TestHarness, REWARDS_COORDINATOR, REWARDS_INITIATOR, SERVICE,
};

const TOKEN: Address = Address::with_last_byte(0xee);

fn submission(amount: u64) -> RewardsSubmission {
    RewardsSubmission {
        strategies_and_multipliers: vec![StrategyAndMultiplier {
            strategy: Address::with_last_byte(0x51),
            multiplier: 1_000_000_000_000_000_000,
        }],
        token: TOKEN,
        amount: U256::from(amount),
        start_timestamp: 1_700_000_000,
        duration: 604_800,
    }
}

/// Harness where the rewards initiator holds and has approved `funds` of [`TOKEN`].
fn funded(funds: u64) -> TestHarness {
    let harness = TestHarness::empty();
    harness
        .tokens
        .mint(TOKEN, REWARDS_INITIATOR, U256::from(funds));
    harness
        .tokens
        .set_allowance(TOKEN, REWARDS_INITIATOR, SERVICE, U256::from(funds));
    harness
}

#[test]
fn test_rewards_are_taken_into_custody_and_forwarded() {
    let mut harness = funded(1_000);
    // Leftover allowance from an earlier batch must be kept.
    harness
        .tokens
        .set_allowance(TOKEN, SERVICE, REWARDS_COORDINATOR, U256::from(25));

    let batch = vec![submission(100), submission(300)];
    harness
        .manager
        .create_rewards_submission(REWARDS_INITIATOR, &batch)
        .unwrap();

    assert_eq!(
        harness.tokens.balance(TOKEN, REWARDS_INITIATOR),
        U256::from(600)
    );
    assert_eq!(harness.tokens.balance(TOKEN, SERVICE), U256::from(400));
    assert_eq!(
        harness
            .tokens
            .allowance_of(TOKEN, SERVICE, REWARDS_COORDINATOR),
        U256::from(425)
    );
    assert_eq!(harness.rewards.rewards_batches(), vec![batch]);
    assert_eq!(
        harness.events.events(),
        vec![ServiceEvent::RewardsSubmissionsCreated { count: 2 }]
    );
}

#[test]
fn test_underfunded_batch_moves_nothing() {
    let mut harness = funded(350);

    let err = harness
        .manager
        .create_rewards_submission(REWARDS_INITIATOR, &[submission(100), submission(300)])
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceManagerError::InsufficientResource(InsufficientResourceError::Balance { .. })
    ));
    assert_eq!(
        harness.tokens.balance(TOKEN, REWARDS_INITIATOR),
        U256::from(350)
    );
    assert!(harness.rewards.rewards_batches().is_empty());
}

#[test]
fn test_coordinator_rejection_is_reported() {
    let mut harness = funded(1_000);
    harness
        .rewards
        .failures()
        .fail_on("create_rewards_submission");

    let err = harness
        .manager
        .create_rewards_submission(REWARDS_INITIATOR, &[submission(10)])
        .unwrap_err();

    assert!(matches!(err, ServiceManagerError::Collaborator(_)));
    assert!(harness.events.events().is_empty());
}

#[test]
fn test_operator_directed_rewards() {
    let mut harness = funded(1_000);
    let mut arb = ArbitraryGenerator::new_with_size(1 << 12);
    let operators = arb.generate_sorted_addresses(3);

    let submission = OperatorDirectedRewardsSubmission {
        strategies_and_multipliers: vec![],
        token: TOKEN,
        operator_rewards: operators
            .iter()
            .map(|operator| OperatorReward {
                operator: *operator,
                amount: U256::from(50),
            })
            .collect(),
        start_timestamp: 1_700_000_000,
        duration: 604_800,
        description: "performance bonus".to_string(),
    };

    harness
        .manager
        .create_operator_directed_rewards_submission(REWARDS_INITIATOR, &[submission.clone()])
        .unwrap();

    assert_eq!(harness.tokens.balance(TOKEN, SERVICE), U256::from(150));
    assert_eq!(
        harness.rewards.operator_directed_batches(),
        vec![vec![submission]]
    );
}
