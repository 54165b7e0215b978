//! Custody and forwarding of rewards submissions.
//!
//! The rewards initiator funds each submission. The forwarder pulls the funds into the service's
//! custody, raises the rewards coordinator's allowance on top of whatever it already had and then
//! hands the whole batch to the coordinator, which pulls the tokens itself.
//!
//! Token movements cannot be undone by the service, so the whole batch is checked against the
//! caller's balances and allowances before the first transfer.

use std::{collections::BTreeMap, fmt};

use opset_primitives::{Address, OperatorDirectedRewardsSubmission, RewardsSubmission, U256};
use tracing::*;

use crate::{
    errors::{InsufficientResourceError, MalformedInputError, ServiceManagerError},
    traits::{RewardsCoordinator, TokenLedger},
};

/// Token and amount a single submission takes into custody.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Custody {
    token: Address,
    amount: U256,
}

pub struct RewardsForwarder<'a> {
    /// Address the service holds custody under.
    service: Address,
    tokens: &'a dyn TokenLedger,
    coordinator: &'a dyn RewardsCoordinator,
}

impl fmt::Debug for RewardsForwarder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewardsForwarder")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl<'a> RewardsForwarder<'a> {
    pub fn new(
        service: Address,
        tokens: &'a dyn TokenLedger,
        coordinator: &'a dyn RewardsCoordinator,
    ) -> Self {
        Self {
            service,
            tokens,
            coordinator,
        }
    }

    /// Funds and forwards a batch of stake-proportional rewards submissions.
    #[instrument(skip_all, fields(component = "rewards", %caller, submissions = batch.len()))]
    pub fn create_rewards_submission(
        &self,
        caller: Address,
        batch: &[RewardsSubmission],
    ) -> Result<(), ServiceManagerError> {
        let custody = batch
            .iter()
            .map(|s| (s.token, Some(s.amount)))
            .collect::<Vec<_>>();
        self.take_custody(caller, &custody)?;

        self.coordinator.create_rewards_submission(batch)?;
        info!("forwarded rewards submissions");
        Ok(())
    }

    /// Funds and forwards a batch of operator-directed rewards submissions.
    ///
    /// Each submission is funded with the sum of its operator rewards.
    #[instrument(skip_all, fields(component = "rewards", %caller, submissions = batch.len()))]
    pub fn create_operator_directed_rewards_submission(
        &self,
        caller: Address,
        batch: &[OperatorDirectedRewardsSubmission],
    ) -> Result<(), ServiceManagerError> {
        let custody = batch
            .iter()
            .map(|s| (s.token, s.total_amount()))
            .collect::<Vec<_>>();
        self.take_custody(caller, &custody)?;

        self.coordinator
            .create_operator_directed_rewards_submission(batch)?;
        info!("forwarded operator-directed rewards submissions");
        Ok(())
    }

    /// Validates the batch, then moves every amount into custody and approves it onward.
    ///
    /// A `None` amount marks a submission whose total overflowed.
    fn take_custody(
        &self,
        caller: Address,
        amounts: &[(Address, Option<U256>)],
    ) -> Result<(), ServiceManagerError> {
        let custody = validate_amounts(amounts)?;
        self.check_funding(caller, &custody)?;

        let spender = self.coordinator.address();
        for Custody { token, amount } in custody {
            self.tokens
                .transfer_from(token, caller, self.service, amount)
                .map_err(|e| InsufficientResourceError::Transfer {
                    token,
                    amount,
                    reason: e.reason,
                })?;

            let current = self.tokens.allowance(token, self.service, spender)?;
            let raised = current
                .checked_add(amount)
                .ok_or(InsufficientResourceError::AllowanceOverflow { token })?;
            self.tokens
                .approve(token, spender, raised)
                .map_err(|e| InsufficientResourceError::Approval {
                    token,
                    amount,
                    reason: e.reason,
                })?;

            debug!(%token, %amount, allowance = %raised, "took rewards into custody");
        }
        Ok(())
    }

    /// Checks that the caller can cover every token the batch needs.
    fn check_funding(
        &self,
        caller: Address,
        custody: &[Custody],
    ) -> Result<(), ServiceManagerError> {
        for (token, required) in totals_per_token(custody)? {
            let balance = self.tokens.balance_of(token, caller)?;
            if balance < required {
                return Err(InsufficientResourceError::Balance {
                    token,
                    available: balance,
                    required,
                }
                .into());
            }

            let allowance = self.tokens.allowance(token, caller, self.service)?;
            if allowance < required {
                return Err(InsufficientResourceError::Allowance {
                    token,
                    available: allowance,
                    required,
                }
                .into());
            }
        }
        Ok(())
    }
}

fn validate_amounts(
    amounts: &[(Address, Option<U256>)],
) -> Result<Vec<Custody>, MalformedInputError> {
    if amounts.is_empty() {
        return Err(MalformedInputError::EmptyBatch);
    }

    amounts
        .iter()
        .enumerate()
        .map(|(index, (token, amount))| match amount {
            None => Err(MalformedInputError::AmountOverflow { index }),
            Some(amount) if amount.is_zero() => Err(MalformedInputError::ZeroAmount { index }),
            Some(amount) => Ok(Custody {
                token: *token,
                amount: *amount,
            }),
        })
        .collect()
}

fn totals_per_token(custody: &[Custody]) -> Result<BTreeMap<Address, U256>, MalformedInputError> {
    let mut totals: BTreeMap<Address, U256> = BTreeMap::new();
    for (index, c) in custody.iter().enumerate() {
        let total = totals.entry(c.token).or_default();
        *total = total
            .checked_add(c.amount)
            .ok_or(MalformedInputError::AmountOverflow { index })?;
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use opset_primitives::{OperatorReward, StrategyAndMultiplier};

    use super::*;
    use crate::traits::{Collaborator, CollaboratorError, MockRewardsCoordinator, MockTokenLedger};

    const SERVICE: Address = Address::with_last_byte(0x5e);
    const CALLER: Address = Address::with_last_byte(0xca);
    const COORDINATOR: Address = Address::with_last_byte(0xc0);
    const TOKEN_A: Address = Address::with_last_byte(0xa0);
    const TOKEN_B: Address = Address::with_last_byte(0xb0);

    fn submission(token: Address, amount: u64) -> RewardsSubmission {
        RewardsSubmission {
            strategies_and_multipliers: vec![StrategyAndMultiplier {
                strategy: Address::with_last_byte(1),
                multiplier: 1,
            }],
            token,
            amount: U256::from(amount),
            start_timestamp: 0,
            duration: 86_400,
        }
    }

    fn coordinator() -> MockRewardsCoordinator {
        let mut coordinator = MockRewardsCoordinator::new();
        coordinator.expect_address().return_const(COORDINATOR);
        coordinator
    }

    /// Ledger where the caller has `funds` of every token and has approved all of it.
    fn funded_ledger(funds: u64) -> MockTokenLedger {
        let mut tokens = MockTokenLedger::new();
        tokens
            .expect_balance_of()
            .with(mockall::predicate::always(), eq(CALLER))
            .returning(move |_, _| Ok(U256::from(funds)));
        tokens
            .expect_allowance()
            .with(mockall::predicate::always(), eq(CALLER), eq(SERVICE))
            .returning(move |_, _, _| Ok(U256::from(funds)));
        tokens
    }

    #[test]
    fn test_allowance_is_raised_on_top_of_existing() {
        let mut tokens = funded_ledger(1_000);
        tokens
            .expect_transfer_from()
            .with(eq(TOKEN_A), eq(CALLER), eq(SERVICE), eq(U256::from(100)))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        tokens
            .expect_allowance()
            .with(eq(TOKEN_A), eq(SERVICE), eq(COORDINATOR))
            .times(1)
            .returning(|_, _, _| Ok(U256::from(50)));
        tokens
            .expect_approve()
            .with(eq(TOKEN_A), eq(COORDINATOR), eq(U256::from(150)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut coordinator = coordinator();
        coordinator
            .expect_create_rewards_submission()
            .withf(|batch| batch.len() == 1)
            .times(1)
            .returning(|_| Ok(()));

        RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_rewards_submission(CALLER, &[submission(TOKEN_A, 100)])
            .unwrap();
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let tokens = MockTokenLedger::new();
        let mut coordinator = coordinator();
        coordinator.expect_create_rewards_submission().never();

        let err = RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_rewards_submission(CALLER, &[])
            .unwrap_err();
        assert_eq!(
            err,
            ServiceManagerError::MalformedInput(MalformedInputError::EmptyBatch)
        );
    }

    #[test]
    fn test_zero_amount_is_rejected_before_any_transfer() {
        let mut tokens = MockTokenLedger::new();
        tokens.expect_transfer_from().never();
        let coordinator = coordinator();

        let batch = [submission(TOKEN_A, 10), submission(TOKEN_B, 0)];
        let err = RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_rewards_submission(CALLER, &batch)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceManagerError::MalformedInput(MalformedInputError::ZeroAmount { index: 1 })
        );
    }

    #[test]
    fn test_balance_is_checked_against_token_total() {
        // 60 + 60 of the same token exceeds a balance of 100 even though each fits.
        let mut tokens = funded_ledger(100);
        tokens.expect_transfer_from().never();
        let coordinator = coordinator();

        let batch = [submission(TOKEN_A, 60), submission(TOKEN_A, 60)];
        let err = RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_rewards_submission(CALLER, &batch)
            .unwrap_err();
        assert_eq!(
            err,
            ServiceManagerError::InsufficientResource(InsufficientResourceError::Balance {
                token: TOKEN_A,
                available: U256::from(100),
                required: U256::from(120),
            })
        );
    }

    #[test]
    fn test_missing_allowance_is_rejected() {
        let mut tokens = MockTokenLedger::new();
        tokens
            .expect_balance_of()
            .returning(|_, _| Ok(U256::from(1_000)));
        tokens
            .expect_allowance()
            .returning(|_, _, _| Ok(U256::from(10)));
        tokens.expect_transfer_from().never();
        let coordinator = coordinator();

        let err = RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_rewards_submission(CALLER, &[submission(TOKEN_A, 50)])
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceManagerError::InsufficientResource(InsufficientResourceError::Allowance { .. })
        ));
    }

    #[test]
    fn test_failed_transfer_aborts_without_forwarding() {
        let mut tokens = funded_ledger(1_000);
        tokens.expect_transfer_from().returning(|_, _, _, _| {
            Err(CollaboratorError::new(
                Collaborator::TokenLedger,
                "transfer_from",
                "paused",
            ))
        });
        tokens.expect_approve().never();

        let mut coordinator = coordinator();
        coordinator.expect_create_rewards_submission().never();

        let err = RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_rewards_submission(CALLER, &[submission(TOKEN_A, 5)])
            .unwrap_err();
        assert_eq!(
            err,
            ServiceManagerError::InsufficientResource(InsufficientResourceError::Transfer {
                token: TOKEN_A,
                amount: U256::from(5),
                reason: "paused".to_string(),
            })
        );
    }

    #[test]
    fn test_operator_directed_custody_is_sum_of_rewards() {
        let mut tokens = funded_ledger(1_000);
        tokens
            .expect_transfer_from()
            .with(eq(TOKEN_B), eq(CALLER), eq(SERVICE), eq(U256::from(30)))
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        tokens
            .expect_allowance()
            .with(eq(TOKEN_B), eq(SERVICE), eq(COORDINATOR))
            .returning(|_, _, _| Ok(U256::ZERO));
        tokens
            .expect_approve()
            .with(eq(TOKEN_B), eq(COORDINATOR), eq(U256::from(30)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut coordinator = coordinator();
        coordinator
            .expect_create_operator_directed_rewards_submission()
            .times(1)
            .returning(|_| Ok(()));

        let submission = OperatorDirectedRewardsSubmission {
            strategies_and_multipliers: vec![],
            token: TOKEN_B,
            operator_rewards: vec![
                OperatorReward {
                    operator: Address::with_last_byte(1),
                    amount: U256::from(10),
                },
                OperatorReward {
                    operator: Address::with_last_byte(2),
                    amount: U256::from(20),
                },
            ],
            start_timestamp: 0,
            duration: 86_400,
            description: "epoch 1".to_string(),
        };

        RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_operator_directed_rewards_submission(CALLER, &[submission])
            .unwrap();
    }

    #[test]
    fn test_overflowing_operator_rewards_are_rejected() {
        let tokens = MockTokenLedger::new();
        let coordinator = coordinator();

        let submission = OperatorDirectedRewardsSubmission {
            strategies_and_multipliers: vec![],
            token: TOKEN_A,
            operator_rewards: vec![
                OperatorReward {
                    operator: Address::with_last_byte(1),
                    amount: U256::MAX,
                },
                OperatorReward {
                    operator: Address::with_last_byte(2),
                    amount: U256::from(1),
                },
            ],
            start_timestamp: 0,
            duration: 1,
            description: String::new(),
        };

        let err = RewardsForwarder::new(SERVICE, &tokens, &coordinator)
            .create_operator_directed_rewards_submission(CALLER, &[submission])
            .unwrap_err();
        assert_eq!(
            err,
            ServiceManagerError::MalformedInput(MalformedInputError::AmountOverflow { index: 0 })
        );
    }
}
