use std::collections::HashMap;

use opset_primitives::{Address, U256};
use opset_service_manager::{Collaborator, CollaboratorError, TokenLedger};
use parking_lot::Mutex;

use crate::failures::FailureInjector;

#[derive(Debug, Default)]
struct Ledger {
    /// `(token, holder) -> balance`
    balances: HashMap<(Address, Address), U256>,

    /// `(token, owner, spender) -> allowance`
    allowances: HashMap<(Address, Address, Address), U256>,
}

/// Token ledger whose mutating calls act as `service`.
///
/// `transfer_from` spends the allowance the sender granted `service`; `approve` sets an allowance
/// granted by `service`.
#[derive(Debug)]
pub struct InMemoryTokenLedger {
    service: Address,
    ledger: Mutex<Ledger>,
    failures: FailureInjector,
}

impl InMemoryTokenLedger {
    pub fn new(service: Address) -> Self {
        Self {
            service,
            ledger: Mutex::new(Ledger::default()),
            failures: FailureInjector::new(Collaborator::TokenLedger),
        }
    }

    pub fn failures(&self) -> &FailureInjector {
        &self.failures
    }

    pub fn mint(&self, token: Address, holder: Address, amount: U256) {
        let mut ledger = self.ledger.lock();
        let balance = ledger.balances.entry((token, holder)).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Sets the allowance `owner` grants `spender`, as if `owner` had approved it.
    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.ledger
            .lock()
            .allowances
            .insert((token, owner, spender), amount);
    }

    pub fn balance(&self, token: Address, holder: Address) -> U256 {
        self.ledger
            .lock()
            .balances
            .get(&(token, holder))
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance_of(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.ledger
            .lock()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn reject(call: &'static str, reason: String) -> CollaboratorError {
        CollaboratorError::new(Collaborator::TokenLedger, call, reason)
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance_of(&self, token: Address, holder: Address) -> Result<U256, CollaboratorError> {
        self.failures.check("balance_of")?;
        Ok(self.balance(token, holder))
    }

    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, CollaboratorError> {
        self.failures.check("allowance")?;
        Ok(self.allowance_of(token, owner, spender))
    }

    fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CollaboratorError> {
        self.failures.check("transfer_from")?;
        let mut ledger = self.ledger.lock();

        let allowance_key = (token, from, self.service);
        let allowance = ledger
            .allowances
            .get(&allowance_key)
            .copied()
            .unwrap_or_default();
        let remaining_allowance = allowance.checked_sub(amount).ok_or_else(|| {
            Self::reject(
                "transfer_from",
                format!("allowance {allowance} below {amount}"),
            )
        })?;

        let balance = ledger
            .balances
            .get(&(token, from))
            .copied()
            .unwrap_or_default();
        let remaining_balance = balance.checked_sub(amount).ok_or_else(|| {
            Self::reject("transfer_from", format!("balance {balance} below {amount}"))
        })?;

        ledger.allowances.insert(allowance_key, remaining_allowance);
        ledger.balances.insert((token, from), remaining_balance);
        let to_balance = ledger.balances.entry((token, to)).or_default();
        *to_balance = to_balance.saturating_add(amount);
        Ok(())
    }

    fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), CollaboratorError> {
        self.failures.check("approve")?;
        self.ledger
            .lock()
            .allowances
            .insert((token, self.service, spender), amount);
        Ok(())
    }
}
