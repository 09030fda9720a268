//! In-memory mintable token ledger.
//!
//! Tracks per-account balances and per-(owner, spender) allowances, like an
//! ERC-20 token with an open `mint`. All mutations are atomic: either the
//! full transfer succeeds or balances and allowances are unchanged.

use std::collections::HashMap;

use depositgate_types::{AccountId, Amount, LedgerError, LedgerId};

use crate::AssetLedger;

/// Which custody-facing call a failure is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    Pull,
    Push,
}

/// A mintable token ledger held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryLedger {
    id: LedgerId,
    /// The engine's account on this token.
    custody: AccountId,
    balances: HashMap<AccountId, Amount>,
    /// `(owner, spender) → remaining allowance`.
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
    /// Next call of this kind fails with `Unavailable`.
    injected_failure: Option<LedgerOp>,
}

impl InMemoryLedger {
    /// Create an empty ledger whose custody account is `custody`.
    #[must_use]
    pub fn new(id: LedgerId, custody: AccountId) -> Self {
        Self {
            id,
            custody,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            injected_failure: None,
        }
    }

    /// Create new tokens in `to`'s balance.
    ///
    /// # Errors
    /// `Overflow` if the balance or total supply would overflow.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;
        let balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;

        self.balances.insert(to, balance);
        self.total_supply = supply;
        tracing::debug!(ledger = %self.id, to = %to, amount, "Minted");
        Ok(())
    }

    /// Set (not add to) the amount `spender` may move out of `owner`.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Shorthand for approving this ledger's custody account.
    pub fn approve_custody(&mut self, owner: AccountId, amount: Amount) {
        self.approve(owner, self.custody, amount);
    }

    /// Remaining allowance from `owner` to `spender`.
    #[must_use]
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`;
    /// `Overflow` if `to` cannot receive it.
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let from_balance = self.balance(&from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: from,
                needed: amount,
                available: from_balance,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { account: to })?;

        self.set_balance(from, from_balance - amount);
        self.set_balance(to, to_balance);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on `spender`'s authority.
    ///
    /// # Errors
    /// `InsufficientAllowance` first, then anything [`Self::transfer`] returns.
    pub fn transfer_from(
        &mut self,
        spender: AccountId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let approved = self.allowance(&from, &spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: from,
                needed: amount,
                approved,
            });
        }
        self.transfer(from, to, amount)?;
        self.approve(from, spender, approved - amount);
        Ok(())
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, account: AccountId, amount: Amount) {
        if amount == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
    }

    fn take_injected_failure(&mut self, op: LedgerOp) -> Result<(), LedgerError> {
        if self.injected_failure == Some(op) {
            self.injected_failure = None;
            return Err(LedgerError::Unavailable {
                ledger: self.id,
                reason: format!("injected {op:?} failure"),
            });
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl InMemoryLedger {
    /// Make the next `pull` or `push` fail with `Unavailable` without
    /// touching any balance. **Testing only.**
    pub fn fail_next(&mut self, op: LedgerOp) {
        self.injected_failure = Some(op);
    }

    /// Drop a pending injected failure, if any.
    pub fn clear_injected_failure(&mut self) {
        self.injected_failure = None;
    }
}

impl AssetLedger for InMemoryLedger {
    fn ledger_id(&self) -> LedgerId {
        self.id
    }

    fn custody_account(&self) -> AccountId {
        self.custody
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balance(account)
    }

    fn approved_amount(&self, owner: &AccountId) -> Amount {
        self.allowance(owner, &self.custody)
    }

    fn pull(&mut self, owner: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.take_injected_failure(LedgerOp::Pull)?;
        self.transfer_from(self.custody, *owner, self.custody, amount)
    }

    fn push(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        self.take_injected_failure(LedgerOp::Push)?;
        self.transfer(self.custody, *to, amount)
    }
}
