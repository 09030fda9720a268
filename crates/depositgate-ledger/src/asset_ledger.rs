//! The external asset ledger capability.

use depositgate_types::{AccountId, Amount, LedgerError, LedgerId};

/// A fungible-asset ledger on which the engine holds a custody account.
///
/// Implementations must make `pull` and `push` all-or-nothing: on `Err`
/// no balance or allowance may have changed. The engine relies on this to
/// keep its own bookkeeping in step with the ledger.
pub trait AssetLedger {
    /// Identity of this ledger (the asset's address).
    fn ledger_id(&self) -> LedgerId;

    /// The engine's own account on this ledger.
    fn custody_account(&self) -> AccountId;

    /// Current holdings of `account`.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// How much `owner` currently lets the custody account pull.
    fn approved_amount(&self, owner: &AccountId) -> Amount;

    /// Move `amount` from `owner` into custody, consuming that much approval.
    ///
    /// # Errors
    /// `InsufficientAllowance` or `InsufficientBalance`.
    fn pull(&mut self, owner: &AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` out of custody to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance` if custody holds less than `amount`.
    fn push(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError>;

    /// Everything the custody account holds right now.
    fn custody_balance(&self) -> Amount {
        self.balance_of(&self.custody_account())
    }
}

impl<L: AssetLedger + ?Sized> AssetLedger for Box<L> {
    fn ledger_id(&self) -> LedgerId {
        (**self).ledger_id()
    }

    fn custody_account(&self) -> AccountId {
        (**self).custody_account()
    }

    fn balance_of(&self, account: &AccountId) -> Amount {
        (**self).balance_of(account)
    }

    fn approved_amount(&self, owner: &AccountId) -> Amount {
        (**self).approved_amount(owner)
    }

    fn pull(&mut self, owner: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        (**self).pull(owner, amount)
    }

    fn push(&mut self, to: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        (**self).push(to, amount)
    }

    fn custody_balance(&self) -> Amount {
        (**self).custody_balance()
    }
}
