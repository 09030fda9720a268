//! Append-only history of accounts that completed a deposit.
//!
//! One entry per deposit that actually moved funds, repeats included. The
//! log is never trimmed, so its length counts deposit *events*, not
//! distinct depositors.

use depositgate_types::{AccountId, DepositError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolderLog {
    entries: Vec<AccountId>,
}

impl HolderLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries(entries: Vec<AccountId>) -> Self {
        Self { entries }
    }

    pub fn record(&mut self, account: AccountId) {
        self.entries.push(account);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// # Errors
    /// `IndexOutOfRange` if `index >= len()`.
    pub fn get(&self, index: usize) -> Result<AccountId> {
        self.entries
            .get(index)
            .copied()
            .ok_or(DepositError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// How many deposit events `account` has in the log.
    #[must_use]
    pub fn count_for(&self, account: &AccountId) -> usize {
        self.entries.iter().filter(|a| *a == account).count()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AccountId] {
        &self.entries
    }
}
