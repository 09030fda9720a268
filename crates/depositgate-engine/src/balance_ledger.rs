//! Per-account locked balances and their running aggregate.
//!
//! Mutations are split into a fallible *plan* step that computes the
//! post-state without touching anything, and an infallible *apply* step.
//! The engine runs the external transfer between the two, so a failed
//! transfer simply drops the plan and the ledger is unchanged.

use std::collections::HashMap;

use depositgate_types::{AccountId, Amount, BalanceRecord, DepositError, Result};

/// Post-state for one account, computed by [`BalanceLedger::plan_credit`]
/// or [`BalanceLedger::plan_clear`] and committed by [`BalanceLedger::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a planned update does nothing until applied"]
pub struct BalanceUpdate {
    pub account: AccountId,
    /// Amount moved by this update (credited or released).
    pub delta: Amount,
    /// The account's balance after the update.
    pub balance: Amount,
    /// The aggregate total after the update.
    pub aggregate_total: Amount,
}

/// Locked balance per account plus the aggregate across all accounts.
///
/// Invariant: `aggregate_total == Σ balances`. The aggregate is kept
/// incrementally, never recomputed, so every path that changes a balance
/// goes through [`BalanceLedger::apply`].
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    /// Non-zero balances only; absent means zero.
    balances: HashMap<AccountId, Amount>,
    aggregate_total: Amount,
}

impl BalanceLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records.
    ///
    /// # Errors
    /// `InvariantViolation` on duplicate accounts; `BalanceOverflow` if the
    /// records cannot be summed.
    pub fn from_records(records: &[BalanceRecord]) -> Result<Self> {
        let mut ledger = Self::new();
        for record in records {
            if ledger.balances.contains_key(&record.account) {
                return Err(DepositError::InvariantViolation {
                    reason: format!("duplicate balance record for {}", record.account),
                });
            }
            if record.amount == 0 {
                continue;
            }
            let update = ledger.plan_credit(record.account, record.amount)?;
            ledger.apply(update);
        }
        Ok(ledger)
    }

    /// Locked balance of `account` (zero if never seen).
    #[must_use]
    pub fn balance(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all balances, as maintained incrementally.
    #[must_use]
    pub fn aggregate_total(&self) -> Amount {
        self.aggregate_total
    }

    /// Number of accounts with a non-zero balance.
    #[must_use]
    pub fn funded_accounts(&self) -> usize {
        self.balances.len()
    }

    /// Plan adding `amount` to `account`.
    ///
    /// # Errors
    /// `BalanceOverflow` if the balance or the aggregate would overflow.
    pub fn plan_credit(&self, account: AccountId, amount: Amount) -> Result<BalanceUpdate> {
        let overflow = || DepositError::BalanceOverflow { account };
        let balance = self.balance(&account).checked_add(amount).ok_or_else(overflow)?;
        let aggregate_total = self.aggregate_total.checked_add(amount).ok_or_else(overflow)?;
        Ok(BalanceUpdate {
            account,
            delta: amount,
            balance,
            aggregate_total,
        })
    }

    /// Plan zeroing `account`'s balance.
    ///
    /// # Errors
    /// `NothingToRelease` if the balance is already zero.
    pub fn plan_clear(&self, account: AccountId) -> Result<BalanceUpdate> {
        let amount = self.balance(&account);
        if amount == 0 {
            return Err(DepositError::NothingToRelease { account });
        }
        let aggregate_total =
            self.aggregate_total
                .checked_sub(amount)
                .ok_or_else(|| DepositError::InvariantViolation {
                    reason: format!(
                        "aggregate {} is below the balance {amount} of {account}",
                        self.aggregate_total
                    ),
                })?;
        Ok(BalanceUpdate {
            account,
            delta: amount,
            balance: 0,
            aggregate_total,
        })
    }

    /// Commit a planned update.
    ///
    /// Plans are computed against the current state, so a plan must be
    /// applied before any other mutation of this ledger.
    pub fn apply(&mut self, update: BalanceUpdate) {
        if update.balance == 0 {
            self.balances.remove(&update.account);
        } else {
            self.balances.insert(update.account, update.balance);
        }
        self.aggregate_total = update.aggregate_total;
    }

    /// Recompute `Σ balances` and compare with the maintained aggregate.
    ///
    /// # Errors
    /// `InvariantViolation` if they differ or the sum overflows.
    pub fn verify(&self) -> Result<()> {
        let recomputed = self
            .balances
            .values()
            .try_fold(0 as Amount, |acc, amount| acc.checked_add(*amount));
        match recomputed {
            Some(sum) if sum == self.aggregate_total => Ok(()),
            Some(sum) => Err(DepositError::InvariantViolation {
                reason: format!(
                    "aggregate total {} != sum of balances {sum}",
                    self.aggregate_total
                ),
            }),
            None => Err(DepositError::InvariantViolation {
                reason: "sum of balances overflows".to_string(),
            }),
        }
    }

    /// All non-zero balances, sorted by account.
    #[must_use]
    pub fn records(&self) -> Vec<BalanceRecord> {
        let mut records: Vec<BalanceRecord> = self
            .balances
            .iter()
            .map(|(account, amount)| BalanceRecord {
                account: *account,
                amount: *amount,
            })
            .collect();
        records.sort_by_key(|r| r.account);
        records
    }
}
