//! Serializable engine state.
//!
//! A snapshot carries everything needed to rebuild an engine under a newer
//! implementation: configuration, per-account balances, the aggregate, and
//! the holder log. The audit journal is not part of it.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, DepositError, LedgerId, Result, ThresholdPolicy, constants};

/// One non-zero balance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub account: AccountId,
    pub amount: Amount,
}

/// Point-in-time copy of an engine's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub format_version: u32,
    pub administrator: AccountId,
    pub asset_ledger: LedgerId,
    pub threshold: Amount,
    pub threshold_policy: ThresholdPolicy,
    /// Sorted by account, zero balances omitted.
    pub balances: Vec<BalanceRecord>,
    pub aggregate_total: Amount,
    pub holders: Vec<AccountId>,
}

impl EngineSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check the snapshot is internally consistent.
    ///
    /// # Errors
    /// - `Configuration` for an unknown format version
    /// - `InvariantViolation` for duplicate accounts, or when the balances do
    ///   not sum to `aggregate_total`
    pub fn validate(&self) -> Result<()> {
        if self.format_version != constants::SNAPSHOT_FORMAT_VERSION {
            return Err(DepositError::Configuration(format!(
                "unsupported snapshot format version {} (expected {})",
                self.format_version,
                constants::SNAPSHOT_FORMAT_VERSION
            )));
        }

        let mut seen = std::collections::HashSet::with_capacity(self.balances.len());
        let mut sum: Amount = 0;
        for record in &self.balances {
            if !seen.insert(record.account) {
                return Err(DepositError::InvariantViolation {
                    reason: format!("snapshot lists {} more than once", record.account),
                });
            }
            sum = sum
                .checked_add(record.amount)
                .ok_or(DepositError::BalanceOverflow {
                    account: record.account,
                })?;
        }

        if sum != self.aggregate_total {
            return Err(DepositError::InvariantViolation {
                reason: format!(
                    "snapshot aggregate {} != sum of balances {sum}",
                    self.aggregate_total
                ),
            });
        }
        Ok(())
    }
}
