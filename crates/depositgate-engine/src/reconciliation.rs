//! Custody reconciliation.
//!
//! Two identities should hold for a healthy engine:
//! ```text
//! aggregate_total == Σ balances            (internal bookkeeping)
//! custody_balance >= aggregate_total       (every account can be repaid)
//! ```
//!
//! The first is an invariant the engine maintains itself. The second can be
//! broken on purpose by an administrator sweep, or bent the other way by
//! someone transferring straight into custody. Neither is corrected here:
//! the report says what diverged and by how much, and the caller decides.

use depositgate_ledger::AssetLedger;
use depositgate_types::{Amount, DepositError, LedgerId, Result};

use crate::DepositEngine;

/// How the ledger's custody balance compares with the engine's books.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodyStatus {
    /// Custody holds exactly what the books say.
    Balanced,
    /// Custody holds this much more than the books (direct transfers in).
    Surplus(Amount),
    /// Custody holds this much less than the books (typically after a sweep).
    Shortfall(Amount),
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyReport {
    pub ledger: LedgerId,
    pub custody_balance: Amount,
    pub aggregate_total: Amount,
    pub status: CustodyStatus,
}

impl CustodyReport {
    /// Whether every locked balance could be paid out right now.
    #[must_use]
    pub fn is_covered(&self) -> bool {
        !matches!(self.status, CustodyStatus::Shortfall(_))
    }
}

/// Compares an engine's books against its asset ledger.
pub struct CustodyReconciliation;

impl CustodyReconciliation {
    /// Produce a report without judging it.
    #[must_use]
    pub fn check<L: AssetLedger>(engine: &DepositEngine<L>) -> CustodyReport {
        let custody_balance = engine.ledger().custody_balance();
        let aggregate_total = engine.total_deposits();
        let status = if custody_balance == aggregate_total {
            CustodyStatus::Balanced
        } else if custody_balance > aggregate_total {
            CustodyStatus::Surplus(custody_balance - aggregate_total)
        } else {
            CustodyStatus::Shortfall(aggregate_total - custody_balance)
        };

        CustodyReport {
            ledger: engine.asset_ledger(),
            custody_balance,
            aggregate_total,
            status,
        }
    }

    /// Verify both identities.
    ///
    /// A surplus is logged but accepted.
    ///
    /// # Errors
    /// [`DepositError::InvariantViolation`] if the aggregate disagrees with
    /// the balances, or custody cannot cover the aggregate.
    pub fn verify<L: AssetLedger>(engine: &DepositEngine<L>) -> Result<CustodyReport> {
        engine.verify_aggregate()?;

        let report = Self::check(engine);
        match report.status {
            CustodyStatus::Balanced => Ok(report),
            CustodyStatus::Surplus(extra) => {
                tracing::warn!(
                    ledger = %report.ledger,
                    custody = report.custody_balance,
                    books = report.aggregate_total,
                    extra,
                    "Custody holds more than the books"
                );
                Ok(report)
            }
            CustodyStatus::Shortfall(missing) => {
                tracing::error!(
                    ledger = %report.ledger,
                    custody = report.custody_balance,
                    books = report.aggregate_total,
                    missing,
                    "Custody cannot cover locked balances"
                );
                Err(DepositError::InvariantViolation {
                    reason: format!(
                        "ledger {}: custody {} < locked total {} (short by {missing})",
                        report.ledger, report.custody_balance, report.aggregate_total
                    ),
                })
            }
        }
    }
}
