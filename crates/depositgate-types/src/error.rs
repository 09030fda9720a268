//! Error types for the DepositGate engine.
//!
//! All engine errors use the `DG_ERR_` prefix and all asset-ledger errors
//! the `DG_LEDGER_` prefix, for easy grepping in logs.
//! Engine error codes are grouped by subsystem:
//! - 1xx: Access control
//! - 2xx: Balance ledger
//! - 3xx: Asset ledger transfers
//! - 4xx: Holder log queries
//! - 5xx: Invariants
//! - 9xx: Configuration / serialization

use thiserror::Error;

use crate::{AccountId, Amount, LedgerId};

/// Central error enum for all DepositGate operations.
///
/// Every variant is returned before any engine state is committed, so a
/// failed call never leaves a partial mutation behind.
#[derive(Debug, Error)]
pub enum DepositError {
    // =================================================================
    // Access control (1xx)
    // =================================================================
    /// The caller is not allowed to perform a privileged operation.
    #[error("DG_ERR_100: Unauthorized caller {caller}")]
    Unauthorized { caller: AccountId },

    // =================================================================
    // Balance ledger (2xx)
    // =================================================================
    /// A release was attempted against a zero balance.
    #[error("DG_ERR_200: Nothing to release for {account}")]
    NothingToRelease { account: AccountId },

    /// Crediting the account would overflow the amount type.
    #[error("DG_ERR_201: Balance overflow for {account}")]
    BalanceOverflow { account: AccountId },

    // =================================================================
    // Asset ledger transfers (3xx)
    // =================================================================
    /// The external asset ledger rejected a pull or push.
    #[error("DG_ERR_300: Asset ledger transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    // =================================================================
    // Holder log (4xx)
    // =================================================================
    /// Holder log index past the end of the log.
    #[error("DG_ERR_400: Holder index {index} out of range (holders: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    // =================================================================
    // Invariants (5xx)
    // =================================================================
    /// Aggregate total disagrees with the per-account balances.
    #[error("DG_ERR_500: Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // =================================================================
    // Configuration / serialization (9xx)
    // =================================================================
    /// Configuration error (missing variable, unparsable value, etc.).
    #[error("DG_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("DG_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// An account or ledger identifier could not be parsed.
    #[error("DG_ERR_902: Invalid identifier: {input:?}")]
    InvalidIdentifier { input: String },
}

/// Errors reported by an external asset ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The owner has not authorized the custody account to pull enough.
    #[error("DG_LEDGER_100: Insufficient allowance for {owner}: need {needed}, approved {approved}")]
    InsufficientAllowance {
        owner: AccountId,
        needed: Amount,
        approved: Amount,
    },

    /// The paying account does not hold enough of the asset.
    #[error("DG_LEDGER_101: Insufficient balance for {account}: need {needed}, have {available}")]
    InsufficientBalance {
        account: AccountId,
        needed: Amount,
        available: Amount,
    },

    /// The receiving balance would overflow.
    #[error("DG_LEDGER_102: Balance overflow crediting {account}")]
    Overflow { account: AccountId },

    /// The ledger could not be reached or refused service.
    #[error("DG_LEDGER_900: Ledger {ledger} unavailable: {reason}")]
    Unavailable { ledger: LedgerId, reason: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DepositError>;

impl From<serde_json::Error> for DepositError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
