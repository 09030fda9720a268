//! # depositgate-engine
//!
//! **Deposit accounting engine**: tracks how much of one asset each account
//! has locked against a configurable threshold, tops accounts up from what
//! they approved, and releases locked funds to owners or, in an emergency,
//! sweeps custody to an administrator-chosen address.
//!
//! ## Architecture
//!
//! - [`BalanceLedger`]: per-account locked balance + running aggregate,
//!   mutated through plan/apply so external failures never leave a trace
//! - [`HolderLog`]: append-only event log of successful deposits
//! - [`DepositEngine`]: configuration, access control and the transitions
//!   (deposit, release, sweep) over an [`AssetLedger`]
//! - [`CustodyReconciliation`]: compares custody on the ledger with the books
//! - [`SharedDepositEngine`]: one lock around the engine for async callers
//!
//! ## Operation Flow
//!
//! ```text
//! caller → authorize → plan update → AssetLedger pull/push → apply + log
//!                          │                  │
//!                          └── error ─────────┴── error → state unchanged
//! ```

pub mod balance_ledger;
pub mod engine;
pub mod holder_log;
pub mod reconciliation;
pub mod shared;

pub use balance_ledger::{BalanceLedger, BalanceUpdate};
pub use depositgate_ledger::AssetLedger;
pub use engine::DepositEngine;
pub use holder_log::HolderLog;
pub use reconciliation::{CustodyReconciliation, CustodyReport, CustodyStatus};
pub use shared::SharedDepositEngine;
