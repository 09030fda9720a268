//! # depositgate-types
//!
//! Shared types, errors, and configuration for the **DepositGate**
//! deposit-accounting engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`LedgerId`], [`EventId`]
//! - **Configuration**: [`EngineConfig`], [`ThresholdPolicy`]
//! - **Audit trail**: [`EngineEvent`], [`EventKind`]
//! - **Snapshots**: [`EngineSnapshot`], [`BalanceRecord`]
//! - **Errors**: [`DepositError`] (`DG_ERR_` codes) and [`LedgerError`]
//!   (`DG_LEDGER_` codes)
//! - **Constants**: environment variable names, hashing domains, versions

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod snapshot;

// Re-export all primary types at crate root for ergonomic imports:
//   use depositgate_types::{AccountId, DepositError, EngineConfig, ...};

pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use snapshot::*;

/// Amount of the tracked asset, in the ledger's smallest indivisible unit.
pub type Amount = u128;

// Constants are accessed via `depositgate_types::constants::FOO`
// (not re-exported to avoid name collisions).
