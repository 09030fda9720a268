//! # depositgate-ledger
//!
//! **Asset ledger boundary**: the capability the deposit engine consumes
//! to move the tracked asset, plus an in-memory implementation.
//!
//! ## Architecture
//!
//! The engine never holds funds itself. It owns a *custody account* on an
//! external fungible-asset ledger and talks to that ledger through four
//! calls:
//! 1. **balance_of**: how much an account holds
//! 2. **approved_amount**: how much an owner lets custody pull
//! 3. **pull**: owner → custody, consuming the approval
//! 4. **push**: custody → recipient
//!
//! [`InMemoryLedger`] is a mintable token with ERC-20 style allowances. It
//! backs the engine's tests and serves as the reference adapter for
//! integrators writing a real one.

pub mod asset_ledger;
pub mod memory;

pub use asset_ledger::AssetLedger;
pub use memory::{InMemoryLedger, LedgerOp};
