//! Audit events for the DepositGate engine.
//!
//! Every committed state change produces one [`EngineEvent`]. No-op calls
//! and failed calls produce none, so the journal is an exact record of what
//! changed and in which order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EventId, LedgerId};

/// What a committed operation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// `amount` was pulled from `account` into custody.
    Deposited {
        account: AccountId,
        amount: Amount,
        /// The account that initiated the call (the account itself or the
        /// administrator).
        initiator: AccountId,
    },
    /// `account`'s whole balance was paid back to it.
    Released {
        account: AccountId,
        amount: Amount,
        initiator: AccountId,
    },
    /// The entire custody balance was evacuated to `destination`.
    Swept { destination: AccountId, amount: Amount },
    /// The threshold changed.
    ThresholdChanged {
        previous: Amount,
        current: Amount,
        changed_by: AccountId,
    },
    /// The asset ledger handle was replaced.
    AssetLedgerChanged { previous: LedgerId, current: LedgerId },
}

impl EventKind {
    /// Short, stable tag for log lines and metrics labels.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "DEPOSITED",
            Self::Released { .. } => "RELEASED",
            Self::Swept { .. } => "SWEPT",
            Self::ThresholdChanged { .. } => "THRESHOLD_CHANGED",
            Self::AssetLedgerChanged { .. } => "ASSET_LEDGER_CHANGED",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One entry in the engine's audit journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub recorded_at: DateTime<Utc>,
}

impl EngineEvent {
    /// Stamp a new event with a fresh id and the current time.
    #[must_use]
    pub fn now(kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            kind,
            recorded_at: Utc::now(),
        }
    }
}
