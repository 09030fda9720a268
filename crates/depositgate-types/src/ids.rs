//! Identifiers used throughout DepositGate.
//!
//! Accounts and asset ledgers are addressed by 20-byte identifiers rendered
//! as `0x`-prefixed lowercase hex. Both serialize as that hex string so
//! configuration files stay human-editable. Audit events use UUIDv7 for
//! time-ordered sorting.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{DepositError, constants};

/// Decode `0x`-prefixed (or bare) hex into a fixed-size identifier.
fn parse_id_bytes(input: &str) -> Result<[u8; constants::ID_LEN], DepositError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let mut bytes = [0u8; constants::ID_LEN];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| DepositError::InvalidIdentifier {
        input: input.to_string(),
    })?;
    Ok(bytes)
}

/// First [`constants::ID_LEN`] bytes of `SHA-256(domain || label)`.
fn derive_id_bytes(domain: &[u8], label: &str) -> [u8; constants::ID_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(label.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; constants::ID_LEN];
    bytes.copy_from_slice(&hash[..constants::ID_LEN]);
    bytes
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of an account: a depositor, the administrator, a sweep
/// destination, or the engine's own custody account on the asset ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(pub [u8; constants::ID_LEN]);

impl AccountId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; constants::ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Deterministic account identity from a human-readable label.
    ///
    /// The same label always yields the same account, which keeps fixtures
    /// and operator tooling reproducible.
    #[must_use]
    pub fn derive(label: &str) -> Self {
        Self(derive_id_bytes(constants::ACCOUNT_DERIVE_DOMAIN, label))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::ID_LEN] {
        &self.0
    }

    /// Abbreviated form for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id_bytes(s).map(Self)
    }
}

impl TryFrom<String> for AccountId {
    type Error = DepositError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// LedgerId
// ---------------------------------------------------------------------------

/// Identity of an external asset ledger (the token the engine custodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LedgerId(pub [u8; constants::ID_LEN]);

impl LedgerId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; constants::ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Deterministic ledger identity from a label such as a token symbol.
    #[must_use]
    pub fn derive(label: &str) -> Self {
        Self(derive_id_bytes(constants::LEDGER_DERIVE_DOMAIN, label))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; constants::ID_LEN] {
        &self.0
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for LedgerId {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_id_bytes(s).map(Self)
    }
}

impl TryFrom<String> for LedgerId {
    type Error = DepositError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LedgerId> for String {
    fn from(id: LedgerId) -> Self {
        id.to_string()
    }
}

// ---------------------------------------------------------------------------
// EventId
// ---------------------------------------------------------------------------

/// Unique identifier for an audit event. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
