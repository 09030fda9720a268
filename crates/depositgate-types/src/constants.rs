//! System-wide constants for DepositGate.

/// Byte length of an [`AccountId`](crate::AccountId) or [`LedgerId`](crate::LedgerId).
pub const ID_LEN: usize = 20;

/// Environment variable holding the administrator account (hex).
pub const ENV_ADMINISTRATOR: &str = "DEPOSITGATE_ADMINISTRATOR";

/// Environment variable holding the initial threshold (decimal integer).
pub const ENV_THRESHOLD: &str = "DEPOSITGATE_THRESHOLD";

/// Environment variable selecting who may change the threshold
/// (`open` or `administrator_only`). Optional.
pub const ENV_THRESHOLD_POLICY: &str = "DEPOSITGATE_THRESHOLD_POLICY";

/// Domain separator for [`AccountId::derive`](crate::AccountId::derive).
pub const ACCOUNT_DERIVE_DOMAIN: &[u8] = b"depositgate:account:v1:";

/// Domain separator for [`LedgerId::derive`](crate::LedgerId::derive).
pub const LEDGER_DERIVE_DOMAIN: &[u8] = b"depositgate:ledger:v1:";

/// Domain separator for the engine state digest.
pub const STATE_DIGEST_DOMAIN: &[u8] = b"depositgate:state:v1:";

/// Current [`EngineSnapshot`](crate::EngineSnapshot) format version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "DepositGate";
