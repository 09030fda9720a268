//! Configuration types for a DepositGate engine.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, DepositError, Result, constants};

/// Who may change the threshold.
///
/// [`ThresholdPolicy::Open`] is the default: any caller may change it.
/// Deployments that need the stricter rule opt into
/// [`ThresholdPolicy::AdministratorOnly`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// Any caller may set the threshold.
    #[default]
    Open,
    /// Only the administrator may set the threshold.
    AdministratorOnly,
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::AdministratorOnly => write!(f, "administrator_only"),
        }
    }
}

impl FromStr for ThresholdPolicy {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "administrator_only" | "admin_only" => Ok(Self::AdministratorOnly),
            other => Err(DepositError::Configuration(format!(
                "unknown threshold policy {other:?} (expected \"open\" or \"administrator_only\")"
            ))),
        }
    }
}

/// Construction parameters for a deposit engine.
///
/// The asset ledger is not part of the config: it is a live handle passed
/// alongside it when the engine is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The sole account allowed to run privileged operations.
    pub administrator: AccountId,
    /// Initial amount that counts as "sufficiently deposited".
    pub threshold: Amount,
    /// Who may change the threshold afterwards.
    #[serde(default)]
    pub threshold_policy: ThresholdPolicy,
}

impl EngineConfig {
    #[must_use]
    pub fn new(administrator: AccountId, threshold: Amount) -> Self {
        Self {
            administrator,
            threshold,
            threshold_policy: ThresholdPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_threshold_policy(mut self, policy: ThresholdPolicy) -> Self {
        self.threshold_policy = policy;
        self
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DepositError::Configuration(e.to_string()))
    }

    /// Load configuration from the process environment, reading a `.env`
    /// file first if one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// `DEPOSITGATE_ADMINISTRATOR` and `DEPOSITGATE_THRESHOLD` are required;
    /// `DEPOSITGATE_THRESHOLD_POLICY` defaults to `open`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key).ok_or_else(|| {
                DepositError::Configuration(format!("{key} environment variable is required"))
            })
        };

        let administrator = require(constants::ENV_ADMINISTRATOR)?
            .parse::<AccountId>()
            .map_err(|e| {
                DepositError::Configuration(format!(
                    "{} is invalid: {e}",
                    constants::ENV_ADMINISTRATOR
                ))
            })?;
        let threshold = require(constants::ENV_THRESHOLD)?
            .trim()
            .parse::<Amount>()
            .map_err(|_| {
                DepositError::Configuration(format!(
                    "{} must be a non-negative integer",
                    constants::ENV_THRESHOLD
                ))
            })?;
        let threshold_policy = match lookup(constants::ENV_THRESHOLD_POLICY) {
            Some(raw) => raw.parse()?,
            None => ThresholdPolicy::default(),
        };

        Ok(Self {
            administrator,
            threshold,
            threshold_policy,
        })
    }
}
