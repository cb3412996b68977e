//! Configuration types for the router and its oracle.

use serde::{Deserialize, Serialize};

use crate::{AccountId, ContractId, Result, VeilrouteError, constants};

/// What happens to a pending decryption context when a callback fails
/// validation after the replay check (state mismatch, invalid proof,
/// malformed cleartext).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackFailurePolicy {
    /// The context stays pending; a later callback with a different
    /// payload may still complete it. The failed call changes nothing.
    #[default]
    Retryable,
    /// The context is marked rejected and every later callback for the
    /// same request id fails as a replay.
    InvalidateOnFailure,
}

/// Configuration for one router instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Identity bound into every state hash.
    pub contract_id: ContractId,
    /// Initial owner. Also the first provider.
    pub owner: AccountId,
    /// The only account allowed to deliver decryption callbacks.
    pub oracle_account: AccountId,
    /// Initial cooldown between calls of the same kind from one account.
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    #[serde(default)]
    pub callback_failure_policy: CallbackFailurePolicy,
    /// Bound on distinct rate board keys.
    #[serde(default = "default_max_rate_entries")]
    pub max_rate_entries: usize,
}

fn default_cooldown_seconds() -> u64 {
    constants::DEFAULT_COOLDOWN_SECS
}

fn default_max_rate_entries() -> usize {
    constants::DEFAULT_MAX_RATE_ENTRIES
}

impl RouterConfig {
    /// Config with default cooldown, policy and rate board bound.
    #[must_use]
    pub fn new(contract_id: ContractId, owner: AccountId, oracle_account: AccountId) -> Self {
        Self {
            contract_id,
            owner,
            oracle_account,
            cooldown_seconds: default_cooldown_seconds(),
            callback_failure_policy: CallbackFailurePolicy::default(),
            max_rate_entries: default_max_rate_entries(),
        }
    }

    #[must_use]
    pub fn with_cooldown(mut self, seconds: u64) -> Self {
        self.cooldown_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: CallbackFailurePolicy) -> Self {
        self.callback_failure_policy = policy;
        self
    }

    /// # Errors
    /// Returns `Configuration` if any identity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.contract_id.is_zero() {
            return Err(VeilrouteError::Configuration(
                "contract_id must be non-zero".into(),
            ));
        }
        if self.owner.is_zero() {
            return Err(VeilrouteError::Configuration("owner must be non-zero".into()));
        }
        if self.oracle_account.is_zero() {
            return Err(VeilrouteError::Configuration(
                "oracle_account must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Oracle key set shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Number of signer keys.
    pub signers: usize,
    /// Distinct valid signatures required per proof.
    pub threshold: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            signers: constants::DEFAULT_ORACLE_SIGNERS,
            threshold: constants::DEFAULT_ORACLE_THRESHOLD,
        }
    }
}

impl OracleConfig {
    /// # Errors
    /// Returns `Configuration` unless `1 <= threshold <= signers`.
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 || self.threshold > self.signers {
            return Err(VeilrouteError::Configuration(format!(
                "oracle threshold {} must be within 1..={}",
                self.threshold, self.signers
            )));
        }
        Ok(())
    }
}
