//! Simulator configuration (TOML).
//!
//! Every field has a default, so an empty file or no file at all yields
//! the reference run: batch 2 carrying tokenA=5, tokenB=9, amount=100.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use veilroute_types::{
    AccountId, CallbackFailurePolicy, ContractId, OracleConfig, RouterConfig, constants,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Labels hashed into 32-byte identities.
    pub contract: String,
    pub owner: String,
    pub providers: Vec<String>,
    pub oracle: String,

    pub cooldown_seconds: u64,
    pub callback_failure_policy: CallbackFailurePolicy,
    /// Ledger time of the first call, in seconds.
    pub start_time: u64,

    pub committee: OracleConfig,
    pub trade: TradeConfig,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    pub token_a: u64,
    pub token_b: u64,
    pub amount: u64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            token_a: 5,
            token_b: 9,
            amount: 100,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            contract: "veilroute-router".into(),
            owner: "owner".into(),
            providers: vec!["provider-1".into(), "provider-2".into()],
            oracle: "oracle".into(),
            cooldown_seconds: constants::DEFAULT_COOLDOWN_SECS,
            callback_failure_policy: CallbackFailurePolicy::default(),
            start_time: 1_700_000_000,
            committee: OracleConfig::default(),
            trade: TradeConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.providers.len() >= 2,
            "at least two providers are needed for the stale-state run"
        );
        self.committee.validate()?;
        Ok(())
    }

    pub fn owner_id(&self) -> AccountId {
        AccountId::derive(&self.owner)
    }

    pub fn oracle_id(&self) -> AccountId {
        AccountId::derive(&self.oracle)
    }

    pub fn provider_ids(&self) -> Vec<AccountId> {
        self.providers.iter().map(|p| AccountId::derive(p)).collect()
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig::new(
            ContractId::derive(&self.contract),
            self.owner_id(),
            self.oracle_id(),
        )
        .with_cooldown(self.cooldown_seconds)
        .with_policy(self.callback_failure_policy)
    }
}
