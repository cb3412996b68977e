//! Rate board: encrypted rates published by providers for front ends.
//!
//! A generic key-value surface: providers write an encrypted rate handle
//! under a string key, readers fetch one entry or the whole board as a JSON
//! blob. Values stay ciphertexts; only their publisher and time are clear.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use veilroute_types::{AccountId, Ciphertext, Result, VeilrouteError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub ciphertext: Ciphertext,
    pub publisher: AccountId,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RateBoard {
    entries: BTreeMap<String, RateEntry>,
    max_entries: usize,
}

impl RateBoard {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_entries,
        }
    }

    /// Insert or replace the rate under `key`.
    ///
    /// # Errors
    /// `Configuration` if the key is empty, the handle is zero, `key` is
    /// new and the board is full, or `now` is not a representable time.
    pub fn publish(
        &mut self,
        publisher: AccountId,
        key: &str,
        ciphertext: Ciphertext,
        now: u64,
    ) -> Result<()> {
        if key.is_empty() {
            return Err(VeilrouteError::Configuration("rate key must be non-empty".into()));
        }
        if ciphertext.is_zero() {
            return Err(VeilrouteError::Configuration(format!(
                "rate {key} has an uninitialized ciphertext"
            )));
        }
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            return Err(VeilrouteError::Configuration(format!(
                "rate board full ({} entries)",
                self.max_entries
            )));
        }

        let updated_at = i64::try_from(now)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                VeilrouteError::Configuration(format!("ledger time {now} is out of range"))
            })?;
        self.entries.insert(
            key.to_owned(),
            RateEntry {
                ciphertext,
                publisher,
                updated_at,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn rate(&self, key: &str) -> Option<&RateEntry> {
        self.entries.get(key)
    }

    /// JSON object of all entries, keys sorted.
    ///
    /// # Errors
    /// `Serialization` if encoding fails.
    pub fn rates_blob(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
