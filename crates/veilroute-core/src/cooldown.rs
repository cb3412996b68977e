//! Per-account cooldown tracking.
//!
//! An account with no record has never acted and is never throttled.
//! Otherwise a call at `now` passes iff `now >= last + cooldown`.

use std::collections::HashMap;

use veilroute_types::{AccountId, CooldownKind, Result, VeilrouteError};

#[derive(Debug, Clone)]
pub struct CooldownTracker {
    kind: CooldownKind,
    last: HashMap<AccountId, u64>,
}

impl CooldownTracker {
    #[must_use]
    pub fn new(kind: CooldownKind) -> Self {
        Self {
            kind,
            last: HashMap::new(),
        }
    }

    /// # Errors
    /// `CooldownActive` with the earliest allowed time.
    pub fn check(&self, account: &AccountId, now: u64, cooldown_seconds: u64) -> Result<()> {
        let Some(&last) = self.last.get(account) else {
            return Ok(());
        };
        let retry_at = last.saturating_add(cooldown_seconds);
        if now >= retry_at {
            Ok(())
        } else {
            Err(VeilrouteError::CooldownActive {
                kind: self.kind,
                retry_at,
            })
        }
    }

    pub fn record(&mut self, account: AccountId, now: u64) {
        self.last.insert(account, now);
    }

    #[must_use]
    pub fn last(&self, account: &AccountId) -> Option<u64> {
        self.last.get(account).copied()
    }
}
