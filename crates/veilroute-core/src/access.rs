//! Access controller: owner/provider roles, pause switch, cooldown setting.
//!
//! Every mutating call is checked in the same order: authorization first,
//! then the pause switch, then operation-specific preconditions. Checks
//! never mutate, so a failed call leaves the controller untouched.

use std::collections::BTreeSet;

use veilroute_types::{AccountId, Result, RouterEvent, VeilrouteError};

/// Role assignment and process-wide switches.
#[derive(Debug, Clone)]
pub struct AccessController {
    owner: AccountId,
    providers: BTreeSet<AccountId>,
    paused: bool,
    cooldown_seconds: u64,
}

impl AccessController {
    /// The owner starts as the only provider.
    #[must_use]
    pub fn new(owner: AccountId, cooldown_seconds: u64) -> Self {
        let mut providers = BTreeSet::new();
        providers.insert(owner);
        Self {
            owner,
            providers,
            paused: false,
            cooldown_seconds,
        }
    }

    // -----------------------------------------------------------------
    // Guards
    // -----------------------------------------------------------------

    /// # Errors
    /// `NotOwner` unless `caller` is the current owner.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(VeilrouteError::NotOwner(*caller))
        }
    }

    /// # Errors
    /// `NotProvider` unless `caller` holds the provider role.
    pub fn ensure_provider(&self, caller: &AccountId) -> Result<()> {
        if self.providers.contains(caller) {
            Ok(())
        } else {
            Err(VeilrouteError::NotProvider(*caller))
        }
    }

    /// # Errors
    /// `Paused` while the pause switch is on.
    pub fn ensure_running(&self) -> Result<()> {
        if self.paused {
            Err(VeilrouteError::Paused)
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------
    // Owner operations
    // -----------------------------------------------------------------

    /// Hand ownership to `new_owner`. Provider roles are left as they are.
    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<RouterEvent> {
        self.ensure_owner(caller)?;
        self.ensure_running()?;
        if new_owner.is_zero() {
            return Err(VeilrouteError::ZeroAccount);
        }
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        Ok(RouterEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        })
    }

    /// Grant the provider role. Returns `None` if `account` already had it.
    pub fn add_provider(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<Option<RouterEvent>> {
        self.ensure_owner(caller)?;
        self.ensure_running()?;
        if account.is_zero() {
            return Err(VeilrouteError::ZeroAccount);
        }
        Ok(self
            .providers
            .insert(account)
            .then_some(RouterEvent::ProviderAdded { account }))
    }

    /// Revoke the provider role. Returns `None` if `account` did not have it.
    pub fn remove_provider(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<Option<RouterEvent>> {
        self.ensure_owner(caller)?;
        self.ensure_running()?;
        Ok(self
            .providers
            .remove(&account)
            .then_some(RouterEvent::ProviderRemoved { account }))
    }

    pub fn set_cooldown_seconds(&mut self, caller: &AccountId, value: u64) -> Result<RouterEvent> {
        self.ensure_owner(caller)?;
        self.ensure_running()?;
        let previous_seconds = std::mem::replace(&mut self.cooldown_seconds, value);
        Ok(RouterEvent::CooldownSet {
            previous_seconds,
            new_seconds: value,
        })
    }

    /// # Errors
    /// `Paused` if already paused.
    pub fn pause(&mut self, caller: &AccountId) -> Result<RouterEvent> {
        self.ensure_owner(caller)?;
        self.ensure_running()?;
        self.paused = true;
        Ok(RouterEvent::Paused { account: *caller })
    }

    /// # Errors
    /// `NotPaused` if not paused.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<RouterEvent> {
        self.ensure_owner(caller)?;
        if !self.paused {
            return Err(VeilrouteError::NotPaused);
        }
        self.paused = false;
        Ok(RouterEvent::Unpaused { account: *caller })
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    #[must_use]
    pub fn is_provider(&self, account: &AccountId) -> bool {
        self.providers.contains(account)
    }

    /// All providers, sorted.
    #[must_use]
    pub fn providers(&self) -> Vec<AccountId> {
        self.providers.iter().copied().collect()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn cooldown_seconds(&self) -> u64 {
        self.cooldown_seconds
    }
}
