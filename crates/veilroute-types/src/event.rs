//! Append-only router events consumed by off-chain indexers and front ends.
//!
//! An event says a transition happened; it does not say the resulting state
//! still holds. Consumers must re-read state before acting on it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, BatchId, Ciphertext, EventId, RequestId, ids::hex32};

/// Every observable state transition of the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouterEvent {
    OwnershipTransferred {
        previous_owner: AccountId,
        new_owner: AccountId,
    },
    ProviderAdded {
        account: AccountId,
    },
    ProviderRemoved {
        account: AccountId,
    },
    CooldownSet {
        previous_seconds: u64,
        new_seconds: u64,
    },
    Paused {
        account: AccountId,
    },
    Unpaused {
        account: AccountId,
    },
    BatchOpened {
        batch_id: BatchId,
    },
    BatchClosed {
        batch_id: BatchId,
    },
    TradeRequestSubmitted {
        submitter: AccountId,
        batch_id: BatchId,
    },
    DecryptionRequested {
        request_id: RequestId,
        batch_id: BatchId,
        #[serde(with = "hex32")]
        state_hash: [u8; 32],
    },
    DecryptionCompleted {
        request_id: RequestId,
        batch_id: BatchId,
        result: u64,
    },
    RatePublished {
        publisher: AccountId,
        key: String,
        ciphertext: Ciphertext,
    },
}

impl RouterEvent {
    /// Stable event name, matching the serde tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::ProviderAdded { .. } => "provider_added",
            Self::ProviderRemoved { .. } => "provider_removed",
            Self::CooldownSet { .. } => "cooldown_set",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
            Self::BatchOpened { .. } => "batch_opened",
            Self::BatchClosed { .. } => "batch_closed",
            Self::TradeRequestSubmitted { .. } => "trade_request_submitted",
            Self::DecryptionRequested { .. } => "decryption_requested",
            Self::DecryptionCompleted { .. } => "decryption_completed",
            Self::RatePublished { .. } => "rate_published",
        }
    }
}

impl fmt::Display for RouterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    /// Position in the log, starting at 0, gap-free.
    pub sequence: u64,
    /// Ledger time of the emitting call, in seconds.
    pub at: u64,
    pub event: RouterEvent,
}
