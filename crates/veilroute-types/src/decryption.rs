//! # DecryptionContext: the durable link between request and callback
//!
//! A decryption is one logical operation split into two calls: the request
//! (producer) and the oracle callback (consumer). The context stored under
//! the oracle-assigned [`RequestId`] joins them.
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐  valid callback   ┌───────────┐
//!   │ PENDING ├──────────────────▶│ COMPLETED │
//!   └────┬────┘                   └───────────┘
//!        │ failed validation
//!        │ (InvalidateOnFailure only)
//!        ▼
//!   ┌──────────┐
//!   │ REJECTED │
//!   └──────────┘
//! ```
//!
//! Both terminal states count as *processed*; any later callback for the
//! same id is a replay.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, BatchId, Ciphertext, ContractId, RequestId, constants, ids::hex32};

/// Lifecycle of a [`DecryptionContext`]. Transitions are monotonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextStatus {
    /// Waiting for a valid oracle callback.
    Pending,
    /// A valid callback was accepted and the cleartext published.
    Completed,
    /// Permanently invalidated after a failed callback.
    Rejected,
}

impl ContextStatus {
    /// Can this context transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Completed | Self::Rejected)
        )
    }
}

impl fmt::Display for ContextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Record binding a request id to the batch and the exact ciphertext state
/// it was issued against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionContext {
    pub request_id: RequestId,
    pub batch_id: BatchId,
    /// Hash over the canonical ciphertext list and the contract identity.
    #[serde(with = "hex32")]
    pub state_hash: [u8; 32],
    pub status: ContextStatus,
    pub requested_by: AccountId,
    /// Ledger time of the request, in seconds.
    pub requested_at: u64,
}

impl DecryptionContext {
    #[must_use]
    pub fn new(
        request_id: RequestId,
        batch_id: BatchId,
        state_hash: [u8; 32],
        requested_by: AccountId,
        requested_at: u64,
    ) -> Self {
        Self {
            request_id,
            batch_id,
            state_hash,
            status: ContextStatus::Pending,
            requested_by,
            requested_at,
        }
    }

    /// `true` once the context reached a terminal state.
    #[must_use]
    pub fn processed(&self) -> bool {
        self.status != ContextStatus::Pending
    }

    /// # Errors
    /// Returns `ReplayAttempt` if the context is not pending.
    pub fn mark_completed(&mut self) -> crate::Result<()> {
        self.transition(ContextStatus::Completed)
    }

    /// # Errors
    /// Returns `ReplayAttempt` if the context is not pending.
    pub fn mark_rejected(&mut self) -> crate::Result<()> {
        self.transition(ContextStatus::Rejected)
    }

    fn transition(&mut self, target: ContextStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(crate::VeilrouteError::ReplayAttempt(self.request_id));
        }
        self.status = target;
        Ok(())
    }
}

/// Where the oracle must deliver its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackTarget {
    pub contract_id: ContractId,
    pub entrypoint: String,
}

impl CallbackTarget {
    /// The router's decryption callback on the given instance.
    #[must_use]
    pub fn decryption_callback(contract_id: ContractId) -> Self {
        Self {
            contract_id,
            entrypoint: constants::DECRYPTION_CALLBACK_ENTRYPOINT.to_string(),
        }
    }
}

/// A decryption job as handed to the off-chain oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionJob {
    pub request_id: RequestId,
    /// Canonical ciphertext list, in encoding order.
    pub ciphertexts: Vec<Ciphertext>,
    pub callback: CallbackTarget,
}

/// One oracle signer's signature over the signing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSignature {
    /// The signer's ed25519 public key.
    #[serde(with = "hex32")]
    pub signer: [u8; 32],
    /// 64-byte ed25519 signature.
    pub signature: Vec<u8>,
}

/// Proof accompanying a callback: signatures from the oracle key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionProof {
    pub signatures: Vec<OracleSignature>,
}

impl DecryptionProof {
    #[must_use]
    pub fn new(signatures: Vec<OracleSignature>) -> Self {
        Self { signatures }
    }

    /// Canonical payload oracle signers sign over.
    ///
    /// Format: `"veilroute:decryption:v1:" || request_id (LE) || len(cleartexts) (LE) || cleartexts`
    #[must_use]
    pub fn signing_payload(request_id: RequestId, cleartexts: &[u8]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(constants::DECRYPTION_DOMAIN.len() + 16 + cleartexts.len());
        payload.extend_from_slice(constants::DECRYPTION_DOMAIN);
        payload.extend_from_slice(&request_id.0.to_le_bytes());
        payload.extend_from_slice(&(cleartexts.len() as u64).to_le_bytes());
        payload.extend_from_slice(cleartexts);
        payload
    }
}

/// The oracle's answer, as delivered to the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub request_id: RequestId,
    pub cleartexts: Vec<u8>,
    pub proof: DecryptionProof,
}

/// Result of an accepted callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionOutcome {
    pub request_id: RequestId,
    pub batch_id: BatchId,
    pub value: u64,
}
