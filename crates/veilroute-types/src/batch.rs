//! Batch lifecycle types.
//!
//! A batch alternates strictly between two phases:
//! **CLOSED → OPEN → CLOSED → ...**
//!
//! A new [`BatchId`] is allocated only on the CLOSED → OPEN edge, so each
//! identifier corresponds to exactly one open/close window.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AccountId, BatchId, Ciphertext, EncryptedTradeRequest};

/// The two phases of the process-wide batch switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchPhase {
    /// No batch accepts submissions.
    Closed,
    /// The current batch accepts submissions.
    Open,
}

impl fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
        }
    }
}

/// Everything the ciphertext store holds for one batch.
///
/// Last writer wins: a later submission into the same batch replaces
/// `encrypted_request` and `encrypted_best_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_id: BatchId,
    /// The most recent encrypted request, if any was submitted.
    pub encrypted_request: Option<EncryptedTradeRequest>,
    /// Derived best path. Uninitialized until the first submission.
    pub encrypted_best_path: Ciphertext,
    /// Who wrote `encrypted_request` last.
    pub last_submitter: Option<AccountId>,
    /// How many submissions landed in this batch (overwrites included).
    pub submissions: u64,
}

impl BatchRecord {
    #[must_use]
    pub fn empty(batch_id: BatchId) -> Self {
        Self {
            batch_id,
            encrypted_request: None,
            encrypted_best_path: Ciphertext::UNINITIALIZED,
            last_submitter: None,
            submissions: 0,
        }
    }
}
