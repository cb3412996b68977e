//! Per-call capability record.
//!
//! Every router operation receives the caller identity and the ledger time
//! explicitly instead of reading ambient globals.

use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Who is calling, and when (ledger time in seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: AccountId,
    pub now: u64,
}

impl CallContext {
    #[must_use]
    pub fn new(caller: AccountId, now: u64) -> Self {
        Self { caller, now }
    }

    /// Same caller, later time.
    #[must_use]
    pub fn at(self, now: u64) -> Self {
        Self { now, ..self }
    }
}
