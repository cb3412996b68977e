//! Per-batch ciphertext storage.
//!
//! Pure storage with no access checks. A record is created lazily on the
//! first write to a batch.

use std::collections::HashMap;

use veilroute_types::{AccountId, BatchId, BatchRecord, Ciphertext, EncryptedTradeRequest};

#[derive(Debug, Clone, Default)]
pub struct CiphertextStore {
    records: HashMap<BatchId, BatchRecord>,
}

impl CiphertextStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, batch_id: BatchId) -> &mut BatchRecord {
        self.records
            .entry(batch_id)
            .or_insert_with(|| BatchRecord::empty(batch_id))
    }

    /// Store `request` for the batch, replacing any earlier one.
    pub fn put_request(
        &mut self,
        batch_id: BatchId,
        submitter: AccountId,
        request: EncryptedTradeRequest,
    ) {
        let record = self.record_mut(batch_id);
        record.encrypted_request = Some(request);
        record.last_submitter = Some(submitter);
        record.submissions += 1;
    }

    pub fn set_best_path(&mut self, batch_id: BatchId, best_path: Ciphertext) {
        self.record_mut(batch_id).encrypted_best_path = best_path;
    }

    #[must_use]
    pub fn get(&self, batch_id: BatchId) -> Option<&BatchRecord> {
        self.records.get(&batch_id)
    }

    /// Best path for the batch, [`Ciphertext::UNINITIALIZED`] if never set.
    #[must_use]
    pub fn best_path(&self, batch_id: BatchId) -> Ciphertext {
        self.records
            .get(&batch_id)
            .map_or(Ciphertext::UNINITIALIZED, |r| r.encrypted_best_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
