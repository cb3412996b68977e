//! Oracle gateway: the ledger-side face of the decryption oracle.
//!
//! Allocates request ids (monotonic, starting at 1), pushes each
//! [`DecryptionJob`] onto an unbounded channel for the off-ledger relayer,
//! and verifies callback proofs against the [`OracleKeySet`].

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use veilroute_types::{
    CallbackTarget, Ciphertext, DecryptionJob, DecryptionOracle, DecryptionProof, RequestId,
    Result, VeilrouteError,
};

use crate::OracleKeySet;

/// [`DecryptionOracle`] backed by a job channel and a key set.
pub struct OracleGateway {
    keyset: OracleKeySet,
    jobs: UnboundedSender<DecryptionJob>,
    next_request_id: u64,
}

impl OracleGateway {
    /// Create a gateway and the receiving end of its job channel.
    #[must_use]
    pub fn new(keyset: OracleKeySet) -> (Self, UnboundedReceiver<DecryptionJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                keyset,
                jobs: tx,
                next_request_id: 1,
            },
            rx,
        )
    }

    /// Number of requests issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next_request_id - 1
    }
}

impl DecryptionOracle for OracleGateway {
    fn peek_request_id(&self) -> RequestId {
        RequestId(self.next_request_id)
    }

    fn request_decryption(
        &mut self,
        ciphertexts: &[Ciphertext],
        callback: &CallbackTarget,
    ) -> Result<RequestId> {
        if ciphertexts.is_empty() {
            return Err(VeilrouteError::OracleUnavailable {
                reason: "empty ciphertext list".into(),
            });
        }
        let request_id = RequestId(self.next_request_id);
        let job = DecryptionJob {
            request_id,
            ciphertexts: ciphertexts.to_vec(),
            callback: callback.clone(),
        };
        self.jobs
            .send(job)
            .map_err(|_| VeilrouteError::OracleUnavailable {
                reason: "relayer channel closed".into(),
            })?;
        self.next_request_id += 1;
        tracing::debug!(%request_id, count = ciphertexts.len(), "Decryption job queued");
        Ok(request_id)
    }

    fn check_signatures(
        &self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &DecryptionProof,
    ) -> bool {
        self.keyset.verify(request_id, cleartexts, proof)
    }
}
