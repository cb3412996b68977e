//! Decryption relayer: the off-ledger half of the oracle.
//!
//! Takes a [`DecryptionJob`], reveals each ciphertext from the vault in
//! list order, encodes the cleartexts as fixed-width words and signs
//! `(request_id, cleartexts)` with every signer key it holds.

use ed25519_dalek::{Signer, SigningKey};
use veilroute_types::{
    CallbackPayload, DecryptionJob, DecryptionProof, OracleSignature, RequestId, Result,
    VeilrouteError, cleartext,
};

use crate::PlaintextVault;

/// Holds the oracle's signing keys and read access to the plaintext vault.
pub struct DecryptionRelayer {
    vault: PlaintextVault,
    signers: Vec<SigningKey>,
}

impl DecryptionRelayer {
    #[must_use]
    pub fn new(vault: PlaintextVault, signers: Vec<SigningKey>) -> Self {
        Self { vault, signers }
    }

    #[must_use]
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Decrypt and sign a job.
    ///
    /// # Errors
    /// Returns `OracleUnavailable` if a ciphertext is unknown to the vault.
    pub fn fulfil(&self, job: &DecryptionJob) -> Result<CallbackPayload> {
        let values = job
            .ciphertexts
            .iter()
            .map(|ct| {
                self.vault
                    .reveal(ct)
                    .ok_or_else(|| VeilrouteError::OracleUnavailable {
                        reason: format!("cannot decrypt {ct} for {}", job.request_id),
                    })
            })
            .collect::<Result<Vec<u64>>>()?;

        let cleartexts = cleartext::encode_words(&values);
        let proof = self.sign(job.request_id, &cleartexts);
        tracing::debug!(
            request_id = %job.request_id,
            words = values.len(),
            signatures = proof.signatures.len(),
            "Decryption job fulfilled"
        );
        Ok(CallbackPayload {
            request_id: job.request_id,
            cleartexts,
            proof,
        })
    }

    /// Sign arbitrary cleartexts for a request id.
    #[must_use]
    pub fn sign(&self, request_id: RequestId, cleartexts: &[u8]) -> DecryptionProof {
        let payload = DecryptionProof::signing_payload(request_id, cleartexts);
        DecryptionProof::new(
            self.signers
                .iter()
                .map(|key| OracleSignature {
                    signer: key.verifying_key().to_bytes(),
                    signature: key.sign(&payload).to_bytes().to_vec(),
                })
                .collect(),
        )
    }
}
