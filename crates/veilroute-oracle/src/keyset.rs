//! Oracle key set: threshold verification of decryption proofs.
//!
//! A proof is valid when at least `threshold` **distinct** trusted signers
//! produced a valid ed25519 signature over
//! [`DecryptionProof::signing_payload`]. Unknown signers, duplicate
//! signers and malformed signatures are ignored, never counted.

use std::collections::HashSet;

use ed25519_dalek::{Signature, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use veilroute_types::{DecryptionProof, OracleConfig, RequestId, Result, VeilrouteError};

use crate::{PlaintextVault, relayer::DecryptionRelayer};

/// Trusted oracle signer keys and the signature threshold.
#[derive(Debug, Clone)]
pub struct OracleKeySet {
    keys: Vec<VerifyingKey>,
    threshold: usize,
}

impl OracleKeySet {
    /// # Errors
    /// Returns `Configuration` unless `1 <= threshold <= keys.len()`.
    pub fn new(keys: Vec<VerifyingKey>, threshold: usize) -> Result<Self> {
        if threshold == 0 || threshold > keys.len() {
            return Err(VeilrouteError::Configuration(format!(
                "oracle threshold {threshold} must be within 1..={}",
                keys.len()
            )));
        }
        Ok(Self { keys, threshold })
    }

    /// Key set from raw 32-byte public keys.
    ///
    /// # Errors
    /// Returns `Configuration` if a key is not a valid ed25519 point or the
    /// threshold is out of range.
    pub fn from_bytes(keys: &[[u8; 32]], threshold: usize) -> Result<Self> {
        let keys = keys
            .iter()
            .map(|bytes| {
                VerifyingKey::from_bytes(bytes).map_err(|e| {
                    VeilrouteError::Configuration(format!(
                        "invalid oracle key {}: {e}",
                        hex::encode(bytes)
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(keys, threshold)
    }

    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn is_trusted(&self, signer: &[u8; 32]) -> bool {
        self.keys.iter().any(|k| k.as_bytes() == signer)
    }

    /// Count distinct trusted signers with a valid signature.
    #[must_use]
    pub fn valid_signers(
        &self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &DecryptionProof,
    ) -> usize {
        let payload = DecryptionProof::signing_payload(request_id, cleartexts);
        let mut counted: HashSet<[u8; 32]> = HashSet::new();

        for entry in &proof.signatures {
            if counted.contains(&entry.signer) {
                continue;
            }
            let Some(key) = self.keys.iter().find(|k| k.as_bytes() == &entry.signer) else {
                continue;
            };
            let Ok(signature) = Signature::from_slice(&entry.signature) else {
                continue;
            };
            if key.verify(&payload, &signature).is_ok() {
                counted.insert(entry.signer);
            }
        }
        counted.len()
    }

    /// Whether the proof reaches the threshold.
    #[must_use]
    pub fn verify(&self, request_id: RequestId, cleartexts: &[u8], proof: &DecryptionProof) -> bool {
        self.valid_signers(request_id, cleartexts, proof) >= self.threshold
    }
}

/// Generate a fresh oracle committee: the public key set for the gateway
/// and a relayer holding the matching signing keys.
///
/// # Errors
/// Returns `Configuration` if `config` is invalid.
pub fn committee(
    config: &OracleConfig,
    vault: PlaintextVault,
) -> Result<(OracleKeySet, DecryptionRelayer)> {
    config.validate()?;
    let signing: Vec<SigningKey> = (0..config.signers)
        .map(|_| SigningKey::generate(&mut OsRng))
        .collect();
    let keyset = OracleKeySet::new(
        signing.iter().map(SigningKey::verifying_key).collect(),
        config.threshold,
    )?;
    Ok((keyset, DecryptionRelayer::new(vault, signing)))
}
