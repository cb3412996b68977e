//! # Decryption request/callback protocol
//!
//! A decryption is split across two calls that never share a stack:
//!
//! ```text
//!  provider                     router                         oracle
//!     │ request_decryption(b)     │                               │
//!     ├──────────────────────────▶│ list = canonical(b)           │
//!     │                           │ h = state_hash(contract, list)│
//!     │                           │ request_decryption(list) ────▶│
//!     │                           │◀──────────────────── id ──────┤
//!     │                           │ contexts[id] = {b, h, PENDING}│
//!     │                           │                               │
//!     │                           │◀── callback(id, clear, proof) ┤
//!     │                           │ processed?      → replay      │
//!     │                           │ recompute h     → mismatch    │
//!     │                           │ check proof     → invalid     │
//!     │                           │ decode cleartext              │
//!     │                           │ COMPLETED, publish            │
//! ```
//!
//! The state hash binds a callback to the exact ciphertexts it was issued
//! against. If the batch's best path is overwritten after the request, the
//! recomputed hash differs and the callback is refused.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use veilroute_types::{
    AccountId, BatchId, CallContext, CallbackFailurePolicy, CallbackTarget, Ciphertext,
    ContractId, CooldownKind, DecryptionContext, DecryptionOracle, DecryptionOutcome,
    DecryptionProof, HomomorphicBackend, RequestId, Result, VeilrouteError, cleartext,
    constants::STATE_HASH_DOMAIN,
};

use crate::{CiphertextStore, CooldownTracker};

/// `SHA-256(domain || contract_id || len || canonical(ct_0) || ...)`.
///
/// `len` is the number of ciphertexts as a little-endian `u64`.
#[must_use]
pub fn compute_state_hash(
    contract_id: &ContractId,
    backend: &dyn HomomorphicBackend,
    ciphertexts: &[Ciphertext],
) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(STATE_HASH_DOMAIN);
    hasher.update(contract_id.as_bytes());
    hasher.update((ciphertexts.len() as u64).to_le_bytes());
    for ct in ciphertexts {
        hasher.update(backend.to_canonical_bytes(ct));
    }
    hasher.finalize().into()
}

/// Ordered ciphertexts requested for decryption of a batch: the best path.
///
/// # Errors
/// `CiphertextNotInitialized` if the batch has no live best path.
pub fn canonical_ciphertexts(
    store: &CiphertextStore,
    backend: &dyn HomomorphicBackend,
    batch_id: BatchId,
) -> Result<Vec<Ciphertext>> {
    let best_path = store.best_path(batch_id);
    if !backend.is_initialized(&best_path) {
        return Err(VeilrouteError::CiphertextNotInitialized(batch_id));
    }
    Ok(vec![best_path])
}

/// Owns the decryption contexts and the per-account request cooldown.
#[derive(Debug, Clone)]
pub struct DecryptionProtocol {
    contract_id: ContractId,
    policy: CallbackFailurePolicy,
    contexts: HashMap<RequestId, DecryptionContext>,
    cooldown: CooldownTracker,
}

impl DecryptionProtocol {
    #[must_use]
    pub fn new(contract_id: ContractId, policy: CallbackFailurePolicy) -> Self {
        Self {
            contract_id,
            policy,
            contexts: HashMap::new(),
            cooldown: CooldownTracker::new(CooldownKind::DecryptionRequest),
        }
    }

    /// Dispatch a decryption of `batch_id`'s canonical ciphertexts and store
    /// a pending context under the oracle's request id.
    ///
    /// Role, pause and batch-id checks are the caller's.
    ///
    /// # Errors
    /// - `CooldownActive` if the caller requested too recently
    /// - `CiphertextNotInitialized` if the batch has no best path
    /// - any oracle dispatch error
    /// - `Internal` if the oracle's next id is already live, or it issues
    ///   an id other than the one it announced
    pub fn request(
        &mut self,
        ctx: &CallContext,
        batch_id: BatchId,
        cooldown_seconds: u64,
        store: &CiphertextStore,
        backend: &dyn HomomorphicBackend,
        oracle: &mut dyn DecryptionOracle,
    ) -> Result<DecryptionContext> {
        self.cooldown.check(&ctx.caller, ctx.now, cooldown_seconds)?;
        let ciphertexts = canonical_ciphertexts(store, backend, batch_id)?;
        let state_hash = compute_state_hash(&self.contract_id, backend, &ciphertexts);

        let reserved = oracle.peek_request_id();
        if self.contexts.contains_key(&reserved) {
            return Err(VeilrouteError::Internal(format!(
                "oracle would reissue request id {reserved}"
            )));
        }

        let target = CallbackTarget::decryption_callback(self.contract_id);
        let request_id = oracle.request_decryption(&ciphertexts, &target)?;
        // Only a faulty oracle gets here. Its job is already queued and is
        // judged against whatever context holds that id, if any.
        if request_id != reserved || self.contexts.contains_key(&request_id) {
            return Err(VeilrouteError::Internal(format!(
                "oracle returned request id {request_id}, reserved {reserved}"
            )));
        }

        let context =
            DecryptionContext::new(request_id, batch_id, state_hash, ctx.caller, ctx.now);
        self.contexts.insert(request_id, context.clone());
        self.cooldown.record(ctx.caller, ctx.now);
        tracing::debug!(
            %request_id,
            %batch_id,
            state_hash = %hex::encode(state_hash),
            "Decryption context stored"
        );
        Ok(context)
    }

    /// Validate an oracle callback and, if it holds, complete the context.
    ///
    /// Caller identity and pause checks are the caller's.
    ///
    /// # Errors
    /// `UnknownRequest`, `ReplayAttempt`, `StateMismatch`, `InvalidProof`
    /// or `MalformedCleartext`, in that order of precedence. Under
    /// [`CallbackFailurePolicy::InvalidateOnFailure`] the last three also
    /// move the context to `Rejected`.
    pub fn callback(
        &mut self,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &DecryptionProof,
        store: &CiphertextStore,
        backend: &dyn HomomorphicBackend,
        oracle: &dyn DecryptionOracle,
    ) -> Result<DecryptionOutcome> {
        let context = self
            .contexts
            .get(&request_id)
            .ok_or(VeilrouteError::UnknownRequest(request_id))?;
        if context.processed() {
            tracing::warn!(%request_id, status = %context.status, "Replayed decryption callback");
            return Err(VeilrouteError::ReplayAttempt(request_id));
        }
        let batch_id = context.batch_id;
        let policy = self.policy;
        let verdict = self.validate(context, cleartexts, proof, store, backend, oracle);

        let context = self.context_mut(request_id)?;
        match verdict {
            Ok(value) => {
                context.mark_completed()?;
                Ok(DecryptionOutcome {
                    request_id,
                    batch_id,
                    value,
                })
            }
            Err(err) => {
                tracing::warn!(%request_id, %batch_id, error = %err, "Decryption callback refused");
                if policy == CallbackFailurePolicy::InvalidateOnFailure {
                    context.mark_rejected()?;
                    tracing::warn!(%request_id, "Decryption context invalidated");
                }
                Err(err)
            }
        }
    }

    fn validate(
        &self,
        context: &DecryptionContext,
        cleartexts: &[u8],
        proof: &DecryptionProof,
        store: &CiphertextStore,
        backend: &dyn HomomorphicBackend,
        oracle: &dyn DecryptionOracle,
    ) -> Result<u64> {
        // Recompute over whatever the batch holds now, initialized or not.
        let current = [store.best_path(context.batch_id)];
        if compute_state_hash(&self.contract_id, backend, &current) != context.state_hash {
            return Err(VeilrouteError::StateMismatch {
                request_id: context.request_id,
                batch_id: context.batch_id,
            });
        }
        if !oracle.check_signatures(context.request_id, cleartexts, proof) {
            return Err(VeilrouteError::InvalidProof(context.request_id));
        }
        cleartext::decode_single(cleartexts)
    }

    fn context_mut(&mut self, request_id: RequestId) -> Result<&mut DecryptionContext> {
        self.contexts
            .get_mut(&request_id)
            .ok_or(VeilrouteError::UnknownRequest(request_id))
    }

    #[must_use]
    pub fn context(&self, request_id: RequestId) -> Option<&DecryptionContext> {
        self.contexts.get(&request_id)
    }

    /// Ids of contexts still waiting for a callback, ascending.
    #[must_use]
    pub fn pending_requests(&self) -> Vec<RequestId> {
        let mut pending: Vec<RequestId> = self
            .contexts
            .values()
            .filter(|c| !c.processed())
            .map(|c| c.request_id)
            .collect();
        pending.sort_unstable();
        pending
    }

    #[must_use]
    pub fn last_request(&self, account: &AccountId) -> Option<u64> {
        self.cooldown.last(account)
    }
}
