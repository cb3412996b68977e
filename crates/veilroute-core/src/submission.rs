//! Submission gate: admits encrypted trade requests into the open batch.
//!
//! Admission is split in two so the router can stay all-or-nothing:
//! [`SubmissionGate::admit`] runs every check and derives the best path
//! without touching state, [`SubmissionGate::accept`] then writes.

use veilroute_types::{
    AccountId, BatchId, CallContext, Ciphertext, CooldownKind, EncryptedTradeRequest,
    HomomorphicBackend, Result, RouterEvent, VeilrouteError,
};

use crate::{CiphertextStore, CooldownTracker};

/// Derives the encrypted best path of a batch from its request.
///
/// Runs over ciphertexts only; implementations never see cleartext.
pub trait BestPathStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// # Errors
    /// Any error aborts the submission with no state change.
    fn derive_best_path(
        &self,
        backend: &dyn HomomorphicBackend,
        request: &EncryptedTradeRequest,
    ) -> Result<Ciphertext>;
}

/// Placeholder strategy: the best path is `token_a` unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughStrategy;

impl BestPathStrategy for PassThroughStrategy {
    fn name(&self) -> &'static str {
        "pass-through"
    }

    fn derive_best_path(
        &self,
        _backend: &dyn HomomorphicBackend,
        request: &EncryptedTradeRequest,
    ) -> Result<Ciphertext> {
        Ok(request.token_a)
    }
}

pub struct SubmissionGate {
    cooldown: CooldownTracker,
    strategy: Box<dyn BestPathStrategy>,
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new(Box::new(PassThroughStrategy))
    }
}

impl SubmissionGate {
    #[must_use]
    pub fn new(strategy: Box<dyn BestPathStrategy>) -> Self {
        Self {
            cooldown: CooldownTracker::new(CooldownKind::Submission),
            strategy,
        }
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn BestPathStrategy>) {
        self.strategy = strategy;
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Check cooldown and arguments, then derive the best path.
    ///
    /// # Errors
    /// - `CooldownActive` if the caller submitted less than
    ///   `cooldown_seconds` ago
    /// - `CiphertextNotInitialized` if any request field, or the derived
    ///   path, is not a live ciphertext
    /// - any error raised by the strategy
    pub fn admit(
        &self,
        ctx: &CallContext,
        batch_id: BatchId,
        cooldown_seconds: u64,
        backend: &dyn HomomorphicBackend,
        request: &EncryptedTradeRequest,
    ) -> Result<Ciphertext> {
        self.cooldown.check(&ctx.caller, ctx.now, cooldown_seconds)?;

        if !request.ciphertexts().iter().all(|ct| backend.is_initialized(ct)) {
            return Err(VeilrouteError::CiphertextNotInitialized(batch_id));
        }

        let best_path = self.strategy.derive_best_path(backend, request)?;
        if !backend.is_initialized(&best_path) {
            return Err(VeilrouteError::CiphertextNotInitialized(batch_id));
        }
        tracing::debug!(
            strategy = self.strategy.name(),
            %batch_id,
            best_path = %best_path,
            "Best path derived"
        );
        Ok(best_path)
    }

    /// Record the submission. Infallible; call only after [`Self::admit`].
    pub fn accept(
        &mut self,
        ctx: &CallContext,
        batch_id: BatchId,
        store: &mut CiphertextStore,
        request: EncryptedTradeRequest,
        best_path: Ciphertext,
    ) -> RouterEvent {
        self.cooldown.record(ctx.caller, ctx.now);
        store.put_request(batch_id, ctx.caller, request);
        store.set_best_path(batch_id, best_path);
        RouterEvent::TradeRequestSubmitted {
            submitter: ctx.caller,
            batch_id,
        }
    }

    /// Time of the account's last accepted submission.
    #[must_use]
    pub fn last_submission(&self, account: &AccountId) -> Option<u64> {
        self.cooldown.last(account)
    }
}

#[cfg(test)]
mod tests {
    use veilroute_oracle::MockFheBackend;

    use super::*;

    struct FailingStrategy;

    impl BestPathStrategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn derive_best_path(
            &self,
            _backend: &dyn HomomorphicBackend,
            _request: &EncryptedTradeRequest,
        ) -> Result<Ciphertext> {
            Err(VeilrouteError::Internal("no route".into()))
        }
    }

    fn request(fhe: &MockFheBackend) -> EncryptedTradeRequest {
        EncryptedTradeRequest::new(fhe.encrypt(5), fhe.encrypt(9), fhe.encrypt(100))
    }

    fn ctx(now: u64) -> CallContext {
        CallContext::new(AccountId::derive("provider"), now)
    }

    #[test]
    fn pass_through_returns_token_a() {
        let fhe = MockFheBackend::new();
        let req = request(&fhe);
        let gate = SubmissionGate::default();
        let best = gate.admit(&ctx(100), BatchId(2), 10, &fhe, &req).unwrap();
        assert_eq!(best, req.token_a);
        assert_eq!(gate.strategy_name(), "pass-through");
    }

    #[test]
    fn accept_stores_and_records_time() {
        let fhe = MockFheBackend::new();
        let req = request(&fhe);
        let mut gate = SubmissionGate::default();
        let mut store = CiphertextStore::new();

        let best = gate.admit(&ctx(100), BatchId(2), 10, &fhe, &req).unwrap();
        let ev = gate.accept(&ctx(100), BatchId(2), &mut store, req, best);

        assert_eq!(
            ev,
            RouterEvent::TradeRequestSubmitted {
                submitter: ctx(100).caller,
                batch_id: BatchId(2),
            }
        );
        assert_eq!(store.best_path(BatchId(2)), req.token_a);
        assert_eq!(gate.last_submission(&ctx(100).caller), Some(100));
    }

    #[test]
    fn cooldown_applies_after_accept() {
        let fhe = MockFheBackend::new();
        let req = request(&fhe);
        let mut gate = SubmissionGate::default();
        let mut store = CiphertextStore::new();
        gate.accept(&ctx(100), BatchId(2), &mut store, req, req.token_a);

        let err = gate.admit(&ctx(105), BatchId(2), 10, &fhe, &req).unwrap_err();
        assert!(matches!(
            err,
            VeilrouteError::CooldownActive {
                kind: CooldownKind::Submission,
                retry_at: 110,
            }
        ));
        assert!(gate.admit(&ctx(110), BatchId(2), 10, &fhe, &req).is_ok());
    }

    #[test]
    fn uninitialized_argument_rejected() {
        let fhe = MockFheBackend::new();
        let mut req = request(&fhe);
        req.amount = Ciphertext::UNINITIALIZED;
        let gate = SubmissionGate::default();
        assert!(matches!(
            gate.admit(&ctx(100), BatchId(2), 10, &fhe, &req),
            Err(VeilrouteError::CiphertextNotInitialized(BatchId(2)))
        ));
    }

    #[test]
    fn foreign_handle_rejected() {
        // A non-zero handle the backend never produced.
        let fhe = MockFheBackend::new();
        let mut req = request(&fhe);
        req.token_b = Ciphertext::dummy();
        let gate = SubmissionGate::default();
        assert!(gate.admit(&ctx(100), BatchId(2), 10, &fhe, &req).is_err());
    }

    #[test]
    fn strategy_error_propagates() {
        let fhe = MockFheBackend::new();
        let gate = SubmissionGate::new(Box::new(FailingStrategy));
        assert!(matches!(
            gate.admit(&ctx(100), BatchId(2), 10, &fhe, &request(&fhe)),
            Err(VeilrouteError::Internal(_))
        ));
    }
}
