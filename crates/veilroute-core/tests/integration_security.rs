//! Integration test: access and callback integrity
//!
//! Verifies that:
//! 1. Only providers submit and request decryption
//! 2. Only the configured oracle account delivers callbacks
//! 3. Proofs must reach the oracle key set's threshold
//! 4. Each request id completes at most once
//! 5. The pause switch blocks every mutating call except unpause
//! 6. Failure policies decide whether a refused callback burns the request
//! 7. A misbehaving oracle cannot overwrite a live context

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use tokio::sync::mpsc::UnboundedReceiver;
use veilroute_core::ConfidentialRouter;
use veilroute_oracle::{DecryptionRelayer, MockFheBackend, OracleGateway, committee};
use veilroute_types::*;

const T0: u64 = 1_700_000_000;

struct World {
    router: ConfidentialRouter,
    fhe: Arc<MockFheBackend>,
    relayer: DecryptionRelayer,
    jobs: UnboundedReceiver<DecryptionJob>,
}

fn owner() -> CallContext {
    CallContext::new(AccountId::derive("owner"), T0)
}

fn provider() -> CallContext {
    CallContext::new(AccountId::derive("provider"), T0)
}

fn oracle() -> CallContext {
    CallContext::new(AccountId::derive("oracle"), T0)
}

fn stranger() -> CallContext {
    CallContext::new(AccountId::derive("stranger"), T0)
}

fn world(policy: CallbackFailurePolicy) -> World {
    let fhe = Arc::new(MockFheBackend::new());
    let (keyset, relayer) = committee(&OracleConfig::default(), fhe.vault()).unwrap();
    let (gateway, jobs) = OracleGateway::new(keyset);
    let config = RouterConfig::new(ContractId::derive("router"), owner().caller, oracle().caller)
        .with_policy(policy);
    let mut router = ConfidentialRouter::new(config, fhe.clone(), Box::new(gateway)).unwrap();
    router.add_provider(&owner(), provider().caller).unwrap();
    World {
        router,
        fhe,
        relayer,
        jobs,
    }
}

impl World {
    fn request(&self, token_a: u64) -> EncryptedTradeRequest {
        EncryptedTradeRequest::new(
            self.fhe.encrypt(token_a),
            self.fhe.encrypt(9),
            self.fhe.encrypt(100),
        )
    }

    /// Open a batch, submit, request decryption. Returns the request id and
    /// the relayer's signed answer.
    fn pending(&mut self, token_a: u64) -> (RequestId, CallbackPayload) {
        self.router.open_batch(&owner()).unwrap();
        let req = self.request(token_a);
        self.router
            .submit_encrypted_trade_request(&provider(), req)
            .unwrap();
        let batch_id = self.router.current_batch_id();
        let r = self
            .router
            .request_decryption_for_batch(&provider(), batch_id)
            .unwrap();
        let job = self.jobs.try_recv().unwrap();
        (r, self.relayer.fulfil(&job).unwrap())
    }
}

// =========================================================================
// 1. Provider gating
// =========================================================================

#[test]
fn non_provider_cannot_submit_or_request() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    w.router.open_batch(&owner()).unwrap();
    let req = w.request(5);

    assert!(matches!(
        w.router.submit_encrypted_trade_request(&stranger(), req),
        Err(VeilrouteError::NotProvider(a)) if a == stranger().caller
    ));
    assert!(w.router.batch(BatchId(2)).is_none());

    w.router
        .submit_encrypted_trade_request(&provider(), req)
        .unwrap();
    assert!(matches!(
        w.router.request_decryption_for_batch(&stranger(), BatchId(2)),
        Err(VeilrouteError::NotProvider(_))
    ));
    assert!(w.router.pending_requests().is_empty());
}

#[test]
fn removed_provider_loses_access() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    w.router.open_batch(&owner()).unwrap();
    w.router.remove_provider(&owner(), provider().caller).unwrap();
    let req = w.request(5);
    assert!(matches!(
        w.router.submit_encrypted_trade_request(&provider(), req),
        Err(VeilrouteError::NotProvider(_))
    ));
}

#[test]
fn added_account_repeats_refused_call_successfully() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    w.router.open_batch(&owner()).unwrap();
    let applicant = stranger();
    let req = w.request(5);

    assert!(matches!(
        w.router.submit_encrypted_trade_request(&applicant, req),
        Err(VeilrouteError::NotProvider(a)) if a == applicant.caller
    ));
    assert!(w.router.add_provider(&owner(), applicant.caller).unwrap());

    assert_eq!(
        w.router
            .submit_encrypted_trade_request(&applicant, req)
            .unwrap(),
        BatchId(2)
    );
    assert_eq!(w.router.best_path(BatchId(2)), req.token_a);
    assert_eq!(w.router.last_submission(&applicant.caller), Some(T0));
}

#[test]
fn provider_cannot_administer() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let p = provider();
    assert!(matches!(w.router.pause(&p), Err(VeilrouteError::NotOwner(_))));
    assert!(matches!(
        w.router.add_provider(&p, stranger().caller),
        Err(VeilrouteError::NotOwner(_))
    ));
    assert!(matches!(
        w.router.set_cooldown_seconds(&p, 0),
        Err(VeilrouteError::NotOwner(_))
    ));
    assert!(matches!(
        w.router.transfer_ownership(&p, p.caller),
        Err(VeilrouteError::NotOwner(_))
    ));
    assert_eq!(w.router.owner(), owner().caller);
}

#[test]
fn ownership_transfer_moves_admin_rights() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let next = CallContext::new(AccountId::derive("next-owner"), T0);
    w.router.transfer_ownership(&owner(), next.caller).unwrap();

    assert!(w.router.open_batch(&owner()).is_err());
    assert_eq!(w.router.open_batch(&next).unwrap(), BatchId(2));
    // Roles are untouched by the transfer.
    assert!(w.router.is_provider(&owner().caller));
    assert!(!w.router.is_provider(&next.caller));
}

// =========================================================================
// 2. Oracle identity
// =========================================================================

#[test]
fn callback_from_non_oracle_rejected() {
    let mut w = world(CallbackFailurePolicy::InvalidateOnFailure);
    let (r, payload) = w.pending(5);

    for caller in [provider(), owner(), stranger()] {
        assert!(matches!(
            w.router.apply_callback(&caller, &payload),
            Err(VeilrouteError::NotOracle(_))
        ));
    }
    // Not even the invalidate policy burns the request on an identity failure.
    assert_eq!(w.router.context(r).unwrap().status, ContextStatus::Pending);
    assert!(w.router.apply_callback(&oracle(), &payload).is_ok());
}

#[test]
fn unknown_request_rejected() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (_r, payload) = w.pending(5);
    assert!(matches!(
        w.router
            .callback(&oracle(), RequestId(99), &payload.cleartexts, &payload.proof),
        Err(VeilrouteError::UnknownRequest(RequestId(99)))
    ));
}

// =========================================================================
// 3. Proof threshold
// =========================================================================

#[test]
fn proof_from_foreign_committee_rejected() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, payload) = w.pending(5);
    let (_keys, imposter) = committee(&OracleConfig::default(), w.fhe.vault()).unwrap();
    let forged = imposter.sign(r, &payload.cleartexts);

    assert!(matches!(
        w.router.callback(&oracle(), r, &payload.cleartexts, &forged),
        Err(VeilrouteError::InvalidProof(id)) if id == r
    ));
    assert_eq!(w.router.context(r).unwrap().status, ContextStatus::Pending);
}

#[test]
fn tampered_cleartext_rejected() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, payload) = w.pending(5);
    let tampered = cleartext::encode_words(&[6]);
    assert!(matches!(
        w.router.callback(&oracle(), r, &tampered, &payload.proof),
        Err(VeilrouteError::InvalidProof(_))
    ));
}

#[test]
fn single_signature_below_threshold_rejected() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, payload) = w.pending(5);
    let mut proof = payload.proof.clone();
    proof.signatures.truncate(1);
    assert!(matches!(
        w.router.callback(&oracle(), r, &payload.cleartexts, &proof),
        Err(VeilrouteError::InvalidProof(_))
    ));

    // Threshold 2 of 3 is enough.
    proof = payload.proof.clone();
    proof.signatures.truncate(2);
    assert!(w.router.callback(&oracle(), r, &payload.cleartexts, &proof).is_ok());
}

// =========================================================================
// 4. At-most-once completion
// =========================================================================

#[test]
fn second_callback_is_replay_even_with_new_payload() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, payload) = w.pending(5);
    w.router.apply_callback(&oracle(), &payload).unwrap();

    let other = cleartext::encode_words(&[42]);
    let proof = w.relayer.sign(r, &other);
    assert!(matches!(
        w.router.callback(&oracle(), r, &other, &proof),
        Err(VeilrouteError::ReplayAttempt(_))
    ));
    let completed = w
        .router
        .events()
        .iter()
        .filter(|e| e.event.name() == "decryption_completed")
        .count();
    assert_eq!(completed, 1);
}

// =========================================================================
// 5. Pause switch
// =========================================================================

#[test]
fn pause_blocks_mutations_until_unpaused() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, payload) = w.pending(5);
    w.router.close_batch(&owner()).unwrap();
    w.router.pause(&owner()).unwrap();
    let req = w.request(5);

    assert!(matches!(
        w.router.submit_encrypted_trade_request(&provider(), req),
        Err(VeilrouteError::Paused)
    ));
    assert!(matches!(
        w.router.request_decryption_for_batch(&provider().at(T0 + 60), BatchId(2)),
        Err(VeilrouteError::Paused)
    ));
    assert!(matches!(
        w.router.apply_callback(&oracle(), &payload),
        Err(VeilrouteError::Paused)
    ));
    assert!(matches!(w.router.open_batch(&owner()), Err(VeilrouteError::Paused)));
    assert!(matches!(
        w.router.publish_rate(&provider(), "ETH/USDC", req.token_a),
        Err(VeilrouteError::Paused)
    ));
    assert!(matches!(w.router.pause(&owner()), Err(VeilrouteError::Paused)));
    assert!(matches!(
        w.router.unpause(&provider()),
        Err(VeilrouteError::NotOwner(_))
    ));

    w.router.unpause(&owner()).unwrap();
    assert!(matches!(w.router.unpause(&owner()), Err(VeilrouteError::NotPaused)));
    assert_eq!(w.router.apply_callback(&oracle(), &payload).unwrap().request_id, r);
}

#[test]
fn submission_resumes_after_unpause() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    w.router.open_batch(&owner()).unwrap();
    w.router.pause(&owner()).unwrap();
    let req = w.request(5);

    assert!(matches!(
        w.router.submit_encrypted_trade_request(&provider(), req),
        Err(VeilrouteError::Paused)
    ));
    assert!(w.router.batch(BatchId(2)).is_none());

    w.router.unpause(&owner()).unwrap();
    assert_eq!(
        w.router
            .submit_encrypted_trade_request(&provider(), req)
            .unwrap(),
        BatchId(2)
    );
    assert_eq!(w.router.batch(BatchId(2)).unwrap().submissions, 1);
}

// =========================================================================
// 6. Failure policies
// =========================================================================

#[test]
fn retryable_policy_keeps_request_alive() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, payload) = w.pending(5);
    assert!(w
        .router
        .callback(&oracle(), r, &payload.cleartexts, &DecryptionProof::default())
        .is_err());
    assert_eq!(w.router.pending_requests(), vec![r]);
    assert_eq!(w.router.apply_callback(&oracle(), &payload).unwrap().value, 5);
}

#[test]
fn invalidate_policy_burns_request() {
    let mut w = world(CallbackFailurePolicy::InvalidateOnFailure);
    let (r, payload) = w.pending(5);
    assert!(matches!(
        w.router
            .callback(&oracle(), r, &payload.cleartexts, &DecryptionProof::default()),
        Err(VeilrouteError::InvalidProof(_))
    ));
    assert_eq!(w.router.context(r).unwrap().status, ContextStatus::Rejected);
    assert!(w.router.pending_requests().is_empty());
    assert!(matches!(
        w.router.apply_callback(&oracle(), &payload),
        Err(VeilrouteError::ReplayAttempt(_))
    ));
}

#[test]
fn malformed_cleartext_rejected() {
    let mut w = world(CallbackFailurePolicy::Retryable);
    let (r, _payload) = w.pending(5);

    // Signed, but the high bytes of the word are set.
    let mut wide = vec![0u8; 32];
    wide[0] = 1;
    let proof = w.relayer.sign(r, &wide);
    assert!(matches!(
        w.router.callback(&oracle(), r, &wide, &proof),
        Err(VeilrouteError::MalformedCleartext { .. })
    ));

    let short = vec![5u8; 8];
    let proof = w.relayer.sign(r, &short);
    assert!(matches!(
        w.router.callback(&oracle(), r, &short, &proof),
        Err(VeilrouteError::MalformedCleartext { .. })
    ));
}

// =========================================================================
// 7. Misbehaving oracle
// =========================================================================

/// Oracle that hands out the same request id every time.
struct StuckOracle {
    queued: Arc<AtomicUsize>,
}

impl DecryptionOracle for StuckOracle {
    fn peek_request_id(&self) -> RequestId {
        RequestId(7)
    }

    fn request_decryption(
        &mut self,
        _ciphertexts: &[Ciphertext],
        _callback: &CallbackTarget,
    ) -> Result<RequestId> {
        self.queued.fetch_add(1, Ordering::SeqCst);
        Ok(RequestId(7))
    }

    fn check_signatures(&self, _: RequestId, _: &[u8], _: &DecryptionProof) -> bool {
        true
    }
}

/// Oracle whose queue is down.
struct DownOracle;

impl DecryptionOracle for DownOracle {
    fn peek_request_id(&self) -> RequestId {
        RequestId(1)
    }

    fn request_decryption(&mut self, _: &[Ciphertext], _: &CallbackTarget) -> Result<RequestId> {
        Err(VeilrouteError::OracleUnavailable {
            reason: "queue offline".into(),
        })
    }

    fn check_signatures(&self, _: RequestId, _: &[u8], _: &DecryptionProof) -> bool {
        false
    }
}

/// Oracle whose issued ids disagree with the id it announced.
struct DriftingOracle;

impl DecryptionOracle for DriftingOracle {
    fn peek_request_id(&self) -> RequestId {
        RequestId(1)
    }

    fn request_decryption(&mut self, _: &[Ciphertext], _: &CallbackTarget) -> Result<RequestId> {
        Ok(RequestId(2))
    }

    fn check_signatures(&self, _: RequestId, _: &[u8], _: &DecryptionProof) -> bool {
        true
    }
}

fn router_with(
    oracle_impl: Box<dyn DecryptionOracle>,
) -> (ConfidentialRouter, Arc<MockFheBackend>) {
    let fhe = Arc::new(MockFheBackend::new());
    let config = RouterConfig::new(ContractId::derive("router"), owner().caller, oracle().caller)
        .with_cooldown(0);
    let mut router = ConfidentialRouter::new(config, fhe.clone(), oracle_impl).unwrap();
    router.open_batch(&owner()).unwrap();
    let req = EncryptedTradeRequest::new(fhe.encrypt(5), fhe.encrypt(9), fhe.encrypt(100));
    router.submit_encrypted_trade_request(&owner(), req).unwrap();
    (router, fhe)
}

#[test]
fn reissued_request_id_does_not_overwrite_context() {
    let queued = Arc::new(AtomicUsize::new(0));
    let (mut router, _fhe) = router_with(Box::new(StuckOracle {
        queued: queued.clone(),
    }));
    let r = router
        .request_decryption_for_batch(&owner(), BatchId(2))
        .unwrap();
    assert_eq!(r, RequestId(7));
    let original = router.context(r).unwrap().clone();
    let events = router.events().len();

    assert!(matches!(
        router.request_decryption_for_batch(&owner(), BatchId(2)),
        Err(VeilrouteError::Internal(_))
    ));
    assert_eq!(router.context(r), Some(&original));
    assert_eq!(router.events().len(), events);
    // Refused before dispatch: no second job reached the oracle.
    assert_eq!(queued.load(Ordering::SeqCst), 1);
}

#[test]
fn oracle_outage_leaves_no_trace() {
    let (mut router, _fhe) = router_with(Box::new(DownOracle));
    assert!(matches!(
        router.request_decryption_for_batch(&owner(), BatchId(2)),
        Err(VeilrouteError::OracleUnavailable { .. })
    ));
    assert!(router.pending_requests().is_empty());
    assert_eq!(router.last_decryption_request(&owner().caller), None);
    assert!(!router
        .events()
        .iter()
        .any(|e| e.event.name() == "decryption_requested"));
}

#[test]
fn unreserved_request_id_is_refused() {
    let (mut router, _fhe) = router_with(Box::new(DriftingOracle));
    assert!(matches!(
        router.request_decryption_for_batch(&owner(), BatchId(2)),
        Err(VeilrouteError::Internal(_))
    ));
    assert!(router.context(RequestId(2)).is_none());
    assert!(router.pending_requests().is_empty());
    assert_eq!(router.last_decryption_request(&owner().caller), None);
}
