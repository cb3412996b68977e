//! `ConfidentialRouter`: one router instance and its public operations.
//!
//! Every operation takes an explicit [`CallContext`] and follows the same
//! shape: authorization, pause switch, operation preconditions, then the
//! writes and finally the event. Any error before the writes leaves the
//! router unchanged.

use std::sync::Arc;

use veilroute_types::{
    AccountId, BatchId, BatchPhase, BatchRecord, CallContext, CallbackPayload, Ciphertext,
    DecryptionContext, DecryptionOracle, DecryptionOutcome, DecryptionProof,
    EncryptedTradeRequest, EventRecord, HomomorphicBackend, RequestId, Result, RouterConfig,
    RouterEvent, VeilrouteError,
};

use crate::{
    AccessController, BatchLifecycle, BestPathStrategy, CiphertextStore, DecryptionProtocol,
    EventLog, RateBoard, RateEntry, SubmissionGate,
};

pub struct ConfidentialRouter {
    config: RouterConfig,
    access: AccessController,
    lifecycle: BatchLifecycle,
    store: CiphertextStore,
    gate: SubmissionGate,
    decryption: DecryptionProtocol,
    rates: RateBoard,
    events: EventLog,
    backend: Arc<dyn HomomorphicBackend>,
    oracle: Box<dyn DecryptionOracle>,
}

impl ConfidentialRouter {
    /// Build a router with the pass-through best-path strategy.
    ///
    /// # Errors
    /// `Configuration` if `config` fails validation.
    pub fn new(
        config: RouterConfig,
        backend: Arc<dyn HomomorphicBackend>,
        oracle: Box<dyn DecryptionOracle>,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            contract = %config.contract_id,
            owner = %config.owner,
            oracle = %config.oracle_account,
            cooldown_seconds = config.cooldown_seconds,
            policy = ?config.callback_failure_policy,
            "Router initialized"
        );
        Ok(Self {
            access: AccessController::new(config.owner, config.cooldown_seconds),
            lifecycle: BatchLifecycle::new(),
            store: CiphertextStore::new(),
            gate: SubmissionGate::default(),
            decryption: DecryptionProtocol::new(
                config.contract_id,
                config.callback_failure_policy,
            ),
            rates: RateBoard::new(config.max_rate_entries),
            events: EventLog::new(),
            backend,
            oracle,
            config,
        })
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn BestPathStrategy>) -> Self {
        self.gate.set_strategy(strategy);
        self
    }

    fn emit(&mut self, ctx: &CallContext, event: RouterEvent) {
        self.events.emit(ctx.now, event);
    }

    fn emit_if_changed(&mut self, ctx: &CallContext, event: Option<RouterEvent>) -> bool {
        match event {
            Some(event) => {
                self.emit(ctx, event);
                true
            }
            None => false,
        }
    }

    // =================================================================
    // Access control
    // =================================================================

    /// # Errors
    /// `NotOwner`, `Paused` or `ZeroAccount`.
    pub fn transfer_ownership(&mut self, ctx: &CallContext, new_owner: AccountId) -> Result<()> {
        let event = self.access.transfer_ownership(&ctx.caller, new_owner)?;
        self.emit(ctx, event);
        Ok(())
    }

    /// Returns `false` if `account` already was a provider.
    ///
    /// # Errors
    /// `NotOwner`, `Paused` or `ZeroAccount`.
    pub fn add_provider(&mut self, ctx: &CallContext, account: AccountId) -> Result<bool> {
        let event = self.access.add_provider(&ctx.caller, account)?;
        Ok(self.emit_if_changed(ctx, event))
    }

    /// Returns `false` if `account` was not a provider.
    ///
    /// # Errors
    /// `NotOwner` or `Paused`.
    pub fn remove_provider(&mut self, ctx: &CallContext, account: AccountId) -> Result<bool> {
        let event = self.access.remove_provider(&ctx.caller, account)?;
        Ok(self.emit_if_changed(ctx, event))
    }

    /// # Errors
    /// `NotOwner` or `Paused`.
    pub fn set_cooldown_seconds(&mut self, ctx: &CallContext, value: u64) -> Result<()> {
        let event = self.access.set_cooldown_seconds(&ctx.caller, value)?;
        self.emit(ctx, event);
        Ok(())
    }

    /// # Errors
    /// `NotOwner` or `Paused`.
    pub fn pause(&mut self, ctx: &CallContext) -> Result<()> {
        let event = self.access.pause(&ctx.caller)?;
        self.emit(ctx, event);
        Ok(())
    }

    /// # Errors
    /// `NotOwner` or `NotPaused`.
    pub fn unpause(&mut self, ctx: &CallContext) -> Result<()> {
        let event = self.access.unpause(&ctx.caller)?;
        self.emit(ctx, event);
        Ok(())
    }

    // =================================================================
    // Batch lifecycle
    // =================================================================

    /// Open the next batch and return its id.
    ///
    /// # Errors
    /// `NotOwner`, `Paused` or `BatchAlreadyOpen`.
    pub fn open_batch(&mut self, ctx: &CallContext) -> Result<BatchId> {
        self.access.ensure_owner(&ctx.caller)?;
        self.access.ensure_running()?;
        let event = self.lifecycle.open()?;
        self.emit(ctx, event);
        Ok(self.lifecycle.current_batch_id())
    }

    /// # Errors
    /// `NotOwner`, `Paused` or `BatchAlreadyClosed`.
    pub fn close_batch(&mut self, ctx: &CallContext) -> Result<BatchId> {
        self.access.ensure_owner(&ctx.caller)?;
        self.access.ensure_running()?;
        let event = self.lifecycle.close()?;
        self.emit(ctx, event);
        Ok(self.lifecycle.current_batch_id())
    }

    // =================================================================
    // Submission
    // =================================================================

    /// Store an encrypted trade request in the open batch and derive its
    /// best path. Overwrites any earlier request in the same batch.
    ///
    /// # Errors
    /// `NotProvider`, `Paused`, `BatchNotOpen`, `CooldownActive`,
    /// `CiphertextNotInitialized`, or a strategy error.
    pub fn submit_encrypted_trade_request(
        &mut self,
        ctx: &CallContext,
        request: EncryptedTradeRequest,
    ) -> Result<BatchId> {
        self.access.ensure_provider(&ctx.caller)?;
        self.access.ensure_running()?;
        let batch_id = self.lifecycle.require_open()?;
        let best_path = self.gate.admit(
            ctx,
            batch_id,
            self.access.cooldown_seconds(),
            self.backend.as_ref(),
            &request,
        )?;

        let event = self
            .gate
            .accept(ctx, batch_id, &mut self.store, request, best_path);
        self.emit(ctx, event);
        Ok(batch_id)
    }

    // =================================================================
    // Decryption
    // =================================================================

    /// Ask the oracle to decrypt the current batch's best path.
    ///
    /// # Errors
    /// `NotProvider`, `Paused`, `InvalidBatchId`, `CooldownActive`,
    /// `CiphertextNotInitialized`, an oracle error, or `Internal` on a
    /// reissued request id.
    pub fn request_decryption_for_batch(
        &mut self,
        ctx: &CallContext,
        batch_id: BatchId,
    ) -> Result<RequestId> {
        self.access.ensure_provider(&ctx.caller)?;
        self.access.ensure_running()?;
        self.lifecycle.require_current(batch_id)?;
        let context = self.decryption.request(
            ctx,
            batch_id,
            self.access.cooldown_seconds(),
            &self.store,
            self.backend.as_ref(),
            self.oracle.as_mut(),
        )?;

        self.emit(
            ctx,
            RouterEvent::DecryptionRequested {
                request_id: context.request_id,
                batch_id: context.batch_id,
                state_hash: context.state_hash,
            },
        );
        Ok(context.request_id)
    }

    /// Oracle entry point: validate and publish a decryption result.
    ///
    /// # Errors
    /// `Paused`, `NotOracle`, then the protocol errors of
    /// [`DecryptionProtocol::callback`].
    pub fn callback(
        &mut self,
        ctx: &CallContext,
        request_id: RequestId,
        cleartexts: &[u8],
        proof: &DecryptionProof,
    ) -> Result<DecryptionOutcome> {
        self.access.ensure_running()?;
        if ctx.caller != self.config.oracle_account {
            tracing::warn!(caller = %ctx.caller, %request_id, "Callback from non-oracle account");
            return Err(VeilrouteError::NotOracle(ctx.caller));
        }
        let outcome = self.decryption.callback(
            request_id,
            cleartexts,
            proof,
            &self.store,
            self.backend.as_ref(),
            self.oracle.as_ref(),
        )?;

        self.emit(
            ctx,
            RouterEvent::DecryptionCompleted {
                request_id: outcome.request_id,
                batch_id: outcome.batch_id,
                result: outcome.value,
            },
        );
        Ok(outcome)
    }

    /// [`Self::callback`] with a relayer payload.
    ///
    /// # Errors
    /// Same as [`Self::callback`].
    pub fn apply_callback(
        &mut self,
        ctx: &CallContext,
        payload: &CallbackPayload,
    ) -> Result<DecryptionOutcome> {
        self.callback(ctx, payload.request_id, &payload.cleartexts, &payload.proof)
    }

    // =================================================================
    // Rate board
    // =================================================================

    /// # Errors
    /// `NotProvider`, `Paused`, or `Configuration` from the board.
    pub fn publish_rate(
        &mut self,
        ctx: &CallContext,
        key: &str,
        ciphertext: Ciphertext,
    ) -> Result<()> {
        self.access.ensure_provider(&ctx.caller)?;
        self.access.ensure_running()?;
        self.rates.publish(ctx.caller, key, ciphertext, ctx.now)?;
        self.emit(
            ctx,
            RouterEvent::RatePublished {
                publisher: ctx.caller,
                key: key.to_owned(),
                ciphertext,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn rate(&self, key: &str) -> Option<&RateEntry> {
        self.rates.rate(key)
    }

    /// # Errors
    /// `Serialization` if encoding fails.
    pub fn rates_blob(&self) -> Result<String> {
        self.rates.rates_blob()
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.access.owner()
    }

    #[must_use]
    pub fn is_provider(&self, account: &AccountId) -> bool {
        self.access.is_provider(account)
    }

    #[must_use]
    pub fn providers(&self) -> Vec<AccountId> {
        self.access.providers()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.access.is_paused()
    }

    #[must_use]
    pub fn cooldown_seconds(&self) -> u64 {
        self.access.cooldown_seconds()
    }

    #[must_use]
    pub fn current_batch_id(&self) -> BatchId {
        self.lifecycle.current_batch_id()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lifecycle.is_open()
    }

    #[must_use]
    pub fn phase(&self) -> BatchPhase {
        self.lifecycle.phase()
    }

    #[must_use]
    pub fn batch(&self, batch_id: BatchId) -> Option<&BatchRecord> {
        self.store.get(batch_id)
    }

    #[must_use]
    pub fn best_path(&self, batch_id: BatchId) -> Ciphertext {
        self.store.best_path(batch_id)
    }

    #[must_use]
    pub fn context(&self, request_id: RequestId) -> Option<&DecryptionContext> {
        self.decryption.context(request_id)
    }

    #[must_use]
    pub fn pending_requests(&self) -> Vec<RequestId> {
        self.decryption.pending_requests()
    }

    #[must_use]
    pub fn last_submission(&self, account: &AccountId) -> Option<u64> {
        self.gate.last_submission(account)
    }

    #[must_use]
    pub fn last_decryption_request(&self, account: &AccountId) -> Option<u64> {
        self.decryption.last_request(account)
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.gate.strategy_name()
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn HomomorphicBackend> {
        &self.backend
    }

    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    #[must_use]
    pub fn events_since(&self, from: u64) -> &[EventRecord] {
        self.events.since(from)
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use veilroute_oracle::{MockFheBackend, OracleGateway, committee};
    use veilroute_types::{ContractId, OracleConfig};

    use super::*;

    fn owner() -> CallContext {
        CallContext::new(AccountId::derive("owner"), 1_000)
    }

    fn router() -> ConfidentialRouter {
        let fhe = MockFheBackend::new();
        let (keyset, _relayer) = committee(&OracleConfig::default(), fhe.vault()).unwrap();
        let (gateway, _jobs) = OracleGateway::new(keyset);
        let config = RouterConfig::new(
            ContractId::derive("router"),
            owner().caller,
            AccountId::derive("oracle"),
        );
        ConfidentialRouter::new(config, Arc::new(fhe), Box::new(gateway)).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let fhe = MockFheBackend::new();
        let (keyset, _relayer) = committee(&OracleConfig::default(), fhe.vault()).unwrap();
        let (gateway, _jobs) = OracleGateway::new(keyset);
        let config = RouterConfig::new(
            ContractId::derive("router"),
            AccountId::ZERO,
            AccountId::derive("oracle"),
        );
        assert!(matches!(
            ConfidentialRouter::new(config, Arc::new(fhe), Box::new(gateway)),
            Err(VeilrouteError::Configuration(_))
        ));
    }

    #[test]
    fn initial_state() {
        let r = router();
        assert_eq!(r.owner(), owner().caller);
        assert!(r.is_provider(&owner().caller));
        assert_eq!(r.current_batch_id(), BatchId(1));
        assert!(!r.is_open());
        assert!(!r.is_paused());
        assert_eq!(r.cooldown_seconds(), 10);
        assert_eq!(r.strategy_name(), "pass-through");
        assert!(r.events().is_empty());
    }

    #[test]
    fn idempotent_role_changes_emit_nothing() {
        let mut r = router();
        let p = AccountId::derive("p");
        assert!(r.add_provider(&owner(), p).unwrap());
        assert!(!r.add_provider(&owner(), p).unwrap());
        assert!(r.remove_provider(&owner(), p).unwrap());
        assert!(!r.remove_provider(&owner(), p).unwrap());
        let names: Vec<_> = r.events().iter().map(|e| e.event.name()).collect();
        assert_eq!(names, ["provider_added", "provider_removed"]);
    }

    #[test]
    fn open_and_close_return_batch_id() {
        let mut r = router();
        assert_eq!(r.open_batch(&owner()).unwrap(), BatchId(2));
        assert_eq!(r.close_batch(&owner()).unwrap(), BatchId(2));
        assert_eq!(r.open_batch(&owner()).unwrap(), BatchId(3));
    }

    #[test]
    fn only_owner_manages_batches() {
        let mut r = router();
        let p = AccountId::derive("p");
        r.add_provider(&owner(), p).unwrap();
        let ctx = CallContext::new(p, 1_000);
        assert!(matches!(r.open_batch(&ctx), Err(VeilrouteError::NotOwner(_))));
        assert!(!r.is_open());
    }

    #[test]
    fn publish_rate_is_provider_gated() {
        let mut r = router();
        let ct = r.backend().encrypt(3);
        let stranger = CallContext::new(AccountId::derive("stranger"), 1_000);
        assert!(matches!(
            r.publish_rate(&stranger, "ETH/USDC", ct),
            Err(VeilrouteError::NotProvider(_))
        ));
        r.publish_rate(&owner(), "ETH/USDC", ct).unwrap();
        assert_eq!(r.rate("ETH/USDC").unwrap().ciphertext, ct);
        assert!(r.rates_blob().unwrap().contains("ETH/USDC"));
        assert_eq!(r.events().last().unwrap().event.name(), "rate_published");
    }
}
