//! Scripted runs against a live router and relayer.
//!
//! The router side is driven here; the relayer runs as its own task and
//! answers through the payload channel, so every callback arrives
//! asynchronously just as it would from an off-ledger oracle.

use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use veilroute_core::SharedRouter;
use veilroute_oracle::MockFheBackend;
use veilroute_types::{
    AccountId, BatchId, CallContext, CallbackPayload, DecryptionOutcome, EncryptedTradeRequest,
    HomomorphicBackend, RequestId, VeilrouteError,
};

use crate::config::SimConfig;

pub struct Simulation {
    pub router: SharedRouter,
    pub fhe: Arc<MockFheBackend>,
    pub payloads: UnboundedReceiver<CallbackPayload>,
    pub config: SimConfig,
    clock: u64,
}

impl Simulation {
    pub fn new(
        router: SharedRouter,
        fhe: Arc<MockFheBackend>,
        payloads: UnboundedReceiver<CallbackPayload>,
        config: SimConfig,
    ) -> Self {
        let clock = config.start_time;
        Self {
            router,
            fhe,
            payloads,
            config,
            clock,
        }
    }

    fn tick(&mut self, seconds: u64) -> u64 {
        self.clock += seconds;
        self.clock
    }

    fn as_owner(&self) -> CallContext {
        CallContext::new(self.config.owner_id(), self.clock)
    }

    fn as_oracle(&self) -> CallContext {
        CallContext::new(self.config.oracle_id(), self.clock)
    }

    fn as_account(&self, account: AccountId) -> CallContext {
        CallContext::new(account, self.clock)
    }

    fn encrypt_trade(&self, token_a: u64, token_b: u64, amount: u64) -> EncryptedTradeRequest {
        EncryptedTradeRequest::new(
            self.fhe.encrypt(token_a),
            self.fhe.encrypt(token_b),
            self.fhe.encrypt(amount),
        )
    }

    async fn next_payload(&mut self, expected: RequestId) -> anyhow::Result<CallbackPayload> {
        let payload = self
            .payloads
            .recv()
            .await
            .context("relayer stopped before answering")?;
        if payload.request_id != expected {
            bail!(
                "relayer answered {} while waiting for {expected}",
                payload.request_id
            );
        }
        Ok(payload)
    }

    /// Enrol providers. Idempotent.
    pub fn enrol(&mut self) -> anyhow::Result<()> {
        let owner = self.as_owner();
        let providers = self.config.provider_ids();
        self.router.execute(|r| {
            for p in providers {
                r.add_provider(&owner, p)?;
            }
            Ok::<_, VeilrouteError>(())
        })?;
        Ok(())
    }

    /// Open a batch, submit the configured trade, close, decrypt, then try
    /// to replay the oracle's answer.
    pub async fn batch_round(&mut self) -> anyhow::Result<DecryptionOutcome> {
        let trade = self.config.trade;
        let provider = self.config.provider_ids()[0];

        let owner = self.as_owner();
        let batch_id = self.router.execute(|r| r.open_batch(&owner))?;
        info!(%batch_id, "Round started");

        self.tick(1);
        let req = self.encrypt_trade(trade.token_a, trade.token_b, trade.amount);
        let submitter = self.as_account(provider);
        self.router
            .execute(|r| r.submit_encrypted_trade_request(&submitter, req))?;

        self.tick(1);
        let owner = self.as_owner();
        self.router.execute(|r| r.close_batch(&owner))?;

        self.tick(1);
        let requester = self.as_account(provider);
        let request_id = self
            .router
            .execute(|r| r.request_decryption_for_batch(&requester, batch_id))?;

        let payload = self.next_payload(request_id).await?;
        self.tick(1);
        let oracle = self.as_oracle();
        let outcome = self.router.execute(|r| r.apply_callback(&oracle, &payload))?;
        info!(
            request_id = %outcome.request_id,
            batch_id = %outcome.batch_id,
            value = outcome.value,
            "Best path decrypted"
        );

        match self.router.execute(|r| r.apply_callback(&oracle, &payload)) {
            Err(err @ VeilrouteError::ReplayAttempt(_)) => {
                info!(error = %err, "Replayed callback refused as expected");
            }
            other => bail!("replay was not refused: {other:?}"),
        }
        Ok(outcome)
    }

    /// A second provider overwrites the batch while a decryption is in
    /// flight; the stale answer must be refused, a fresh request succeeds.
    pub async fn stale_state_round(&mut self) -> anyhow::Result<DecryptionOutcome> {
        let providers = self.config.provider_ids();
        let (first, second) = (providers[0], providers[1]);
        let cooldown = self.router.read(|r| r.cooldown_seconds());

        self.tick(cooldown);
        let owner = self.as_owner();
        let batch_id: BatchId = self.router.execute(|r| r.open_batch(&owner))?;
        info!(%batch_id, "Stale-state round started");

        let req = self.encrypt_trade(11, 9, 100);
        let ctx = self.as_account(first);
        self.router
            .execute(|r| r.submit_encrypted_trade_request(&ctx, req))?;
        let stale = self
            .router
            .execute(|r| r.request_decryption_for_batch(&ctx, batch_id))?;

        self.tick(1);
        let overwrite = self.encrypt_trade(13, 9, 100);
        let ctx = self.as_account(second);
        self.router
            .execute(|r| r.submit_encrypted_trade_request(&ctx, overwrite))?;

        let stale_payload = self.next_payload(stale).await?;
        let oracle = self.as_oracle();
        match self
            .router
            .execute(|r| r.apply_callback(&oracle, &stale_payload))
        {
            Err(err @ VeilrouteError::StateMismatch { .. }) => {
                warn!(error = %err, "Stale decryption refused");
            }
            other => bail!("stale callback was not refused: {other:?}"),
        }

        self.tick(cooldown);
        let ctx = self.as_account(first);
        let fresh = self
            .router
            .execute(|r| r.request_decryption_for_batch(&ctx, batch_id))?;
        let payload = self.next_payload(fresh).await?;
        let oracle = self.as_oracle();
        let outcome = self.router.execute(|r| r.apply_callback(&oracle, &payload))?;
        info!(
            request_id = %outcome.request_id,
            value = outcome.value,
            "Fresh decryption accepted"
        );
        Ok(outcome)
    }

    /// Dump the event log as JSON lines.
    pub fn report(&self) -> anyhow::Result<()> {
        let records = self.router.read(|r| r.events().to_vec());
        for record in &records {
            let line = serde_json::to_string(record)?;
            info!(target: "veilroute::events", "{line}");
        }
        let pending = self.router.read(|r| r.pending_requests());
        info!(events = records.len(), pending = pending.len(), "Simulation finished");
        Ok(())
    }
}
