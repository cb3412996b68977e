//! VeilRoute simulator - entry point
//!
//! Wires a router to a mock homomorphic backend and an oracle committee,
//! spawns the decryption relayer as a separate task, and plays two rounds:
//! the reference batch and a stale-state overwrite.

mod config;
mod logging;
mod scenario;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use veilroute_core::{ConfidentialRouter, SharedRouter};
use veilroute_oracle::{MockFheBackend, OracleGateway, committee};
use veilroute_types::{CallbackPayload, constants};

use crate::{config::SimConfig, scenario::Simulation};

/// VeilRoute confidential batch router simulator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "VEILROUTE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging();
    info!("Starting {} simulator v{}", constants::ENGINE_NAME, constants::VERSION);

    let config = match &args.config {
        Some(path) => {
            info!(config_path = %path.display(), "Loading configuration");
            SimConfig::from_file(path)?
        }
        None => SimConfig::default(),
    };
    config.validate()?;

    let fhe = Arc::new(MockFheBackend::new());
    let (keyset, relayer) = committee(&config.committee, fhe.vault())?;
    let (gateway, mut jobs) = OracleGateway::new(keyset);
    let router = SharedRouter::new(ConfidentialRouter::new(
        config.router_config(),
        fhe.clone(),
        Box::new(gateway),
    )?);

    // Relayer: jobs in, signed payloads out. Ends when the gateway is dropped.
    let (payload_tx, payloads) = mpsc::unbounded_channel::<CallbackPayload>();
    let relayer_task = tokio::spawn(async move {
        while let Some(job) = jobs.recv().await {
            match relayer.fulfil(&job) {
                Ok(payload) => {
                    if payload_tx.send(payload).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(request_id = %job.request_id, error = %err, "Job dropped"),
            }
        }
    });

    let mut sim = Simulation::new(router, fhe, payloads, config);
    sim.enrol()?;
    let first = sim.batch_round().await?;
    let second = sim.stale_state_round().await?;
    sim.report()?;
    info!(
        first_batch = %first.batch_id,
        first_value = first.value,
        second_batch = %second.batch_id,
        second_value = second.value,
        "Rounds complete"
    );

    drop(sim);
    relayer_task.await?;
    Ok(())
}
