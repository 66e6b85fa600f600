//! NFT scout
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   Vec<Collection>   ┌──────────────┐   SelectedItem   ┌──────────────┐
//!   │  discovery   │────[queue: 4]──────▶│  selection   │───[queue: 4]────▶│  submission  │
//!   │ (poll timer) │                     │ (min units)  │                  │ (dedup+sign) │
//!   └──────┬───────┘                     └──────┬───────┘                  └──────┬───────┘
//!          │                                    │                                 │
//!          ▼                                    ▼                                 ▼
//!   collection source                    candidate source               ledger + RPC signer
//!   (Alchemy / OpenSea / demo)           (HTTP / demo)
//!
//!   one shutdown signal, observed by every stage at every wait
//! ```

use std::path::PathBuf;

use clap::Parser;

use nft_scout::config::{load_config, ScoutConfig};
use nft_scout::lifecycle::{build_pipeline, signals, Shutdown};
use nft_scout::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "nft-scout")]
#[command(about = "Discovers new NFT collections and mints the cheapest candidate once per contract", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use demo collections and candidates regardless of configured providers.
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ScoutConfig::default(),
    };
    if args.demo {
        config.sources.demo_mode = true;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("nft-scout v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        poll_interval_secs = config.pipeline.poll_interval_secs,
        queue_capacity = config.pipeline.queue_capacity,
        gas_limit = config.pipeline.gas_limit,
        chain_id = config.blockchain.chain_id,
        data_dir = %config.storage.data_dir,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let pipeline = match build_pipeline(&config).await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let shutdown = Shutdown::new();
    let running = pipeline.run(&shutdown);
    tokio::pin!(running);

    tokio::select! {
        _ = &mut running => {
            tracing::warn!("Pipeline exited on its own");
        }
        _ = signals::wait_for_shutdown_signal() => {
            tracing::info!("Shutting down gracefully...");
            shutdown.trigger();
            running.await;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
