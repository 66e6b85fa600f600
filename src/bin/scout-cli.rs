use std::path::PathBuf;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde_json::json;

use nft_scout::storage::{Ledger, Persistence};

#[derive(Parser)]
#[command(name = "scout-cli")]
#[command(about = "Inspection CLI for the nft-scout ledger", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recorded mint transactions, newest first
    Transactions {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// List audit errors, newest first
    Errors {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// List discovered collections, most recently seen first
    Collections {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Check whether a contract has already been minted
    Check { contract: Address },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let ledger = Ledger::open(&cli.data_dir).await?;

    let output = match cli.command {
        Commands::Transactions { limit } => serde_json::to_value(ledger.recent_transactions(limit).await?)?,
        Commands::Errors { limit } => serde_json::to_value(ledger.recent_errors(limit).await?)?,
        Commands::Collections { limit } => serde_json::to_value(ledger.collections(limit))?,
        Commands::Check { contract } => {
            let minted = ledger.has_existing_transaction(contract).await?;
            json!({
                "contract": contract,
                "minted": minted,
                "transaction_hash": ledger.minted_hash(&contract),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
