//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the ledger
//! - Load the signing wallet and verify the RPC serves the configured chain
//! - Select collection and candidate adapters from configuration
//! - Assemble the pipeline
//!
//! Any error here is fatal: the process exits before a stage starts.

use std::sync::Arc;

use thiserror::Error;

use crate::blockchain::{BlockchainClient, BlockchainError, ChainSubmitter, Wallet};
use crate::config::{ScoutConfig, SourcesConfig};
use crate::pipeline::Pipeline;
use crate::sources::alchemy::AlchemySource;
use crate::sources::candidates::HttpCandidateSource;
use crate::sources::demo::{DemoCandidates, DemoCollections};
use crate::sources::opensea::OpenSeaSource;
use crate::sources::{http_client, AggregateSource, CandidateSource, CollectionSource, SourceError};
use crate::storage::{Ledger, StorageError};

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("ledger unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("signer unavailable: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("provider setup failed: {0}")]
    Source(#[from] SourceError),
}

/// Build every collaborator and wire the pipeline.
pub async fn build_pipeline(config: &ScoutConfig) -> Result<Pipeline, StartupError> {
    let ledger = Arc::new(Ledger::open(&config.storage.data_dir).await?);

    let wallet = Wallet::from_env(config.blockchain.chain_id)?;
    let client = BlockchainClient::new(config.blockchain.clone())?;
    client.verify_chain_id().await?;
    let submitter = Arc::new(ChainSubmitter::new(client, wallet));

    let http = http_client(config.sources.request_timeout_secs)?;
    let collections = collection_source(&config.sources, http.clone());
    let candidates = candidate_source(&config.sources, http);

    tracing::info!(
        collections = collections.name(),
        minter = %submitter.address(),
        "Pipeline assembled"
    );

    Ok(Pipeline::new(
        &config.pipeline,
        collections,
        candidates,
        ledger,
        submitter,
    ))
}

/// Pick the collection adapters. Without any provider key this is demo mode.
pub fn collection_source(sources: &SourcesConfig, http: reqwest::Client) -> Arc<dyn CollectionSource> {
    if sources.demo_mode {
        tracing::info!("Demo mode forced by configuration");
        return Arc::new(DemoCollections);
    }

    let mut providers: Vec<Arc<dyn CollectionSource>> = Vec::new();
    if let Some(key) = sources.opensea_api_key() {
        providers.push(Arc::new(OpenSeaSource::new(
            http.clone(),
            &sources.opensea_base_url,
            key,
            &sources.opensea_chain,
        )));
    }
    if let Some(key) = sources.alchemy_api_key() {
        providers.push(Arc::new(AlchemySource::new(
            http,
            &sources.alchemy_base_url,
            key,
            &sources.alchemy_owner,
        )));
    }

    if providers.is_empty() {
        tracing::info!("No API keys configured, running in DEMO mode with mock data");
        return Arc::new(DemoCollections);
    }
    Arc::new(AggregateSource::new(providers))
}

/// Pick the candidate adapter.
pub fn candidate_source(sources: &SourcesConfig, http: reqwest::Client) -> Arc<dyn CandidateSource> {
    match (&sources.candidate_api_url, sources.demo_mode) {
        (Some(url), false) => Arc::new(HttpCandidateSource::new(http, url)),
        _ => {
            tracing::info!("Using demo mint candidates");
            Arc::new(DemoCandidates)
        }
    }
}
