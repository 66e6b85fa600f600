//! JSON-RPC access for the submission path.
//!
//! # Responsibilities
//! - Hold the primary endpoint and any failovers, in priority order
//! - Answer the three reads submission needs: chain id, gas price, pending nonce
//! - Broadcast raw signed transactions
//! - Bound every call with the configured RPC timeout
//!
//! A call walks the endpoints in order and returns the first answer.
//! Transport failures and timeouts move on to the next endpoint; an
//! explicit rejection of a broadcast does not, since resending the same
//! bytes elsewhere cannot change the verdict.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::TransportResult;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};

type DynProvider = Arc<dyn Provider + Send + Sync>;

#[derive(Clone)]
struct Endpoint {
    url: String,
    provider: DynProvider,
}

/// RPC client over one primary and zero or more failover endpoints.
#[derive(Clone)]
pub struct BlockchainClient {
    endpoints: Vec<Endpoint>,
    config: BlockchainConfig,
    call_timeout: Duration,
}

impl BlockchainClient {
    /// Build providers for every configured endpoint.
    ///
    /// No request is made here; call [`verify_chain_id`](Self::verify_chain_id)
    /// to check connectivity. An invalid primary URL is an error, invalid
    /// failovers are skipped.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let primary: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let mut endpoints = vec![connect(primary)];

        for raw in &config.failover_urls {
            match raw.parse::<url::Url>() {
                Ok(url) => endpoints.push(connect(url)),
                Err(e) => tracing::warn!(url = %raw, error = %e, "Ignoring invalid failover RPC URL"),
            }
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = endpoints.len() - 1,
            chain_id = config.chain_id,
            "Blockchain client initialized"
        );

        Ok(Self {
            endpoints,
            call_timeout: Duration::from_secs(config.rpc_timeout_secs),
            config,
        })
    }

    /// Fail unless the endpoints serve the configured chain.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let ChainId(actual) = self.get_chain_id().await?;
        if actual != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            });
        }
        tracing::info!(chain_id = actual, "Chain id verified");
        Ok(())
    }

    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.first_answer("chain id", false, |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.first_answer("gas price", false, |p| async move { p.get_gas_price().await })
            .await
    }

    /// Next nonce for `address`, counting transactions still in the mempool.
    pub async fn get_pending_nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.first_answer("pending nonce", false, move |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    /// Broadcast an EIP-2718 encoded signed transaction.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        let raw = raw.to_vec();
        self.first_answer("broadcast", true, |p| {
            let raw = raw.clone();
            async move {
                p.send_raw_transaction(&raw)
                    .await
                    .map(|pending| *pending.tx_hash())
            }
        })
        .await
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    /// Run `call` against each endpoint until one answers.
    ///
    /// With `rejection_is_final`, a JSON-RPC error response ends the walk
    /// as a [`BlockchainError::Broadcast`].
    async fn first_answer<T, F, Fut>(
        &self,
        what: &'static str,
        rejection_is_final: bool,
        call: F,
    ) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for endpoint in &self.endpoints {
            match timeout(self.call_timeout, call(endpoint.provider.clone())).await {
                Ok(Ok(answer)) => return Ok(answer),
                Ok(Err(e)) if rejection_is_final && e.is_error_resp() => {
                    return Err(BlockchainError::Broadcast(e.to_string()));
                }
                Ok(Err(e)) => {
                    tracing::warn!(endpoint = %endpoint.url, call = what, error = %e, "RPC error, trying next endpoint");
                }
                Err(_) => {
                    tracing::warn!(endpoint = %endpoint.url, call = what, "RPC timeout, trying next endpoint");
                }
            }
        }
        Err(BlockchainError::Rpc(format!("All RPC endpoints failed: {}", what)))
    }
}

fn connect(url: url::Url) -> Endpoint {
    Endpoint {
        url: url.to_string(),
        provider: Arc::new(ProviderBuilder::new().connect_http(url)),
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("endpoints", &self.endpoints.iter().map(|e| &e.url).collect::<Vec<_>>())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
