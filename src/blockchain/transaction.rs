//! Transaction construction, signing and broadcast.
//!
//! # Responsibilities
//! - Describe a mint transaction (destination, zero value, call data, gas)
//! - Fetch the pending nonce and sign with EIP-155 replay protection
//! - Broadcast the signed envelope and return its hash
//!
//! Confirmation tracking is intentionally absent: a submission is done once
//! a node accepts the raw transaction.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Encodable2718;
use alloy::network::{Ethereum, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::Wallet;

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Unsigned mint transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub to: Address,
    pub value: U256,
    pub input: Bytes,
    pub gas_price: u128,
    pub gas_limit: u64,
}

impl MintRequest {
    /// A call to `to` carrying `input`, transferring no native value.
    pub fn new(to: Address, input: Bytes, gas_price: u128, gas_limit: u64) -> Self {
        Self {
            to,
            value: U256::ZERO,
            input,
            gas_price,
            gas_limit,
        }
    }
}

/// A signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Hash of the signed envelope.
    pub hash: TxHash,
    /// Nonce the transaction was signed with.
    pub nonce: u64,
    /// EIP-2718 encoded envelope.
    pub raw: Bytes,
}

/// Gas estimation, signing and broadcast for the submission stage.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Current gas price in wei.
    async fn estimate_gas_price(&self) -> BlockchainResult<u128>;

    /// Assign the account's pending nonce and sign.
    async fn build_and_sign(&self, request: MintRequest) -> BlockchainResult<SignedTransaction>;

    /// Send to the network; returns the transaction hash.
    async fn broadcast(&self, signed: &SignedTransaction) -> BlockchainResult<TxHash>;
}

/// Sign `request` with `nonce` as a legacy EIP-155 transaction.
pub async fn sign_request(
    wallet: &Wallet,
    request: MintRequest,
    nonce: u64,
) -> BlockchainResult<SignedTransaction> {
    let tx = TransactionRequest::default()
        .with_to(request.to)
        .with_value(request.value)
        .with_input(request.input)
        .with_nonce(nonce)
        .with_gas_price(request.gas_price)
        .with_gas_limit(request.gas_limit)
        .with_chain_id(wallet.chain_id());

    let envelope: TxEnvelope =
        <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &wallet.network_wallet())
            .await
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

    Ok(SignedTransaction {
        hash: *envelope.tx_hash(),
        nonce,
        raw: Bytes::from(envelope.encoded_2718()),
    })
}

/// [`Submitter`] backed by an RPC client and a local wallet.
#[derive(Debug, Clone)]
pub struct ChainSubmitter {
    client: BlockchainClient,
    wallet: Wallet,
}

impl ChainSubmitter {
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        Self { client, wallet }
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl Submitter for ChainSubmitter {
    async fn estimate_gas_price(&self) -> BlockchainResult<u128> {
        let gas_price = self.client.get_gas_price().await?;

        let max_gwei = self.client.config().max_gas_price_gwei;
        let gas_price_gwei = gas_price / WEI_PER_GWEI;
        if max_gwei > 0 && gas_price_gwei > max_gwei as u128 {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei,
            });
        }
        Ok(gas_price)
    }

    async fn build_and_sign(&self, request: MintRequest) -> BlockchainResult<SignedTransaction> {
        let nonce = self.client.get_pending_nonce(self.wallet.address()).await?;
        sign_request(&self.wallet, request, nonce).await
    }

    async fn broadcast(&self, signed: &SignedTransaction) -> BlockchainResult<TxHash> {
        let hash = self.client.send_raw_transaction(&signed.raw).await?;
        if hash != signed.hash {
            tracing::warn!(expected = %signed.hash, returned = %hash, "Node returned unexpected transaction hash");
        }
        Ok(hash)
    }
}
