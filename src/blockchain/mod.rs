//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) + [blockchain] config (RPC URLs)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (gas price, nonce, sign, broadcast)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use transaction::{ChainSubmitter, MintRequest, SignedTransaction, Submitter};
pub use types::{BlockchainConfig, BlockchainError, BlockchainResult, ChainId};
pub use wallet::Wallet;
