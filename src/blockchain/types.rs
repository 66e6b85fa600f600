//! Chain types and the blockchain error enum.

use thiserror::Error;

pub use crate::config::schema::BlockchainConfig;

/// Chain id as reported by an RPC endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Failures on the signing and broadcast path.
///
/// Each variant maps onto one submission step: `Rpc` and `GasPriceTooHigh`
/// surface while estimating, `Signing` while building, `Broadcast` when a
/// node rejects the transaction. `Wallet` and `ChainMismatch` only occur at
/// startup.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// No endpoint answered, or the answer could not be used.
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The transaction could not be assembled or signed.
    #[error("Signing error: {0}")]
    Signing(String),

    /// A node refused the signed transaction.
    #[error("Broadcast rejected: {0}")]
    Broadcast(String),

    #[error("Gas price {current_gwei} gwei exceeds ceiling {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

pub type BlockchainResult<T> = Result<T, BlockchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_base() {
        let config = BlockchainConfig::default();
        assert_eq!(config.chain_id, 8453);
        assert_eq!(ChainId::from(config.chain_id), ChainId(8453));
        assert_eq!(config.max_gas_price_gwei, 500);
    }

    #[test]
    fn test_error_messages() {
        let err = BlockchainError::ChainMismatch {
            expected: 8453,
            actual: 1,
        };
        assert_eq!(err.to_string(), "Chain ID mismatch: expected 8453, got 1");

        let err = BlockchainError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert_eq!(err.to_string(), "Gas price 600 gwei exceeds ceiling 500 gwei");
    }
}
