//! The minting account.
//!
//! The key comes from `SCOUT_PRIVATE_KEY` and nowhere else. Only the
//! derived address is ever logged.

use std::fmt;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable holding the hex private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "SCOUT_PRIVATE_KEY";

/// Signing account bound to one chain for EIP-155 replay protection.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl Wallet {
    /// Parse a hex key, with or without `0x`, surrounding whitespace ignored.
    pub fn from_private_key(key: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let signer = key
            .parse::<PrivateKeySigner>()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?
            .with_chain_id(Some(chain_id));

        tracing::info!(address = %signer.address(), chain_id, "Minting account loaded");
        Ok(Self { signer, chain_id })
    }

    /// Load the key from [`PRIVATE_KEY_ENV_VAR`]. Missing or blank is an error.
    pub fn from_env(chain_id: u64) -> BlockchainResult<Self> {
        match std::env::var(PRIVATE_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => Self::from_private_key(&key, chain_id),
            _ => Err(BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))),
        }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Network wallet used to sign transaction requests.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Anvil account #0
    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_derives_known_address() {
        let wallet = Wallet::from_private_key(ANVIL_KEY, 31337).unwrap();
        assert_eq!(wallet.address(), ANVIL_ADDRESS.parse::<Address>().unwrap());
        assert_eq!(wallet.chain_id(), 31337);
    }

    #[test]
    fn test_accepts_prefix_and_whitespace() {
        let wallet = Wallet::from_private_key(&format!("  0x{}\n", ANVIL_KEY), 8453).unwrap();
        assert_eq!(wallet.address(), ANVIL_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = Wallet::from_private_key("invalid_key", 1).unwrap_err();
        assert!(err.to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_private_key(ANVIL_KEY, 1).unwrap();
        let shown = format!("{:?}", wallet);
        assert!(!shown.contains(ANVIL_KEY));
        assert!(shown.contains("chain_id"));
    }
}
