//! Upstream data types and error definitions.

use std::collections::BTreeSet;

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A discovered contract eligible for a mint attempt.
///
/// Identity is the contract address. A collection is never mutated after
/// creation; a later fetch of the same contract supersedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Contract address (identity key).
    pub contract_address: Address,
    /// Deployer address when the provider reports one.
    pub deployer_address: Option<Address>,
    /// Display name.
    pub name: String,
    /// Flags raised against this collection by the provider (spam, reported, ...).
    #[serde(default)]
    pub reported_flags: BTreeSet<String>,
}

impl Collection {
    /// Create a collection with no deployer and no flags.
    pub fn new(contract_address: Address, name: impl Into<String>) -> Self {
        Self {
            contract_address,
            deployer_address: None,
            name: name.into(),
            reported_flags: BTreeSet::new(),
        }
    }

    /// Whether any provider flagged this collection.
    pub fn is_reported(&self) -> bool {
        !self.reported_flags.is_empty()
    }
}

/// One possible mint transaction for a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Contract the mint call is sent to.
    pub destination: Address,
    /// Call data.
    pub payload: Bytes,
    /// Number of units minted, as reported upstream (parsed during selection).
    pub unit_count: String,
    /// Native value quoted upstream as a decimal string. Informational only.
    pub native_value: String,
}

/// Errors that can occur while talking to an upstream provider.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport or status error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a body we could not interpret.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Every configured provider failed on the same fetch.
    #[error("All providers failed: {0}")]
    AllProvidersFailed(String),
}

/// Result type for provider operations.
pub type SourceResult<T> = Result<T, SourceError>;
