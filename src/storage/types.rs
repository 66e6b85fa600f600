//! Persisted record types and storage errors.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Durable marker that a contract has been minted. At most one per contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Collection display name.
    pub name: String,
    /// Contract address (dedup key).
    pub contract_address: Address,
    /// Units minted by the submitted transaction.
    pub unit_count: u64,
    /// Hash returned by the broadcast.
    pub transaction_hash: TxHash,
    /// Unix seconds when the record was written.
    pub recorded_at: u64,
}

/// Tag attached to every audit error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    CollectionFetch,
    CandidateFetch,
    NoItems,
    InvalidUnitCount,
    CollectionStore,
    DedupCheck,
    GasEstimate,
    TransactionBuild,
    Broadcast,
    PersistTransaction,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CollectionFetch => "collection_fetch",
            ErrorKind::CandidateFetch => "candidate_fetch",
            ErrorKind::NoItems => "no_items",
            ErrorKind::InvalidUnitCount => "invalid_unit_count",
            ErrorKind::CollectionStore => "collection_store",
            ErrorKind::DedupCheck => "dedup_check",
            ErrorKind::GasEstimate => "gas_estimate",
            ErrorKind::TransactionBuild => "transaction_build",
            ErrorKind::Broadcast => "broadcast",
            ErrorKind::PersistTransaction => "persist_transaction",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit entry. Never read back by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub id: Uuid,
    pub kind: ErrorKind,
    pub message: String,
    /// What the error was about, usually a contract address.
    pub context: String,
    /// Unix seconds.
    pub timestamp: u64,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            context: context.into(),
            timestamp: unix_now(),
        }
    }
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Errors raised by the persistence gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A transaction is already recorded for this contract.
    #[error("Transaction already recorded for {0}")]
    Duplicate(Address),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
