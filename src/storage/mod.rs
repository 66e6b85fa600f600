//! Persistence gateway.
//!
//! # Responsibilities
//! - Dedup lookup: has a transaction been recorded for this contract?
//! - Durable write of transaction, collection and error records
//! - Safe for concurrent use by every stage without outside locking

pub mod ledger;
pub mod types;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::sources::Collection;

pub use ledger::Ledger;
pub use types::{ErrorKind, ErrorRecord, StorageError, StorageResult, TransactionRecord};

#[async_trait]
pub trait Persistence: Send + Sync {
    /// Whether a transaction record exists for `contract`.
    async fn has_existing_transaction(&self, contract: Address) -> StorageResult<bool>;

    /// Durably record a submitted transaction.
    async fn record_transaction(&self, record: TransactionRecord) -> StorageResult<()>;

    /// Upsert a discovered collection, superseding any earlier copy.
    async fn store_collection(&self, collection: &Collection) -> StorageResult<()>;

    /// Append an audit error. Best effort: failures are logged, never returned.
    async fn record_error(&self, kind: ErrorKind, message: &str, context: &str);
}
