//! File-backed ledger.
//!
//! Layout inside the data directory:
//! - `transactions.jsonl`: one [`TransactionRecord`] per line, append-only
//! - `errors.jsonl`: one [`ErrorRecord`] per line, append-only
//! - `collections.jsonl`: one [`StoredCollection`] per upsert, latest line wins
//!
//! The dedup index and the collection map live in memory and are rebuilt from
//! their files on open. Superseded collection lines are compacted away on
//! open. Each file has its own async mutex, so concurrent callers never
//! interleave partial lines.

use std::path::{Path, PathBuf};

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::sources::Collection;
use crate::storage::types::{
    unix_now, ErrorKind, ErrorRecord, StorageError, StorageResult, TransactionRecord,
};
use crate::storage::Persistence;

const TRANSACTIONS_FILE: &str = "transactions.jsonl";
const ERRORS_FILE: &str = "errors.jsonl";
const COLLECTIONS_FILE: &str = "collections.jsonl";

/// A collection as last seen by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCollection {
    #[serde(flatten)]
    pub collection: Collection,
    /// Unix seconds of the latest upsert.
    pub updated_at: u64,
}

/// Persistence gateway over plain files.
pub struct Ledger {
    dir: PathBuf,
    minted: DashMap<Address, TxHash>,
    collections: DashMap<Address, StoredCollection>,
    transactions_lock: Mutex<()>,
    errors_lock: Mutex<()>,
    collections_lock: Mutex<()>,
}

impl Ledger {
    /// Open (or create) a ledger in `dir`.
    pub async fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;

        let minted = DashMap::new();
        for record in read_lines::<TransactionRecord>(&dir.join(TRANSACTIONS_FILE)).await? {
            minted.insert(record.contract_address, record.transaction_hash);
        }

        let collections = DashMap::new();
        let snapshots = read_lines::<StoredCollection>(&dir.join(COLLECTIONS_FILE)).await?;
        let lines = snapshots.len();
        for snapshot in snapshots {
            collections.insert(snapshot.collection.contract_address, snapshot);
        }
        if lines > collections.len() {
            compact_collections(&dir, &collections).await?;
            tracing::debug!(lines, kept = collections.len(), "Compacted collection snapshots");
        }

        tracing::info!(
            path = %dir.display(),
            transactions = minted.len(),
            collections = collections.len(),
            "Ledger opened"
        );

        Ok(Self {
            dir,
            minted,
            collections,
            transactions_lock: Mutex::new(()),
            errors_lock: Mutex::new(()),
            collections_lock: Mutex::new(()),
        })
    }

    /// Transaction hash recorded for `contract`, if any.
    pub fn minted_hash(&self, contract: &Address) -> Option<TxHash> {
        self.minted.get(contract).map(|r| *r.value())
    }

    /// Number of contracts with a recorded transaction.
    pub fn minted_count(&self) -> usize {
        self.minted.len()
    }

    /// Most recent transaction records, newest first.
    pub async fn recent_transactions(&self, limit: usize) -> StorageResult<Vec<TransactionRecord>> {
        let mut records = read_lines::<TransactionRecord>(&self.dir.join(TRANSACTIONS_FILE)).await?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }

    /// Most recent audit errors, newest first.
    pub async fn recent_errors(&self, limit: usize) -> StorageResult<Vec<ErrorRecord>> {
        let mut records = read_lines::<ErrorRecord>(&self.dir.join(ERRORS_FILE)).await?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }

    /// Latest collection snapshots, most recently updated first.
    pub fn collections(&self, limit: usize) -> Vec<StoredCollection> {
        let mut all: Vec<_> = self.collections.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all.truncate(limit);
        all
    }

    async fn append_error(&self, record: &ErrorRecord) -> StorageResult<()> {
        let _guard = self.errors_lock.lock().await;
        append_line(&self.dir.join(ERRORS_FILE), record).await
    }
}

#[async_trait]
impl Persistence for Ledger {
    async fn has_existing_transaction(&self, contract: Address) -> StorageResult<bool> {
        Ok(self.minted.contains_key(&contract))
    }

    async fn record_transaction(&self, record: TransactionRecord) -> StorageResult<()> {
        let _guard = self.transactions_lock.lock().await;
        if self.minted.contains_key(&record.contract_address) {
            return Err(StorageError::Duplicate(record.contract_address));
        }

        append_line(&self.dir.join(TRANSACTIONS_FILE), &record).await?;
        self.minted.insert(record.contract_address, record.transaction_hash);

        tracing::info!(
            contract = %record.contract_address,
            tx_hash = %record.transaction_hash,
            "Stored transaction"
        );
        Ok(())
    }

    async fn store_collection(&self, collection: &Collection) -> StorageResult<()> {
        let snapshot = StoredCollection {
            collection: collection.clone(),
            updated_at: unix_now(),
        };

        let _guard = self.collections_lock.lock().await;
        append_line(&self.dir.join(COLLECTIONS_FILE), &snapshot).await?;
        let previous = self.collections.insert(collection.contract_address, snapshot);

        if previous.is_some() {
            tracing::debug!(name = %collection.name, "Updated existing collection");
        } else {
            tracing::debug!(name = %collection.name, "Inserted new collection");
        }
        Ok(())
    }

    async fn record_error(&self, kind: ErrorKind, message: &str, context: &str) {
        let record = ErrorRecord::new(kind, message, context);
        if let Err(e) = self.append_error(&record).await {
            tracing::error!(kind = %kind, error = %e, "Failed to write audit error");
        }
    }
}

async fn append_line<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&line).await?;
    file.flush().await?;
    Ok(())
}

/// Rewrite the collection file with one line per contract, oldest first.
async fn compact_collections(dir: &Path, collections: &DashMap<Address, StoredCollection>) -> StorageResult<()> {
    let mut latest: Vec<_> = collections.iter().map(|r| r.value().clone()).collect();
    latest.sort_by_key(|s| s.updated_at);

    let mut content = Vec::new();
    for snapshot in &latest {
        serde_json::to_writer(&mut content, snapshot)?;
        content.push(b'\n');
    }

    let tmp = dir.join(format!("{}.tmp", COLLECTIONS_FILE));
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, dir.join(COLLECTIONS_FILE)).await?;
    Ok(())
}

async fn read_lines<T: DeserializeOwned>(path: &Path) -> StorageResult<Vec<T>> {
    if !fs::try_exists(path).await? {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).await?;
    let mut out = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str(line) {
            Ok(value) => out.push(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt ledger line");
            }
        }
    }
    Ok(out)
}
