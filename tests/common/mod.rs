//! Shared fakes for pipeline integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;

use nft_scout::blockchain::{BlockchainError, BlockchainResult, MintRequest, SignedTransaction, Submitter};
use nft_scout::sources::{Candidate, CandidateSource, Collection, CollectionSource, SourceError, SourceResult};
use nft_scout::storage::{ErrorKind, Persistence, StorageError, StorageResult, TransactionRecord};

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn collection(byte: u8, name: &str) -> Collection {
    Collection::new(addr(byte), name)
}

/// Candidate whose destination and payload both encode `tag`.
pub fn candidate(tag: u8, unit_count: &str) -> Candidate {
    Candidate {
        destination: addr(tag),
        payload: Bytes::from(vec![tag]),
        unit_count: unit_count.to_string(),
        native_value: "0".to_string(),
    }
}

/// Poll `cond` every few milliseconds until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}

/// In-memory persistence gateway that records every call.
#[derive(Default)]
pub struct MemoryStore {
    minted: Mutex<HashSet<Address>>,
    pub transactions: Mutex<Vec<TransactionRecord>>,
    pub errors: Mutex<Vec<(ErrorKind, String, String)>>,
    pub collections: Mutex<Vec<Collection>>,
    pub dedup_checks: AtomicUsize,
    fail_record: Mutex<HashSet<Address>>,
    fail_dedup: Mutex<HashSet<Address>>,
    collection_delays: Mutex<HashMap<String, Duration>>,
}

impl MemoryStore {
    pub fn with_minted(contracts: &[Address]) -> Self {
        let store = Self::default();
        store.minted.lock().unwrap().extend(contracts.iter().copied());
        store
    }

    pub fn fail_record_for(&self, contract: Address) {
        self.fail_record.lock().unwrap().insert(contract);
    }

    pub fn fail_dedup_for(&self, contract: Address) {
        self.fail_dedup.lock().unwrap().insert(contract);
    }

    /// Hold `store_collection` for `delay` whenever it sees a collection named `name`.
    pub fn delay_collection_write(&self, name: &str, delay: Duration) {
        self.collection_delays.lock().unwrap().insert(name.to_string(), delay);
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections.lock().unwrap().iter().map(|c| c.name.clone()).collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.lock().unwrap().len()
    }

    pub fn error_kinds(&self) -> Vec<ErrorKind> {
        self.errors.lock().unwrap().iter().map(|(k, _, _)| *k).collect()
    }

    pub fn errors_for(&self, contract: Address) -> Vec<ErrorKind> {
        let context = contract.to_string();
        self.errors
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, c)| *c == context)
            .map(|(k, _, _)| *k)
            .collect()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn has_existing_transaction(&self, contract: Address) -> StorageResult<bool> {
        self.dedup_checks.fetch_add(1, Ordering::SeqCst);
        if self.fail_dedup.lock().unwrap().contains(&contract) {
            return Err(StorageError::Io(std::io::Error::other("store offline")));
        }
        Ok(self.minted.lock().unwrap().contains(&contract))
    }

    async fn record_transaction(&self, record: TransactionRecord) -> StorageResult<()> {
        if self.fail_record.lock().unwrap().contains(&record.contract_address) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        if !self.minted.lock().unwrap().insert(record.contract_address) {
            return Err(StorageError::Duplicate(record.contract_address));
        }
        self.transactions.lock().unwrap().push(record);
        Ok(())
    }

    async fn store_collection(&self, collection: &Collection) -> StorageResult<()> {
        let delay = self.collection_delays.lock().unwrap().get(&collection.name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.collections.lock().unwrap().push(collection.clone());
        Ok(())
    }

    async fn record_error(&self, kind: ErrorKind, message: &str, context: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((kind, message.to_string(), context.to_string()));
    }
}

/// Returns scripted batches in order, then empty batches forever.
#[derive(Default)]
pub struct ScriptedCollections {
    batches: Mutex<VecDeque<SourceResult<Vec<Collection>>>>,
    pub calls: AtomicUsize,
}

impl ScriptedCollections {
    pub fn new(batches: Vec<SourceResult<Vec<Collection>>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CollectionSource for ScriptedCollections {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Always returns the same non-empty batch.
pub struct RepeatingCollections(pub Vec<Collection>);

#[async_trait]
impl CollectionSource for RepeatingCollections {
    fn name(&self) -> &str {
        "repeating"
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        Ok(self.0.clone())
    }
}

/// Provider that fails every fetch.
pub struct FailingCollections(pub &'static str);

#[async_trait]
impl CollectionSource for FailingCollections {
    fn name(&self) -> &str {
        self.0
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        Err(SourceError::Decode(format!("{} unavailable", self.0)))
    }
}

/// Candidates per contract; unknown contracts yield a fetch error.
#[derive(Default)]
pub struct MapCandidates {
    by_contract: HashMap<Address, Vec<Candidate>>,
    pub calls: AtomicUsize,
}

impl MapCandidates {
    pub fn with(mut self, contract: Address, candidates: Vec<Candidate>) -> Self {
        self.by_contract.insert(contract, candidates);
        self
    }
}

#[async_trait]
impl CandidateSource for MapCandidates {
    async fn fetch_candidates(&self, collection: &Collection) -> SourceResult<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.by_contract
            .get(&collection.contract_address)
            .cloned()
            .ok_or_else(|| SourceError::Decode(format!("unknown contract {}", collection.contract_address)))
    }
}

/// Submitter that records calls and fails on demand.
///
/// The signed payload carries the destination so broadcast failures can be
/// injected per destination.
#[derive(Default)]
pub struct RecordingSubmitter {
    pub estimates: AtomicUsize,
    pub builds: AtomicUsize,
    pub broadcasts: Mutex<Vec<Address>>,
    pub requests: Mutex<Vec<MintRequest>>,
    nonce: AtomicU64,
    fail_estimate_calls: Mutex<HashSet<usize>>,
    fail_build_for: Mutex<HashSet<Address>>,
    fail_broadcast_for: Mutex<HashSet<Address>>,
}

impl RecordingSubmitter {
    /// Fail the estimate call with this zero-based index.
    pub fn fail_estimate_call(&self, index: usize) {
        self.fail_estimate_calls.lock().unwrap().insert(index);
    }

    pub fn fail_build_for(&self, destination: Address) {
        self.fail_build_for.lock().unwrap().insert(destination);
    }

    pub fn fail_broadcast_for(&self, destination: Address) {
        self.fail_broadcast_for.lock().unwrap().insert(destination);
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.lock().unwrap().len()
    }

    pub fn estimate_count(&self) -> usize {
        self.estimates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Submitter for RecordingSubmitter {
    async fn estimate_gas_price(&self) -> BlockchainResult<u128> {
        let call = self.estimates.fetch_add(1, Ordering::SeqCst);
        if self.fail_estimate_calls.lock().unwrap().contains(&call) {
            return Err(BlockchainError::Rpc("All providers failed to get gas price".to_string()));
        }
        Ok(1_000_000_000)
    }

    async fn build_and_sign(&self, request: MintRequest) -> BlockchainResult<SignedTransaction> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.fail_build_for.lock().unwrap().contains(&request.to) {
            return Err(BlockchainError::Signing("nonce unavailable".to_string()));
        }
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let signed = SignedTransaction {
            hash: TxHash::with_last_byte(nonce as u8 + 1),
            nonce,
            raw: Bytes::copy_from_slice(request.to.as_slice()),
        };
        self.requests.lock().unwrap().push(request);
        Ok(signed)
    }

    async fn broadcast(&self, signed: &SignedTransaction) -> BlockchainResult<TxHash> {
        let destination = Address::from_slice(&signed.raw);
        if self.fail_broadcast_for.lock().unwrap().contains(&destination) {
            return Err(BlockchainError::Broadcast("replacement transaction underpriced".to_string()));
        }
        self.broadcasts.lock().unwrap().push(destination);
        Ok(signed.hash)
    }
}
