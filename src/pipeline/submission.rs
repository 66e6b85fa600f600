//! Submission stage: one selected item at a time, guarded by the ledger.
//!
//! # Per-item state machine
//! ```text
//! received → dedup-checked → skipped (already recorded)
//!                          → estimating → building → broadcasting → persisting → done
//! any step except the dedup decision may end in failed (logged, no retry)
//! ```
//!
//! Items are never processed concurrently: nonces come from the account's
//! pending count, so two in-flight submissions would collide.

use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::blockchain::{MintRequest, Submitter};
use crate::config::PipelineConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::pipeline::types::{SelectedItem, SubmissionOutcome};
use crate::pipeline::{audit, recv_or_cancel};
use crate::storage::types::unix_now;
use crate::storage::{ErrorKind, Persistence, TransactionRecord};

pub struct SubmissionStage {
    store: Arc<dyn Persistence>,
    submitter: Arc<dyn Submitter>,
    gas_limit: u64,
    rx: mpsc::Receiver<SelectedItem>,
}

impl SubmissionStage {
    pub fn new(
        config: &PipelineConfig,
        store: Arc<dyn Persistence>,
        submitter: Arc<dyn Submitter>,
        rx: mpsc::Receiver<SelectedItem>,
    ) -> Self {
        Self {
            store,
            submitter,
            gas_limit: config.gas_limit,
            rx,
        }
    }

    /// Run until shutdown or until the selection stage goes away.
    pub async fn run(mut self, shutdown: ShutdownSignal) {
        tracing::info!(gas_limit = self.gas_limit, "Starting NFT minter");

        while let Some(item) = recv_or_cancel(&mut self.rx, &shutdown).await {
            if submit(
                self.store.as_ref(),
                self.submitter.as_ref(),
                self.gas_limit,
                &item,
                &shutdown,
            )
            .await
                == SubmissionOutcome::Cancelled
            {
                break;
            }
        }

        tracing::info!("NFT minter stopped");
    }
}

/// Drive one item through the submission steps.
pub async fn submit(
    store: &dyn Persistence,
    submitter: &dyn Submitter,
    gas_limit: u64,
    item: &SelectedItem,
    shutdown: &ShutdownSignal,
) -> SubmissionOutcome {
    let contract = item.contract_address;
    tracing::info!(name = %item.collection_name, contract = %contract, units = item.unit_count, "Processing mint request");

    let Some(dedup) = shutdown.run_until_cancelled(store.has_existing_transaction(contract)).await else {
        return SubmissionOutcome::Cancelled;
    };
    match dedup {
        Ok(true) => {
            tracing::info!(name = %item.collection_name, contract = %contract, "Collection already minted, skipping");
            metrics::record_submission("duplicate");
            return SubmissionOutcome::Duplicate;
        }
        Ok(false) => {}
        Err(e) => return fail(store, shutdown, ErrorKind::DedupCheck, e, item).await,
    }

    let Some(estimate) = shutdown.run_until_cancelled(submitter.estimate_gas_price()).await else {
        return SubmissionOutcome::Cancelled;
    };
    let gas_price = match estimate {
        Ok(price) => price,
        Err(e) => return fail(store, shutdown, ErrorKind::GasEstimate, e, item).await,
    };

    let request = MintRequest::new(item.destination, item.payload.clone(), gas_price, gas_limit);
    let Some(built) = shutdown.run_until_cancelled(submitter.build_and_sign(request)).await else {
        return SubmissionOutcome::Cancelled;
    };
    let signed = match built {
        Ok(signed) => signed,
        Err(e) => return fail(store, shutdown, ErrorKind::TransactionBuild, e, item).await,
    };

    let Some(sent) = shutdown.run_until_cancelled(submitter.broadcast(&signed)).await else {
        return SubmissionOutcome::Cancelled;
    };
    let hash = match sent {
        Ok(hash) => hash,
        Err(e) => return fail(store, shutdown, ErrorKind::Broadcast, e, item).await,
    };

    // Not raced against shutdown: once a broadcast is accepted the
    // idempotency marker must be written or the contract could be minted again.
    let record = TransactionRecord {
        name: item.collection_name.clone(),
        contract_address: contract,
        unit_count: item.unit_count,
        transaction_hash: hash,
        recorded_at: unix_now(),
    };
    if let Err(e) = store.record_transaction(record).await {
        return fail(store, shutdown, ErrorKind::PersistTransaction, e, item).await;
    }

    metrics::record_submission("submitted");
    tracing::info!(
        name = %item.collection_name,
        contract = %contract,
        tx_hash = %hash,
        nonce = signed.nonce,
        gas_price,
        "Mint transaction broadcast"
    );
    SubmissionOutcome::Submitted(hash)
}

async fn fail(
    store: &dyn Persistence,
    shutdown: &ShutdownSignal,
    kind: ErrorKind,
    error: impl Display,
    item: &SelectedItem,
) -> SubmissionOutcome {
    let message = error.to_string();
    tracing::error!(
        step = %kind,
        name = %item.collection_name,
        contract = %item.contract_address,
        error = %message,
        "Mint submission failed"
    );
    metrics::record_submission("failed");
    audit(store, shutdown, kind, &message, &item.contract_address.to_string()).await;
    SubmissionOutcome::Failed(kind)
}
