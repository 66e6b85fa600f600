//! Three-stage mint pipeline.
//!
//! # Data Flow
//! ```text
//! DiscoveryStage ──Vec<Collection>──▶ [bounded queue] ──▶ SelectionStage
//! SelectionStage ──SelectedItem────▶ [bounded queue] ──▶ SubmissionStage
//! ```
//!
//! Each stage is its own Tokio task. Every queue has a single producer and
//! a single consumer, so order is preserved end to end. Every wait (timer,
//! queue send/receive, external call) is raced against the shared shutdown
//! signal. Failures are confined to the tick, collection or item that
//! caused them and surface only through logs and the audit trail.

pub mod discovery;
pub mod selection;
pub mod submission;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::blockchain::Submitter;
use crate::config::PipelineConfig;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::observability::metrics;
use crate::sources::{CandidateSource, CollectionSource};
use crate::storage::{ErrorKind, Persistence};

pub use discovery::DiscoveryStage;
pub use selection::{select_cheapest, SelectionStage};
pub use submission::SubmissionStage;
pub use types::{SelectedItem, SelectionError, SubmissionOutcome};

pub(crate) enum SendOutcome {
    Sent,
    Cancelled,
    Closed,
}

/// Send into a bounded queue unless shutdown fires first.
pub(crate) async fn send_or_cancel<T>(
    tx: &mpsc::Sender<T>,
    value: T,
    shutdown: &ShutdownSignal,
) -> SendOutcome {
    match shutdown.run_until_cancelled(tx.send(value)).await {
        Some(Ok(())) => SendOutcome::Sent,
        Some(Err(_)) => SendOutcome::Closed,
        None => SendOutcome::Cancelled,
    }
}

/// Receive from a queue; `None` on shutdown or when the producer is gone.
pub(crate) async fn recv_or_cancel<T>(
    rx: &mut mpsc::Receiver<T>,
    shutdown: &ShutdownSignal,
) -> Option<T> {
    shutdown.run_until_cancelled(rx.recv()).await.flatten()
}

/// Write an audit record, unless shutdown interrupts the write.
pub(crate) async fn audit(
    store: &dyn Persistence,
    shutdown: &ShutdownSignal,
    kind: ErrorKind,
    message: &str,
    context: &str,
) {
    metrics::record_audit_error(kind.as_str());
    let _ = shutdown
        .run_until_cancelled(store.record_error(kind, message, context))
        .await;
}

/// The wired-up stages, ready to run.
pub struct Pipeline {
    discovery: DiscoveryStage,
    selection: SelectionStage,
    submission: SubmissionStage,
}

impl Pipeline {
    pub fn new(
        config: &PipelineConfig,
        collections: Arc<dyn CollectionSource>,
        candidates: Arc<dyn CandidateSource>,
        store: Arc<dyn Persistence>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let (batch_tx, batch_rx) = mpsc::channel(config.queue_capacity);
        let (item_tx, item_rx) = mpsc::channel(config.queue_capacity);

        Self {
            discovery: DiscoveryStage::new(config, collections, store.clone(), batch_tx),
            selection: SelectionStage::new(candidates, store.clone(), batch_rx, item_tx),
            submission: SubmissionStage::new(config, store, submitter, item_rx),
        }
    }

    /// Override the discovery poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.discovery = self.discovery.with_poll_interval(poll_interval);
        self
    }

    /// Spawn the three stages and wait until all of them have returned.
    pub async fn run(self, shutdown: &Shutdown) {
        let stages = [
            ("discovery", tokio::spawn(self.discovery.run(shutdown.subscribe()))),
            ("selection", tokio::spawn(self.selection.run(shutdown.subscribe()))),
            ("submission", tokio::spawn(self.submission.run(shutdown.subscribe()))),
        ];

        for (name, handle) in stages {
            if let Err(e) = handle.await {
                tracing::error!(stage = name, error = %e, "Pipeline stage terminated abnormally");
            }
        }
        tracing::info!("Pipeline stopped");
    }
}
