//! Discovery stage: polls the collection source on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::PipelineConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::pipeline::{audit, send_or_cancel, SendOutcome};
use crate::sources::{Collection, CollectionSource};
use crate::storage::{ErrorKind, Persistence};

pub struct DiscoveryStage {
    source: Arc<dyn CollectionSource>,
    store: Arc<dyn Persistence>,
    poll_interval: Duration,
    tx: mpsc::Sender<Vec<Collection>>,
}

impl DiscoveryStage {
    pub fn new(
        config: &PipelineConfig,
        source: Arc<dyn CollectionSource>,
        store: Arc<dyn Persistence>,
        tx: mpsc::Sender<Vec<Collection>>,
    ) -> Self {
        Self {
            source,
            store,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            tx,
        }
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run until shutdown or until the selection stage goes away.
    ///
    /// The first poll happens one interval after start. Ticks missed while
    /// a slow fetch or a full queue held the loop are skipped, not replayed.
    pub async fn run(self, shutdown: ShutdownSignal) {
        tracing::info!(
            interval_secs = self.poll_interval.as_secs_f64(),
            source = self.source.name(),
            "Starting fetch worker"
        );

        let mut ticker = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if shutdown.run_until_cancelled(ticker.tick()).await.is_none() {
                break;
            }
            if !self.poll_once(&shutdown).await {
                break;
            }
        }

        tracing::info!("Collection fetcher stopped");
    }

    /// One tick. Returns `false` when the stage must stop.
    async fn poll_once(&self, shutdown: &ShutdownSignal) -> bool {
        tracing::debug!("Fetching collection data");

        let Some(fetched) = shutdown.run_until_cancelled(self.source.fetch_collections()).await else {
            return false;
        };

        let batch = match fetched {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "Error fetching collection data");
                metrics::record_fetch_failure("discovery");
                audit(self.store.as_ref(), shutdown, ErrorKind::CollectionFetch, &e.to_string(), self.source.name()).await;
                return true;
            }
        };

        if batch.is_empty() {
            tracing::debug!("Poll returned no collections");
            return true;
        }

        let count = batch.len();
        match send_or_cancel(&self.tx, batch, shutdown).await {
            SendOutcome::Sent => {
                metrics::record_batch(count);
                tracing::info!(count, "Collections sent to processing queue");
                true
            }
            SendOutcome::Cancelled => {
                tracing::info!(count, "Shutdown while queue full, dropping batch");
                false
            }
            SendOutcome::Closed => {
                tracing::warn!("Processing queue closed, stopping fetcher");
                false
            }
        }
    }
}
