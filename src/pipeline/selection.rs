//! Selection stage: expands each batch into per-collection candidate
//! queries and keeps the cheapest candidate of each collection.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::pipeline::types::{SelectedItem, SelectionError};
use crate::pipeline::{audit, recv_or_cancel, send_or_cancel, SendOutcome};
use crate::sources::{Candidate, CandidateSource, Collection};
use crate::storage::{ErrorKind, Persistence};

/// Pick the candidate with the strictly smallest unit count.
///
/// The first unit count that is not an integer fails the whole collection.
/// Ties keep the first candidate seen.
pub fn select_cheapest(
    collection: &Collection,
    candidates: &[Candidate],
) -> Result<SelectedItem, SelectionError> {
    let mut best: Option<(u64, &Candidate)> = None;
    for candidate in candidates {
        let count = candidate.unit_count.parse::<u64>().map_err(|_| {
            SelectionError::InvalidUnitCount {
                value: candidate.unit_count.clone(),
            }
        })?;
        if best.map_or(true, |(min, _)| count < min) {
            best = Some((count, candidate));
        }
    }

    let (unit_count, chosen) = best.ok_or(SelectionError::NoItems)?;
    Ok(SelectedItem {
        collection_name: collection.name.clone(),
        contract_address: collection.contract_address,
        unit_count,
        destination: chosen.destination,
        payload: chosen.payload.clone(),
    })
}

enum Step {
    Selected(SelectedItem),
    Skipped,
    Cancelled,
}

pub struct SelectionStage {
    candidates: Arc<dyn CandidateSource>,
    store: Arc<dyn Persistence>,
    rx: mpsc::Receiver<Vec<Collection>>,
    tx: mpsc::Sender<SelectedItem>,
}

impl SelectionStage {
    pub fn new(
        candidates: Arc<dyn CandidateSource>,
        store: Arc<dyn Persistence>,
        rx: mpsc::Receiver<Vec<Collection>>,
        tx: mpsc::Sender<SelectedItem>,
    ) -> Self {
        Self {
            candidates,
            store,
            rx,
            tx,
        }
    }

    /// Run until shutdown or until either neighbouring queue closes.
    ///
    /// Collection snapshots queued before the stage stops are still written
    /// before this returns.
    pub async fn run(mut self, shutdown: ShutdownSignal) {
        tracing::info!("Starting task processor");

        let (snapshots, snapshot_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_snapshots(self.store.clone(), snapshot_rx));

        while let Some(batch) = recv_or_cancel(&mut self.rx, &shutdown).await {
            tracing::info!(count = batch.len(), "Processing collections");
            if !self.process_batch(batch, &snapshots, &shutdown).await {
                break;
            }
        }

        drop(snapshots);
        if let Err(e) = writer.await {
            tracing::error!(error = %e, "Collection writer terminated abnormally");
        }

        tracing::info!("Task processor stopped");
    }

    /// Returns `false` when the stage must stop.
    async fn process_batch(
        &self,
        batch: Vec<Collection>,
        snapshots: &mpsc::UnboundedSender<Collection>,
        shutdown: &ShutdownSignal,
    ) -> bool {
        for collection in batch {
            if shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, abandoning batch");
                return false;
            }

            if snapshots.send(collection.clone()).is_err() {
                tracing::warn!(name = %collection.name, "Collection writer gone, snapshot dropped");
            }

            let item = match self.select(&collection, shutdown).await {
                Step::Selected(item) => item,
                Step::Skipped => continue,
                Step::Cancelled => return false,
            };

            match send_or_cancel(&self.tx, item, shutdown).await {
                SendOutcome::Sent => {
                    metrics::record_selected();
                    tracing::info!(name = %collection.name, contract = %collection.contract_address, "Collection queued for minting");
                }
                SendOutcome::Cancelled => return false,
                SendOutcome::Closed => {
                    tracing::warn!("Mint queue closed, stopping processor");
                    return false;
                }
            }
        }
        true
    }

    async fn select(&self, collection: &Collection, shutdown: &ShutdownSignal) -> Step {
        let context = collection.contract_address.to_string();

        let Some(fetched) = shutdown
            .run_until_cancelled(self.candidates.fetch_candidates(collection))
            .await
        else {
            return Step::Cancelled;
        };

        let candidates = match fetched {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(name = %collection.name, contract = %context, error = %e, "Error getting transaction candidates");
                metrics::record_fetch_failure("selection");
                audit(self.store.as_ref(), shutdown, ErrorKind::CandidateFetch, &e.to_string(), &context).await;
                return Step::Skipped;
            }
        };

        match select_cheapest(collection, &candidates) {
            Ok(item) => Step::Selected(item),
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(name = %collection.name, contract = %context, error = %e, "Error processing transaction data");
                metrics::record_selection_failure(kind.as_str());
                audit(self.store.as_ref(), shutdown, kind, &e.to_string(), &context).await;
                Step::Skipped
            }
        }
    }
}

/// Store snapshots one at a time, in queue order, until every sender is gone.
async fn write_snapshots(store: Arc<dyn Persistence>, mut rx: mpsc::UnboundedReceiver<Collection>) {
    while let Some(collection) = rx.recv().await {
        if let Err(e) = store.store_collection(&collection).await {
            tracing::warn!(name = %collection.name, error = %e, "Error storing collection");
            metrics::record_audit_error(ErrorKind::CollectionStore.as_str());
            store
                .record_error(
                    ErrorKind::CollectionStore,
                    &e.to_string(),
                    &collection.contract_address.to_string(),
                )
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, Bytes};

    fn candidate(dest: u8, count: &str) -> Candidate {
        Candidate {
            destination: Address::repeat_byte(dest),
            payload: Bytes::from(vec![dest]),
            unit_count: count.to_string(),
            native_value: "0".to_string(),
        }
    }

    fn collection() -> Collection {
        Collection::new(Address::repeat_byte(0xAA), "Target")
    }

    #[test]
    fn test_picks_minimum() {
        let item = select_cheapest(
            &collection(),
            &[candidate(1, "3"), candidate(2, "1"), candidate(3, "5")],
        )
        .unwrap();
        assert_eq!(item.unit_count, 1);
        assert_eq!(item.destination, Address::repeat_byte(2));
        assert_eq!(item.payload, Bytes::from(vec![2]));
        assert_eq!(item.contract_address, Address::repeat_byte(0xAA));
        assert_eq!(item.collection_name, "Target");
    }

    #[test]
    fn test_first_minimum_wins_ties() {
        let item = select_cheapest(
            &collection(),
            &[candidate(1, "4"), candidate(2, "2"), candidate(3, "2"), candidate(4, "2")],
        )
        .unwrap();
        assert_eq!(item.unit_count, 2);
        assert_eq!(item.destination, Address::repeat_byte(2));
    }

    #[test]
    fn test_empty_is_no_items() {
        let err = select_cheapest(&collection(), &[]).unwrap_err();
        assert_eq!(err, SelectionError::NoItems);
        assert_eq!(err.kind(), ErrorKind::NoItems);
        assert_eq!(err.to_string(), "no items provided");
    }

    #[test]
    fn test_first_bad_count_fails_collection() {
        let err = select_cheapest(
            &collection(),
            &[candidate(1, "3"), candidate(2, "ten"), candidate(3, "1")],
        )
        .unwrap_err();
        assert_eq!(err, SelectionError::InvalidUnitCount { value: "ten".to_string() });
        assert_eq!(err.kind(), ErrorKind::InvalidUnitCount);
        assert_eq!(err.to_string(), "invalid NFT count: \"ten\"");
    }

    #[test]
    fn test_bad_count_after_minimum_still_fails() {
        for bad in ["-1", "", "1.5", " 2"] {
            let err = select_cheapest(&collection(), &[candidate(1, "1"), candidate(2, bad)]).unwrap_err();
            assert_eq!(err, SelectionError::InvalidUnitCount { value: bad.to_string() }, "count {bad:?}");
        }
    }

    #[test]
    fn test_minimality_over_many_inputs() {
        let counts = [9u64, 4, 12, 4, 7, 30, 5];
        let candidates: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| candidate(i as u8 + 1, &c.to_string()))
            .collect();
        let item = select_cheapest(&collection(), &candidates).unwrap();
        assert_eq!(item.unit_count, *counts.iter().min().unwrap());
        // index 1 is the first 4
        assert_eq!(item.destination, Address::repeat_byte(2));
    }
}
