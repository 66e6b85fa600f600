//! Fixed demo data used when no provider is configured.

use alloy::primitives::{address, Bytes};
use async_trait::async_trait;

use crate::sources::types::{Candidate, Collection, SourceResult};
use crate::sources::{CandidateSource, CollectionSource};

/// Two fixed collections, returned on every poll.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCollections;

impl DemoCollections {
    /// The demo batch.
    pub fn collections() -> Vec<Collection> {
        vec![
            Collection::new(
                address!("1234567890123456789012345678901234567890"),
                "Demo NFT Collection 1",
            ),
            Collection::new(
                address!("0987654321098765432109876543210987654321"),
                "Demo NFT Collection 2",
            ),
        ]
    }
}

#[async_trait]
impl CollectionSource for DemoCollections {
    fn name(&self) -> &str {
        "demo"
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        Ok(Self::collections())
    }
}

/// A single one-unit mint straight to the collection contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoCandidates;

#[async_trait]
impl CandidateSource for DemoCandidates {
    async fn fetch_candidates(&self, collection: &Collection) -> SourceResult<Vec<Candidate>> {
        Ok(vec![Candidate {
            destination: collection.contract_address,
            payload: Bytes::new(),
            unit_count: "1".to_string(),
            native_value: "0.01".to_string(),
        }])
    }
}
