//! Upstream data sources.
//!
//! # Data Flow
//! ```text
//! Provider APIs (Alchemy, OpenSea)
//!     → alchemy.rs / opensea.rs (decode provider payloads into Collection)
//!     → aggregate.rs (merge, demo fallback, filter reported + duplicates)
//!     → discovery stage
//!
//! Candidate API
//!     → candidates.rs (decode into typed Candidate)
//!     → selection stage
//! ```
//!
//! # Design Decisions
//! - The pipeline only sees the two capability traits, never a provider
//! - Every adapter produces typed values directly; no untyped intermediate maps
//! - Malformed upstream entries are dropped at the adapter boundary

pub mod aggregate;
pub mod alchemy;
pub mod candidates;
pub mod demo;
pub mod opensea;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;

pub use aggregate::{filter_collections, AggregateSource};
pub use types::{Candidate, Collection, SourceError, SourceResult};

/// Supplies a batch of candidate contracts per poll.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>>;
}

/// Supplies mint transaction candidates for one collection.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_candidates(&self, collection: &Collection) -> SourceResult<Vec<Candidate>>;
}

/// Shared HTTP client for provider adapters.
pub fn http_client(timeout_secs: u64) -> SourceResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("nft-scout/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
