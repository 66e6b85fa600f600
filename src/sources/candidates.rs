//! HTTP candidate source: mint transaction shapes per contract.

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::types::{Candidate, Collection, SourceResult};
use crate::sources::CandidateSource;

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(default)]
    transactions: Vec<RawCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCandidate {
    to: String,
    #[serde(default)]
    call_data: String,
    nft_count: String,
    #[serde(default)]
    eth_value: String,
}

impl RawCandidate {
    /// Type the wire entry. Unit count stays raw; selection parses it.
    fn into_candidate(self) -> Option<Candidate> {
        let destination = match self.to.parse::<Address>() {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!(to = %self.to, error = %e, "Dropping candidate with invalid destination");
                return None;
            }
        };
        let payload = if self.call_data.is_empty() {
            Bytes::new()
        } else {
            match self.call_data.parse::<Bytes>() {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(to = %self.to, error = %e, "Dropping candidate with invalid call data");
                    return None;
                }
            }
        };
        Some(Candidate {
            destination,
            payload,
            unit_count: self.nft_count,
            native_value: self.eth_value,
        })
    }
}

/// Candidate source backed by a JSON endpoint:
/// `GET {base}/transactions?contract=0x…` → `{"transactions": [...]}`.
pub struct HttpCandidateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCandidateSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn into_candidates(response: TransactionResponse) -> Vec<Candidate> {
    response
        .transactions
        .into_iter()
        .filter_map(RawCandidate::into_candidate)
        .collect()
}

#[async_trait]
impl CandidateSource for HttpCandidateSource {
    async fn fetch_candidates(&self, collection: &Collection) -> SourceResult<Vec<Candidate>> {
        let contract = collection.contract_address.to_string();
        let response: TransactionResponse = self
            .client
            .get(format!("{}/transactions", self.base_url))
            .query(&[("contract", contract.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(into_candidates(response))
    }
}
