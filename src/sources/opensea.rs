//! OpenSea adapter: recently created collections on one chain.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::types::{Collection, SourceResult};
use crate::sources::CollectionSource;

#[derive(Debug, Deserialize)]
struct OpenSeaResponse {
    #[serde(default)]
    collections: Vec<OpenSeaCollection>,
}

#[derive(Debug, Deserialize)]
struct OpenSeaCollection {
    collection: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    contracts: Vec<OpenSeaContract>,
    #[serde(default)]
    is_disabled: bool,
    #[serde(default)]
    is_nsfw: bool,
}

#[derive(Debug, Deserialize)]
struct OpenSeaContract {
    address: String,
}

/// Collection source backed by the OpenSea v2 API.
pub struct OpenSeaSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    chain: String,
}

impl OpenSeaSource {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, chain: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chain: chain.to_string(),
        }
    }
}

/// Map each collection to its first contract. Disabled and NSFW collections
/// are kept but flagged so the filter drops them.
fn into_collections(response: OpenSeaResponse) -> Vec<Collection> {
    response
        .collections
        .into_iter()
        .filter_map(|c| {
            let contract = c.contracts.first()?;
            let contract_address = contract.address.parse::<Address>().ok()?;
            let name = if c.name.is_empty() { c.collection } else { c.name };

            let mut collection = Collection::new(contract_address, name);
            collection.deployer_address = c.owner.and_then(|o| o.parse().ok());
            if c.is_disabled {
                collection.reported_flags.insert("disabled".to_string());
            }
            if c.is_nsfw {
                collection.reported_flags.insert("nsfw".to_string());
            }
            Some(collection)
        })
        .collect()
}

#[async_trait]
impl CollectionSource for OpenSeaSource {
    fn name(&self) -> &str {
        "opensea"
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        let response: OpenSeaResponse = self
            .client
            .get(format!("{}/collections", self.base_url))
            .header("X-API-KEY", &self.api_key)
            .query(&[
                ("chain", self.chain.as_str()),
                ("order_by", "created_date"),
                ("limit", "50"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(into_collections(response))
    }
}
