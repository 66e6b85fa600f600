//! Alchemy adapter: newly deployed contracts via `getContractsForOwner`.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::types::{Collection, SourceResult};
use crate::sources::CollectionSource;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlchemyResponse {
    #[serde(default)]
    contracts: Vec<AlchemyContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlchemyContract {
    address: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    contract_deployer: Option<String>,
    #[serde(default)]
    is_spam: bool,
}

/// Collection source backed by the Alchemy NFT API.
pub struct AlchemySource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    owner: String,
}

impl AlchemySource {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, owner: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            owner: owner.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/getContractsForOwner", self.base_url, self.api_key)
    }
}

/// Keep named, non-spam contracts with a parseable address.
fn into_collections(response: AlchemyResponse) -> Vec<Collection> {
    response
        .contracts
        .into_iter()
        .filter(|c| !c.is_spam)
        .filter_map(|c| {
            let name = c.name.filter(|n| !n.is_empty())?;
            let contract_address = match c.address.parse::<Address>() {
                Ok(addr) => addr,
                Err(e) => {
                    tracing::warn!(address = %c.address, error = %e, "Alchemy returned invalid contract address");
                    return None;
                }
            };
            let mut collection = Collection::new(contract_address, name);
            collection.deployer_address = c.contract_deployer.and_then(|d| d.parse().ok());
            Some(collection)
        })
        .collect()
}

#[async_trait]
impl CollectionSource for AlchemySource {
    fn name(&self) -> &str {
        "alchemy"
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        let response: AlchemyResponse = self
            .client
            .get(self.endpoint())
            .query(&[
                ("owner", self.owner.as_str()),
                ("withMetadata", "true"),
                ("pageSize", "20"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::debug!(contracts = response.contracts.len(), "Alchemy response received");
        Ok(into_collections(response))
    }
}
