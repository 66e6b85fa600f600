//! Combines several collection providers behind one source.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::sources::demo::DemoCollections;
use crate::sources::types::{Collection, SourceError, SourceResult};
use crate::sources::CollectionSource;

/// Queries every provider in order and merges the results.
///
/// A failing provider is logged and skipped; the others still contribute.
/// When every provider fails the fetch fails with all their messages. When
/// providers answer but return nothing the demo batch is used instead. The
/// merged batch is always passed through [`filter_collections`].
pub struct AggregateSource {
    providers: Vec<Arc<dyn CollectionSource>>,
    demo_fallback: bool,
}

impl AggregateSource {
    pub fn new(providers: Vec<Arc<dyn CollectionSource>>) -> Self {
        Self {
            providers,
            demo_fallback: true,
        }
    }

    /// Disable the demo fallback; an empty merge then yields an empty batch.
    pub fn without_demo_fallback(mut self) -> Self {
        self.demo_fallback = false;
        self
    }
}

#[async_trait]
impl CollectionSource for AggregateSource {
    fn name(&self) -> &str {
        "aggregate"
    }

    async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
        let mut all = Vec::new();
        let mut failures = Vec::new();

        for provider in &self.providers {
            match provider.fetch_collections().await {
                Ok(mut batch) => {
                    tracing::debug!(provider = provider.name(), count = batch.len(), "Provider returned collections");
                    all.append(&mut batch);
                }
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "Provider fetch failed");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        if !self.providers.is_empty() && failures.len() == self.providers.len() {
            return Err(SourceError::AllProvidersFailed(failures.join("; ")));
        }

        if all.is_empty() && self.demo_fallback {
            tracing::info!("No collections from providers, falling back to demo data");
            return Ok(DemoCollections::collections());
        }

        let filtered = filter_collections(all);
        tracing::info!(count = filtered.len(), "Fetched collections from providers");
        Ok(filtered)
    }
}

/// Drop reported collections and repeated contract addresses (first wins).
pub fn filter_collections(collections: Vec<Collection>) -> Vec<Collection> {
    let mut seen = HashSet::new();
    collections
        .into_iter()
        .filter(|c| !c.is_reported())
        .filter(|c| seen.insert(c.contract_address))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    struct Fixed(Vec<Collection>);

    #[async_trait]
    impl CollectionSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    #[async_trait]
    impl CollectionSource for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        async fn fetch_collections(&self) -> SourceResult<Vec<Collection>> {
            Err(SourceError::Decode("bad body".to_string()))
        }
    }

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_filter_drops_reported_and_duplicates() {
        let mut reported = Collection::new(addr(2), "Reported");
        reported.reported_flags.insert("spam".to_string());

        let filtered = filter_collections(vec![
            Collection::new(addr(1), "First"),
            reported,
            Collection::new(addr(1), "Second copy"),
            Collection::new(addr(3), "Third"),
        ]);

        let names: Vec<_> = filtered.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Third"]);
    }

    #[tokio::test]
    async fn test_failing_provider_does_not_hide_others() {
        let source = AggregateSource::new(vec![
            Arc::new(Broken),
            Arc::new(Fixed(vec![Collection::new(addr(9), "Nine")])),
        ]);
        let batch = source.fetch_collections().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].name, "Nine");
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_an_error() {
        let source = AggregateSource::new(vec![Arc::new(Broken), Arc::new(Broken)]);
        let err = source.fetch_collections().await.unwrap_err();
        assert!(matches!(err, SourceError::AllProvidersFailed(_)));
        assert_eq!(
            err.to_string(),
            "All providers failed: broken: Decode error: bad body; broken: Decode error: bad body"
        );
    }

    #[tokio::test]
    async fn test_demo_fallback_when_providers_answer_empty() {
        let source = AggregateSource::new(vec![Arc::new(Broken), Arc::new(Fixed(Vec::new()))]);
        let batch = source.fetch_collections().await.unwrap();
        assert_eq!(batch, DemoCollections::collections());

        let strict = AggregateSource::new(vec![Arc::new(Fixed(Vec::new()))]).without_demo_fallback();
        assert!(strict.fetch_collections().await.unwrap().is_empty());
    }
}
