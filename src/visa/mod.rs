//! Visa extraction pipeline
//!
//! Two independent acquisition strategies (static page fetch, interactive
//! form automation) each produce raw page text that is piped through one
//! LLM-backed structuring step. Surviving sources are kept side by side with
//! their provenance; reconciling discrepancies between them is deferred to
//! the downstream itinerary composition.

pub mod cache;
pub mod interactive;
pub mod static_page;

pub use cache::{VisaCache, normalize_country};
pub use interactive::InteractiveFormStrategy;
pub use static_page::StaticPageStrategy;

use crate::config::VisaConfig;
use crate::llm::VisaExtractor;
use crate::models::{AggregatedVisaResult, VisaInfo, VisaSource};
use crate::provider::ProviderResult;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

use static_page::STATIC_STRATEGY_NAME;

/// Default passport country when the caller gives none
pub const DEFAULT_PASSPORT_COUNTRY: &str = "India";

/// One independent technique for obtaining visa-requirement text prior to
/// LLM structuring
#[async_trait]
pub trait VisaStrategy: Send + Sync {
    /// Source name recorded as provenance on the aggregated result
    fn name(&self) -> &'static str;

    /// Fetch raw visa-requirement text for a destination/passport pair
    async fn acquire(&self, destination: &str, passport: &str) -> ProviderResult<String>;
}

/// Orchestrates the acquisition strategies, the extraction step and the
/// write-once cache
pub struct VisaPipeline {
    strategies: Vec<Box<dyn VisaStrategy>>,
    extractor: Box<dyn VisaExtractor>,
    cache: Option<VisaCache>,
}

impl VisaPipeline {
    /// Build the standard pipeline: static page first, then the interactive
    /// form, both feeding the given extractor
    pub fn new(config: &VisaConfig, extractor: Box<dyn VisaExtractor>) -> Result<Self> {
        let strategies: Vec<Box<dyn VisaStrategy>> = vec![
            Box::new(StaticPageStrategy::new(config)?),
            Box::new(InteractiveFormStrategy::new(config)),
        ];
        let cache = config.cache_path.as_ref().map(VisaCache::new);
        Ok(Self {
            strategies,
            extractor,
            cache,
        })
    }

    /// Assemble a pipeline from explicit parts
    pub fn with_parts(
        strategies: Vec<Box<dyn VisaStrategy>>,
        extractor: Box<dyn VisaExtractor>,
        cache: Option<VisaCache>,
    ) -> Self {
        Self {
            strategies,
            extractor,
            cache,
        }
    }

    /// Collect visa requirements from every strategy.
    ///
    /// Strategies that fail are dropped with a warning; if all fail the
    /// result carries zero sources, which consumers must treat as "no visa
    /// data available", not as a hard error. A cached record short-circuits
    /// the static strategy.
    #[instrument(skip(self))]
    pub async fn scrape_visa_requirements(
        &self,
        destination: &str,
        passport: Option<&str>,
    ) -> AggregatedVisaResult {
        let passport = passport.unwrap_or(DEFAULT_PASSPORT_COUNTRY);
        let cached: Option<VisaInfo> = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(destination));

        let mut sources = Vec::new();
        for strategy in &self.strategies {
            let name = strategy.name();

            if name == STATIC_STRATEGY_NAME {
                if let Some(info) = cached.clone() {
                    info!(destination, "serving static visa source from cache");
                    sources.push(VisaSource {
                        source: name.to_string(),
                        info,
                    });
                    continue;
                }
            }

            let text = match strategy.acquire(destination, passport).await {
                ProviderResult::Success { data } => data,
                ProviderResult::Failure { error, .. } => {
                    warn!(%error, source = name, "visa strategy failed, continuing");
                    continue;
                }
            };

            let info = match self
                .extractor
                .extract_visa_info(&text, destination, passport)
                .await
            {
                Ok(info) => info,
                Err(e) => {
                    warn!(%e, source = name, "visa extraction failed, continuing");
                    continue;
                }
            };

            if name == STATIC_STRATEGY_NAME {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache.put_if_absent(destination, &info) {
                        warn!(%e, destination, "could not write visa cache");
                    }
                }
            }

            sources.push(VisaSource {
                source: name.to_string(),
                info,
            });
        }

        info!(
            destination,
            passport,
            sources = sources.len(),
            "visa aggregation complete"
        );

        AggregatedVisaResult {
            destination_country: destination.to_string(),
            passport_country: passport.to_string(),
            total_sources: sources.len(),
            sources,
            collected_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisaType;
    use crate::provider::{FailureKind, ProviderError};
    use crate::{Result as TripResult, TripScoutError};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedStrategy {
        name: &'static str,
        outcome: std::result::Result<&'static str, FailureKind>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedStrategy {
        fn ok(name: &'static str, text: &'static str) -> Self {
            Self {
                name,
                outcome: Ok(text),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(name: &'static str, kind: FailureKind) -> Self {
            Self {
                name,
                outcome: Err(kind),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl VisaStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn acquire(&self, destination: &str, _passport: &str) -> ProviderResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(text) => ProviderResult::success(text.to_string()),
                Err(kind) => ProviderResult::failure(ProviderError::new(
                    kind,
                    "strategy broke",
                    destination,
                )),
            }
        }
    }

    struct EchoExtractor;

    #[async_trait]
    impl crate::llm::VisaExtractor for EchoExtractor {
        async fn extract_visa_info(
            &self,
            _page_text: &str,
            destination: &str,
            passport: &str,
        ) -> TripResult<VisaInfo> {
            let mut info = VisaInfo::unknown(destination, passport);
            info.visa_type = VisaType::EVisa;
            info.confidence_level = 0.8;
            Ok(info)
        }
    }

    struct BrokenExtractor;

    #[async_trait]
    impl crate::llm::VisaExtractor for BrokenExtractor {
        async fn extract_visa_info(
            &self,
            _page_text: &str,
            _destination: &str,
            _passport: &str,
        ) -> TripResult<VisaInfo> {
            Err(TripScoutError::extraction("reply was not JSON"))
        }
    }

    #[tokio::test]
    async fn test_surviving_strategy_kept_when_other_fails() {
        let pipeline = VisaPipeline::with_parts(
            vec![
                Box::new(FixedStrategy::failing(
                    STATIC_STRATEGY_NAME,
                    FailureKind::UpstreamUnavailable,
                )),
                Box::new(FixedStrategy::ok("interactive_form", "visa on arrival text")),
            ],
            Box::new(EchoExtractor),
            None,
        );

        let result = pipeline.scrape_visa_requirements("Japan", None).await;
        assert_eq!(result.total_sources, 1);
        assert_eq!(result.sources[0].source, "interactive_form");
        assert_eq!(result.passport_country, "India");
    }

    #[tokio::test]
    async fn test_all_strategies_failing_yields_zero_sources() {
        let pipeline = VisaPipeline::with_parts(
            vec![
                Box::new(FixedStrategy::failing(
                    STATIC_STRATEGY_NAME,
                    FailureKind::UpstreamUnavailable,
                )),
                Box::new(FixedStrategy::failing(
                    "interactive_form",
                    FailureKind::BrowserAutomationFault,
                )),
            ],
            Box::new(EchoExtractor),
            None,
        );

        let result = pipeline.scrape_visa_requirements("Japan", Some("France")).await;
        assert_eq!(result.total_sources, 0);
        assert!(result.sources.is_empty());
        assert_eq!(result.destination_country, "Japan");
        assert_eq!(result.passport_country, "France");
    }

    #[tokio::test]
    async fn test_extraction_failure_drops_the_source() {
        let pipeline = VisaPipeline::with_parts(
            vec![Box::new(FixedStrategy::ok(
                STATIC_STRATEGY_NAME,
                "some page text",
            ))],
            Box::new(BrokenExtractor),
            None,
        );

        let result = pipeline.scrape_visa_requirements("Japan", None).await;
        assert_eq!(result.total_sources, 0);
    }

    #[tokio::test]
    async fn test_cache_short_circuits_static_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VisaCache::new(dir.path().join("visa_cache.json"));
        let mut seeded = VisaInfo::unknown("Japan", "India");
        seeded.visa_type = VisaType::VisaFree;
        cache.put_if_absent("Japan", &seeded).unwrap();

        let static_strategy = FixedStrategy::ok(STATIC_STRATEGY_NAME, "unused");
        let static_calls = Arc::clone(&static_strategy.calls);
        let pipeline = VisaPipeline::with_parts(
            vec![Box::new(static_strategy)],
            Box::new(EchoExtractor),
            Some(cache),
        );

        let result = pipeline.scrape_visa_requirements("Japan", None).await;
        assert_eq!(result.total_sources, 1);
        assert_eq!(result.sources[0].info.visa_type, VisaType::VisaFree);
        // The static fetch never ran
        assert_eq!(static_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_static_result_written_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("visa_cache.json");
        let pipeline = VisaPipeline::with_parts(
            vec![Box::new(FixedStrategy::ok(
                STATIC_STRATEGY_NAME,
                "e-visa required",
            ))],
            Box::new(EchoExtractor),
            Some(VisaCache::new(&cache_path)),
        );

        pipeline.scrape_visa_requirements("Japan", None).await;

        let reread = VisaCache::new(&cache_path);
        assert_eq!(reread.get("Japan").unwrap().visa_type, VisaType::EVisa);
    }
}
