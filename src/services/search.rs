use std::collections::HashSet;
use std::sync::Arc;

use crate::core::{MarketAnalyzer, QueryInterpreter, ScoringEngine};
use crate::models::{Capability, FilterParameters, MarketReport, PropertyRecord, ScoredProperty};
use crate::services::listings::ListingsClient;
use crate::services::llm::LlmClient;
use crate::services::profile::ProfileManager;
use crate::services::usage::{UsageTracker, DEFAULT_CALL_COST};

/// Outcome of one search invocation. Stage failures are recorded as
/// diagnostics; the remaining stages still run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub params: FilterParameters,
    pub properties: Vec<PropertyRecord>,
    pub scored: Vec<ScoredProperty>,
    pub market: Option<MarketReport>,
    pub diagnostics: Vec<String>,
}

/// Search orchestrator.
///
/// Pipeline: interpret the query (remote interpreter when configured,
/// rule-based fallback) -> fetch listings -> score against the profile
/// -> build the market report. No stage failure is fatal; disabled
/// capabilities are skipped.
pub struct SearchService {
    interpreter: QueryInterpreter,
    llm: Option<Arc<LlmClient>>,
    listings: Arc<ListingsClient>,
    scoring: ScoringEngine,
    market: Arc<MarketAnalyzer>,
    profiles: Arc<ProfileManager>,
    usage: Arc<UsageTracker>,
    capabilities: HashSet<Capability>,
    listing_limit: usize,
}

impl SearchService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Option<Arc<LlmClient>>,
        listings: Arc<ListingsClient>,
        market: Arc<MarketAnalyzer>,
        profiles: Arc<ProfileManager>,
        usage: Arc<UsageTracker>,
        capabilities: HashSet<Capability>,
        listing_limit: usize,
    ) -> Self {
        Self {
            interpreter: QueryInterpreter::new(),
            llm,
            listings,
            scoring: ScoringEngine::new(),
            market,
            profiles,
            usage,
            capabilities,
            listing_limit,
        }
    }

    fn enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Interpret free text into filter parameters.
    ///
    /// The remote interpreter is a single attempt; any failure falls
    /// back to the rule-based path and yields a diagnostic.
    pub async fn interpret(&self, text: &str) -> (FilterParameters, Option<String>) {
        if self.enabled(Capability::NaturalLanguageSearch) {
            if let Some(llm) = &self.llm {
                self.usage
                    .track(Capability::NaturalLanguageSearch, DEFAULT_CALL_COST)
                    .await;
                match llm.interpret(text).await {
                    Ok(mut params) => {
                        // Model output does not honor the field invariants
                        // the rule-based path guarantees
                        params.normalize();
                        return (params, None);
                    }
                    Err(e) => {
                        tracing::warn!("Remote interpreter failed, using rules: {}", e);
                        let diagnostic =
                            format!("Remote interpreter unavailable, used local rules: {}", e);
                        return (self.interpreter.interpret(text), Some(diagnostic));
                    }
                }
            }
        }

        (self.interpreter.interpret(text), None)
    }

    /// Run the full pipeline for one free-text query.
    pub async fn search(&self, text: &str, limit: usize) -> SearchOutcome {
        let mut diagnostics = Vec::new();

        let (params, interpret_diagnostic) = self.interpret(text).await;
        if let Some(diagnostic) = interpret_diagnostic {
            diagnostics.push(diagnostic);
        }

        let limit = limit.min(self.listing_limit);
        let properties = match self.listings.search_sale(&params, limit).await {
            Ok(properties) => properties,
            Err(e) => {
                tracing::warn!("Listings fetch failed, proceeding empty: {}", e);
                diagnostics.push(format!("Listings provider unavailable: {}", e));
                Vec::new()
            }
        };

        let scored = if self.enabled(Capability::Recommendations) {
            self.usage
                .track(Capability::Recommendations, DEFAULT_CALL_COST)
                .await;
            let profile = self.profiles.snapshot().await;
            self.scoring.score(&properties, &profile)
        } else {
            Vec::new()
        };

        let market = if self.enabled(Capability::MarketIntelligence) {
            self.usage
                .track(Capability::MarketIntelligence, DEFAULT_CALL_COST)
                .await;
            Some(self.market.analyze(&properties, &params.location_label()))
        } else {
            None
        };

        tracing::info!(
            "Search complete: {} listings, {} scored, market: {}",
            properties.len(),
            scored.len(),
            market.is_some()
        );

        SearchOutcome {
            params,
            properties,
            scored,
            market,
            diagnostics,
        }
    }
}
