mod config;
pub(crate) mod rules;

pub use config::MatchingConfig;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::domain::{Call, Catalog, Source};
use super::profile::MatchCriteria;

/// Stateless rule-based matcher: eligibility, stage adjacency, need tags and deadline window,
/// all of which must hold for a call to be kept.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn accepts(
        &self,
        criteria: &MatchCriteria,
        source: &Source,
        call: &Call,
        now: NaiveDateTime,
    ) -> bool {
        rules::eligibility_ok(call, criteria.previous_support)
            && rules::stage_ok(criteria.stage, call.stage)
            && rules::need_ok(criteria.need, source, call)
            && rules::deadline_ok(
                call,
                criteria.urgency.as_ref(),
                now,
                self.config.drop_expired,
            )
    }

    pub fn match_catalog(
        &self,
        catalog: &Catalog,
        criteria: &MatchCriteria,
        now: NaiveDateTime,
    ) -> MatchResult {
        let result = MatchResult::group(
            catalog
                .offers()
                .filter(|(source, call)| self.accepts(criteria, source, call, now)),
        );

        debug!(
            candidates = catalog.offer_count(),
            matched = result.call_count(),
            sources = result.len(),
            "matched catalog against profile"
        );

        result
    }
}

/// Matching calls regrouped by source, in catalog order. Sources without a match are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchResult {
    sources: Vec<Source>,
}

impl MatchResult {
    pub(crate) fn group<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a Source, &'a Call)>,
    {
        let mut sources: Vec<Source> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();

        for (source, call) in pairs {
            let position = *positions.entry(source.name.as_str()).or_insert_with(|| {
                sources.push(source.header());
                sources.len() - 1
            });
            sources[position].calls.push(call.clone());
        }

        Self { sources }
    }

    /// Whole catalog as a result, used when no profile is active.
    pub fn unfiltered(catalog: &Catalog) -> Self {
        Self::group(catalog.offers())
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn into_sources(self) -> Vec<Source> {
        self.sources
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.name == name)
    }

    pub fn titles(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|source| source.calls.iter().map(|call| call.title.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn call_count(&self) -> usize {
        self.sources.iter().map(|source| source.calls.len()).sum()
    }
}
