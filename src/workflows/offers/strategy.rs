use chrono::NaiveDateTime;

use super::domain::{Call, Catalog, Source};
use super::matching::{MatchResult, MatchingEngine};
use super::profile::MatchCriteria;
use super::scoring::{ScoreVector, ScoringEngine};

/// Common seam over the two ways of narrowing the catalog.
pub trait MatchingStrategy {
    fn label(&self) -> &'static str;

    fn accepts(&self, source: &Source, call: &Call) -> bool;

    fn select(&self, catalog: &Catalog) -> MatchResult {
        MatchResult::group(
            catalog
                .offers()
                .filter(|(source, call)| self.accepts(source, call)),
        )
    }
}

/// Profile-driven predicates evaluated at a fixed instant.
pub struct RuleBased<'a> {
    engine: &'a MatchingEngine,
    criteria: MatchCriteria,
    now: NaiveDateTime,
}

impl<'a> RuleBased<'a> {
    pub fn new(engine: &'a MatchingEngine, criteria: MatchCriteria, now: NaiveDateTime) -> Self {
        Self {
            engine,
            criteria,
            now,
        }
    }
}

impl MatchingStrategy for RuleBased<'_> {
    fn label(&self) -> &'static str {
        "rule_based"
    }

    fn accepts(&self, source: &Source, call: &Call) -> bool {
        self.engine.accepts(&self.criteria, source, call, self.now)
    }
}

/// Category threshold over a computed score vector.
pub struct ScoreBased<'a> {
    engine: &'a ScoringEngine,
    vector: ScoreVector,
}

impl<'a> ScoreBased<'a> {
    pub fn new(engine: &'a ScoringEngine, vector: ScoreVector) -> Self {
        Self { engine, vector }
    }

    pub fn vector(&self) -> &ScoreVector {
        &self.vector
    }
}

impl MatchingStrategy for ScoreBased<'_> {
    fn label(&self) -> &'static str {
        "score_based"
    }

    fn accepts(&self, _source: &Source, call: &Call) -> bool {
        self.engine.accepts(call, &self.vector)
    }
}
