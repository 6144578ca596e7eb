use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Call, Catalog};

/// Need categories scored by the self-assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Structuration,
    ModeleEco,
    Financement,
    Accompagnement,
    Visibilite,
    Partenaires,
}

impl ScoreCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Structuration,
            Self::ModeleEco,
            Self::Financement,
            Self::Accompagnement,
            Self::Visibilite,
            Self::Partenaires,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Structuration => "structuration",
            Self::ModeleEco => "modele_eco",
            Self::Financement => "financement",
            Self::Accompagnement => "accompagnement",
            Self::Visibilite => "visibilite",
            Self::Partenaires => "partenaires",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        Self::ordered()
            .into_iter()
            .find(|category| category.key() == lowered)
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Per-category score, always carrying all six categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreVector(BTreeMap<ScoreCategory, i32>);

impl ScoreVector {
    pub fn zeroed() -> Self {
        Self(
            ScoreCategory::ordered()
                .into_iter()
                .map(|category| (category, 0))
                .collect(),
        )
    }

    pub fn get(&self, category: ScoreCategory) -> i32 {
        self.0.get(&category).copied().unwrap_or_default()
    }

    pub fn set(&mut self, category: ScoreCategory, value: i32) {
        self.0.insert(category, value);
    }

    /// Sliders and urgency are unbounded, so sums saturate at the `i32` limits.
    fn add(&mut self, category: ScoreCategory, delta: i32) {
        let value = self.0.entry(category).or_default();
        *value = value.saturating_add(delta);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScoreCategory, i32)> + '_ {
        self.0.iter().map(|(category, value)| (*category, *value))
    }
}

impl Default for ScoreVector {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Self-assessment answers feeding the score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreInputs {
    #[serde(default)]
    pub structuration: i32,
    #[serde(default)]
    pub modele_eco: i32,
    /// Selected needs; duplicates accumulate.
    #[serde(default)]
    pub needs: Vec<ScoreCategory>,
    #[serde(default)]
    pub previous_support: bool,
    #[serde(default)]
    pub urgency: i32,
}

/// Rubric constants for the score-based variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub need_increment: i32,
    pub financing_ceiling: i32,
    pub threshold: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            need_increment: 5,
            financing_ceiling: 7,
            threshold: 5,
        }
    }
}

/// Score-based matcher: no stage, eligibility or deadline checks.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, inputs: &ScoreInputs) -> ScoreVector {
        let mut vector = ScoreVector::zeroed();
        vector.set(ScoreCategory::Structuration, inputs.structuration);
        vector.set(ScoreCategory::ModeleEco, inputs.modele_eco);

        for need in &inputs.needs {
            vector.add(*need, self.config.need_increment);
        }

        // Ceiling applies before the urgency offset.
        if inputs.previous_support {
            let capped = vector
                .get(ScoreCategory::Financement)
                .min(self.config.financing_ceiling);
            vector.set(ScoreCategory::Financement, capped);
        }

        for category in ScoreCategory::ordered() {
            vector.add(category, inputs.urgency);
        }

        debug!(?vector, "computed self-assessment score");
        vector
    }

    /// A call is kept when one of its own tags names a category at or above the threshold.
    pub fn accepts(&self, call: &Call, vector: &ScoreVector) -> bool {
        call.tags.iter().any(|tag| {
            ScoreCategory::parse(tag)
                .is_some_and(|category| vector.get(category) >= self.config.threshold)
        })
    }

    pub fn filter(&self, catalog: &Catalog, vector: &ScoreVector) -> Vec<Call> {
        catalog
            .offers()
            .filter(|(_, call)| self.accepts(call, vector))
            .map(|(_, call)| call.clone())
            .collect()
    }
}
