use serde::{Deserialize, Serialize};

/// Tunables for the rule-based matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Exclude offers whose deadline is already behind `now`. Off by default so expired offers
    /// stay listed.
    #[serde(default)]
    pub drop_expired: bool,
}
