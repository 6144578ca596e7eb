use serde::{Deserialize, Serialize};

use super::domain::{Need, PreviousSupport, Profile, Stage, Urgency};

/// Validation errors raised while building a profile from diagnostic answers.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("missing required field `{0}`: choose at least a project stage and a primary need")]
    MissingField(&'static str),
    #[error("unrecognized value `{value}` for `{field}`")]
    InvalidValue { field: &'static str, value: String },
}

/// Raw diagnostic answers as submitted by the form. Every field is optional at this layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub maturite: Option<String>,
    #[serde(default)]
    pub besoin: Option<String>,
    #[serde(default)]
    pub nature: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub echeance: Option<String>,
    #[serde(default, alias = "previous_support")]
    pub previous: Option<String>,
}

impl ProfileForm {
    /// Collect answers from `key=value` style pairs, ignoring unknown keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let value = Some(value.into());
            match key.as_ref() {
                "maturite" => form.maturite = value,
                "besoin" => form.besoin = value,
                "nature" => form.nature = value,
                "statut" => form.statut = value,
                "echeance" => form.echeance = value,
                "previous" | "previous_support" => form.previous = value,
                _ => {}
            }
        }
        form
    }
}

/// Turns raw answers into a validated [`Profile`]. Persisting the result is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileBuilder;

impl ProfileBuilder {
    pub fn build(&self, form: ProfileForm) -> Result<Profile, ProfileError> {
        let maturite = non_empty(form.maturite).ok_or(ProfileError::MissingField("maturite"))?;
        let besoin = non_empty(form.besoin).ok_or(ProfileError::MissingField("besoin"))?;

        let maturite = Stage::parse(&maturite).ok_or_else(|| ProfileError::InvalidValue {
            field: "maturite",
            value: maturite.clone(),
        })?;
        let besoin = Need::parse(&besoin).ok_or_else(|| ProfileError::InvalidValue {
            field: "besoin",
            value: besoin.clone(),
        })?;

        Ok(Profile {
            maturite,
            besoin,
            nature: non_empty(form.nature),
            statut: non_empty(form.statut),
            echeance: non_empty(form.echeance).map(Urgency::from),
            previous_support: non_empty(form.previous)
                .map(|raw| PreviousSupport::parse(&raw))
                .unwrap_or_default(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Partial profile consumed by the rule-based matcher. `None` on any axis means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub stage: Option<Stage>,
    pub need: Option<Need>,
    pub previous_support: PreviousSupport,
    pub urgency: Option<Urgency>,
}

impl MatchCriteria {
    /// Criteria for the stage/need quick filter: eligibility and deadlines are never checked.
    pub fn quick_filter(stage: Option<Stage>, need: Option<Need>) -> Self {
        Self {
            stage,
            need,
            previous_support: PreviousSupport::Unknown,
            urgency: None,
        }
    }
}

impl From<&Profile> for MatchCriteria {
    fn from(profile: &Profile) -> Self {
        Self {
            stage: Some(profile.maturite),
            need: Some(profile.besoin),
            previous_support: profile.previous_support,
            urgency: profile.echeance.clone(),
        }
    }
}
