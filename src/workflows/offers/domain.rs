use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Project maturity, ordered from earliest to latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "idee", alias = "idée")]
    Idee,
    #[serde(rename = "prototype")]
    Prototype,
    #[serde(rename = "amorçage", alias = "amorcage")]
    Amorcage,
    #[serde(rename = "developpement", alias = "développement")]
    Developpement,
}

impl Stage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Idee,
            Self::Prototype,
            Self::Amorcage,
            Self::Developpement,
        ]
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Idee => 0,
            Self::Prototype => 1,
            Self::Amorcage => 2,
            Self::Developpement => 3,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Idee => "idee",
            Self::Prototype => "prototype",
            Self::Amorcage => "amorçage",
            Self::Developpement => "developpement",
        }
    }

    /// Lenient parse used at the form and catalog boundaries.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "idee" | "idée" => Some(Self::Idee),
            "prototype" => Some(Self::Prototype),
            "amorçage" | "amorcage" => Some(Self::Amorcage),
            "developpement" | "développement" => Some(Self::Developpement),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Primary need declared in the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Need {
    #[serde(alias = "financement")]
    Financier,
    Accompagnement,
    #[serde(alias = "outils")]
    Outil,
    #[serde(alias = "visibilité")]
    Visibilite,
}

impl Need {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Financier,
            Self::Accompagnement,
            Self::Outil,
            Self::Visibilite,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Financier => "financier",
            Self::Accompagnement => "accompagnement",
            Self::Outil => "outil",
            Self::Visibilite => "visibilite",
        }
    }

    /// Lowercase tag keywords that satisfy this need. Catalogs tag money offers with
    /// `financement`, so the financing need answers to both spellings.
    pub const fn tag_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Financier => &["financier", "financement"],
            Self::Accompagnement => &["accompagnement"],
            Self::Outil => &["outil", "outils"],
            Self::Visibilite => &["visibilite", "visibilité"],
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        Self::ordered()
            .into_iter()
            .find(|need| need.tag_keywords().contains(&lowered.as_str()))
    }

    pub fn matches_tag(self, tag: &str) -> bool {
        let lowered = tag.trim().to_lowercase();
        self.tag_keywords().contains(&lowered.as_str())
    }
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether the project already received support. `Unknown` never excludes an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PreviousSupport {
    #[serde(rename = "true")]
    Yes,
    #[serde(rename = "false")]
    No,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl PreviousSupport {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "oui" => Self::Yes,
            "false" | "no" | "non" => Self::No,
            _ => Self::Unknown,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Yes => "true",
            Self::No => "false",
            Self::Unknown => "unknown",
        }
    }
}

/// How soon the project needs the support. Unrecognized answers are kept verbatim and never
/// restrict deadlines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Urgency {
    Now,
    OneMonth,
    ThreeMonths,
    Other(String),
}

impl Urgency {
    /// Maximum number of days until the deadline an offer may be to stay relevant.
    pub fn window_days(&self) -> Option<f64> {
        match self {
            Urgency::Now => Some(30.0),
            Urgency::OneMonth => Some(60.0),
            Urgency::ThreeMonths => Some(120.0),
            Urgency::Other(_) => None,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Urgency::Now => "now",
            Urgency::OneMonth => "1month",
            Urgency::ThreeMonths => "3months",
            Urgency::Other(value) => value,
        }
    }
}

impl From<String> for Urgency {
    fn from(value: String) -> Self {
        match value.trim() {
            "now" => Urgency::Now,
            "1month" => Urgency::OneMonth,
            "3months" => Urgency::ThreeMonths,
            _ => Urgency::Other(value),
        }
    }
}

impl From<Urgency> for String {
    fn from(value: Urgency) -> Self {
        value.key().to_string()
    }
}

/// Offer-side rule on prior support: `Some(false)` forbids cumulation, `Some(true)` requires
/// prior support, `None` places no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_support: Option<bool>,
}

impl Eligibility {
    pub fn admits(&self, previous: PreviousSupport) -> bool {
        !matches!(
            (previous, self.previous_support),
            (PreviousSupport::Yes, Some(false)) | (PreviousSupport::No, Some(true))
        )
    }
}

/// A single funding or support opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub deadline: String,
    #[serde(
        default,
        deserialize_with = "lenient_stage",
        skip_serializing_if = "Option::is_none"
    )]
    pub stage: Option<Stage>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient_eligibility")]
    pub eligibility: Eligibility,
}

impl Call {
    /// Deadline as midnight UTC, or `None` when the catalog value is missing or malformed.
    pub fn deadline_at(&self) -> Option<NaiveDateTime> {
        parse_deadline(&self.deadline)
    }
}

/// Organization grouping one or more calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    /// Calls that cannot be read at all are skipped with a warning.
    #[serde(default, deserialize_with = "lenient_calls")]
    pub calls: Vec<Call>,
}

impl Source {
    /// Copy of the source metadata without any calls.
    pub fn header(&self) -> Self {
        Self {
            name: self.name.clone(),
            tags: self.tags.clone(),
            calls: Vec::new(),
        }
    }
}

/// Read-only offer catalog shared for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,
}

impl Catalog {
    pub fn new(sources: Vec<Source>) -> Self {
        Self { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(|source| source.calls.is_empty())
    }

    pub fn offer_count(&self) -> usize {
        self.sources.iter().map(|source| source.calls.len()).sum()
    }

    /// Every `(source, call)` pair in catalog order.
    pub fn offers(&self) -> impl Iterator<Item = (&Source, &Call)> {
        self.sources
            .iter()
            .flat_map(|source| source.calls.iter().map(move |call| (source, call)))
    }

    pub fn find(&self, source_name: &str, title: &str) -> Option<(&Source, &Call)> {
        self.offers()
            .find(|(source, call)| source.name == source_name && call.title == title)
    }
}

/// Composite identity of an offer, rendered as `source::title`. The rendering is for display
/// and storage only; it is never parsed back since either part may contain `::`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct OfferKey {
    pub source: String,
    pub title: String,
}

impl OfferKey {
    pub fn new(source: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for OfferKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.source, self.title)
    }
}

impl From<OfferKey> for String {
    fn from(value: OfferKey) -> Self {
        value.to_string()
    }
}

/// Self-reported project status driving the filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub maturite: Stage,
    pub besoin: Need,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statut: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echeance: Option<Urgency>,
    #[serde(default)]
    pub previous_support: PreviousSupport,
}

pub(crate) fn parse_deadline(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_stage<'de, D>(deserializer: D) -> Result<Option<Stage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(Stage::parse))
}

/// Strings are kept, numbers are rendered, anything else becomes empty.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        Value::String(tag) => vec![tag],
        _ => Vec::new(),
    })
}

/// Only a JSON boolean restricts eligibility; strings, numbers and other shapes are neutral.
fn lenient_eligibility<'de, D>(deserializer: D) -> Result<Eligibility, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(Eligibility {
        previous_support: raw.get("previous_support").and_then(Value::as_bool),
    })
}

fn lenient_calls<'de, D>(deserializer: D) -> Result<Vec<Call>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<Call>(item) {
            Ok(call) => Some(call),
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable catalog call");
                None
            }
        })
        .collect())
}
