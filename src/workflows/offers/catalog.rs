//! Catalog adapter: reads either catalog shape and normalizes it into [`Catalog`].

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{error, info, warn};

use super::domain::{Call, Catalog, Eligibility, Source, Stage};

/// Source name given to flat offers that do not name their provider.
pub const DEFAULT_SOURCE_NAME: &str = "Catalogue";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid catalog CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Flat(Vec<Value>),
    Grouped(Catalog),
}

#[derive(Deserialize)]
struct FlatOffer {
    #[serde(default, deserialize_with = "optional_name")]
    source: Option<String>,
    #[serde(flatten)]
    call: Call,
}

pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a JSON catalog, or a CSV export when the file extension is `.csv`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Catalog, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_reader(file)
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Catalog, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        let catalog = match document {
            CatalogDocument::Grouped(catalog) => catalog,
            CatalogDocument::Flat(offers) => normalize_flat(
                offers
                    .into_iter()
                    .enumerate()
                    .filter_map(|(index, offer)| read_flat_offer(index, offer)),
            ),
        };
        Ok(catalog)
    }

    /// Flat CSV export with `title,deadline,tags,url` columns plus optional `source`, `stage`,
    /// `note` and `previous_support`. Tags are separated by `;` or `|`.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Catalog, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut offers = Vec::new();

        for row in csv_reader.deserialize::<CsvOfferRow>() {
            let row = row?;
            offers.push(row.into_offer());
        }

        Ok(normalize_flat(offers))
    }

    /// Missing or broken catalogs are logged and replaced by an empty one.
    pub fn load_or_empty(path: Option<&Path>) -> Catalog {
        let Some(path) = path else {
            info!("no catalog configured, starting with an empty catalog");
            return Catalog::default();
        };

        match Self::from_path(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    sources = catalog.sources.len(),
                    offers = catalog.offer_count(),
                    "catalog loaded"
                );
                catalog
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "failed to load catalog");
                Catalog::default()
            }
        }
    }
}

fn read_flat_offer(index: usize, offer: Value) -> Option<(Option<String>, Call)> {
    match serde_json::from_value::<FlatOffer>(offer) {
        Ok(offer) => Some((offer.source, offer.call)),
        Err(err) => {
            warn!(index, error = %err, "skipping unreadable flat offer");
            None
        }
    }
}

fn normalize_flat<I>(offers: I) -> Catalog
where
    I: IntoIterator<Item = (Option<String>, Call)>,
{
    let mut sources: Vec<Source> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (source, call) in offers {
        let name = source
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());
        let position = match positions.get(&name) {
            Some(position) => *position,
            None => {
                sources.push(Source {
                    name: name.clone(),
                    tags: Vec::new(),
                    calls: Vec::new(),
                });
                positions.insert(name, sources.len() - 1);
                sources.len() - 1
            }
        };
        sources[position].calls.push(call);
    }

    Catalog::new(sources)
}

#[derive(Debug, Deserialize)]
struct CsvOfferRow {
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    deadline: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    tags: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    url: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    stage: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    note: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    previous_support: Option<String>,
}

impl CsvOfferRow {
    fn into_offer(self) -> (Option<String>, Call) {
        let tags = self
            .tags
            .as_deref()
            .map(|raw| {
                raw.split(|c| c == ';' || c == '|')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let previous_support = match self.previous_support.as_deref().map(str::trim) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        let call = Call {
            title: self.title,
            url: self.url.unwrap_or_default(),
            deadline: self.deadline.unwrap_or_default(),
            stage: self.stage.as_deref().and_then(Stage::parse),
            tags,
            note: self.note.unwrap_or_default(),
            eligibility: Eligibility { previous_support },
        };

        (self.source, call)
    }
}

fn optional_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_str().map(str::to_string))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
