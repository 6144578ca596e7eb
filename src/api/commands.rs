use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;
use serde_json::json;

use super::infra::{
    evaluation_instant, parse_date, InMemorySessionStore, JsonFileSessionStore,
};
use crate::error::AppError;
use crate::telemetry;
use crate::workflows::offers::{
    export::DEFAULT_LINES_PER_PAGE, CatalogLoader, MatchCriteria, MatchingConfig, MatchingEngine,
    Need, OfferKey, OfferService, OfferServiceConfig, OfferServiceError, ProfileBuilder,
    ProfileForm, ProfileSummary, ScoreCategory, ScoreInputs, ScoreReport, ScoringConfig,
    ScoringEngine, SessionStore, Stage, WishlistExporter,
};

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Catalog file (JSON, or CSV when the extension is .csv)
    #[arg(long)]
    catalog: PathBuf,
    /// Project stage: idee, prototype, amorçage, developpement
    #[arg(long)]
    maturite: Option<String>,
    /// Primary need: financier, accompagnement, outil, visibilite
    #[arg(long)]
    besoin: Option<String>,
    #[arg(long)]
    nature: Option<String>,
    #[arg(long)]
    statut: Option<String>,
    /// Timing: now, 1month, 3months, ...
    #[arg(long)]
    echeance: Option<String>,
    /// Prior support received: true, false or unknown
    #[arg(long)]
    previous: Option<String>,
    /// Evaluation date (YYYY-MM-DD, defaults to now)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Exclude offers whose deadline has passed
    #[arg(long)]
    drop_expired: bool,
}

#[derive(Args, Debug)]
pub(crate) struct FilterArgs {
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long)]
    stage: Option<String>,
    #[arg(long)]
    need: Option<String>,
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    structuration: i32,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    modele_eco: i32,
    /// Selected need category; repeat to accumulate
    #[arg(long = "need", value_parser = parse_category)]
    needs: Vec<ScoreCategory>,
    /// The project already received support
    #[arg(long)]
    previous_support: bool,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    urgency: i32,
}

#[derive(Args, Debug)]
pub(crate) struct WishlistExportArgs {
    /// Directory holding wishlist.json and userProfile.json
    #[arg(long)]
    store_dir: PathBuf,
    #[arg(long, default_value_t = DEFAULT_LINES_PER_PAGE)]
    lines_per_page: usize,
}

#[derive(Args, Debug)]
pub(crate) struct WishlistToggleArgs {
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long)]
    store_dir: PathBuf,
    /// Source name of the offer
    #[arg(long)]
    source: String,
    /// Offer title
    #[arg(long)]
    title: String,
}

fn parse_category(raw: &str) -> Result<ScoreCategory, String> {
    ScoreCategory::parse(raw).ok_or_else(|| format!("unknown category '{raw}'"))
}

pub(crate) fn run_match(args: MatchArgs) -> Result<(), AppError> {
    telemetry::init_for_cli()?;
    let catalog = CatalogLoader::from_path(&args.catalog)?;

    let form = ProfileForm {
        maturite: args.maturite,
        besoin: args.besoin,
        nature: args.nature,
        statut: args.statut,
        echeance: args.echeance,
        previous: args.previous,
    };
    let profile = ProfileBuilder
        .build(form)
        .map_err(|err| AppError::Usage(err.to_string()))?;

    let engine = MatchingEngine::new(MatchingConfig {
        drop_expired: args.drop_expired,
    });
    let matches = engine.match_catalog(
        &catalog,
        &MatchCriteria::from(&profile),
        evaluation_instant(args.today),
    );

    let payload = json!({
        "summary": ProfileSummary::from_profile(&profile),
        "matches": matches,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    if matches.is_empty() {
        eprintln!("Aucune offre trouvée pour ces critères.");
    }
    Ok(())
}

pub(crate) fn run_filter(args: FilterArgs) -> Result<(), AppError> {
    telemetry::init_for_cli()?;
    let catalog = CatalogLoader::from_path(&args.catalog)?;
    let store = Arc::new(InMemorySessionStore::default());
    let service = OfferService::new(Arc::new(catalog), store, OfferServiceConfig::default());

    let stage = args.stage.as_deref().and_then(Stage::parse);
    let need = args.need.as_deref().and_then(Need::parse);
    let matches = service.quick_filter(stage, need, evaluation_instant(args.today));

    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    telemetry::init_for_cli()?;
    let catalog = CatalogLoader::from_path(&args.catalog)?;
    let engine = ScoringEngine::new(ScoringConfig::default());

    let inputs = ScoreInputs {
        structuration: args.structuration,
        modele_eco: args.modele_eco,
        needs: args.needs,
        previous_support: args.previous_support,
        urgency: args.urgency,
    };
    let vector = engine.score(&inputs);
    let offers = engine.filter(&catalog, &vector);

    let payload = json!({
        "report": ScoreReport::from_vector(vector),
        "offers": offers,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub(crate) fn run_wishlist_export(args: WishlistExportArgs) -> Result<(), AppError> {
    telemetry::init_for_cli()?;
    let store = JsonFileSessionStore::new(args.store_dir);
    let wishlist = store.load_wishlist().map_err(OfferServiceError::from)?;
    let profile = store.load_profile().map_err(OfferServiceError::from)?;

    let document = WishlistExporter::new(args.lines_per_page)
        .export(&wishlist, profile.as_ref())
        .map_err(OfferServiceError::from)?;
    println!("{}", document.render_text());
    Ok(())
}

pub(crate) fn run_wishlist_toggle(args: WishlistToggleArgs) -> Result<(), AppError> {
    telemetry::init_for_cli()?;
    let catalog = CatalogLoader::from_path(&args.catalog)?;
    let store = Arc::new(JsonFileSessionStore::new(args.store_dir));
    let service = OfferService::new(Arc::new(catalog), store, OfferServiceConfig::default());

    let key = OfferKey::new(args.source, args.title);
    let (toggle, wishlist) = service.toggle_wishlist(&key)?;
    let payload = json!({
        "id": key.to_string(),
        "status": toggle,
        "size": wishlist.len(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
