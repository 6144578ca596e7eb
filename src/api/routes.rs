use super::infra::{deserialize_optional_date, evaluation_instant, AppState};
use crate::error::AppError;
use crate::workflows::offers::{
    offer_router, CatalogLoader, MatchCriteria, MatchResult, MatchingEngine, OfferService,
    OfferServiceError, ProfileBuilder, ProfileForm, ProfileSummary, SessionStore,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Stateless matching over a catalog supplied in the request body.
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogPreviewRequest {
    pub(crate) catalog: String,
    #[serde(default)]
    pub(crate) format: CatalogFormat,
    pub(crate) profile: ProfileForm,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CatalogFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogPreviewResponse {
    pub(crate) today: NaiveDate,
    pub(crate) summary: ProfileSummary,
    pub(crate) matches: MatchResult,
}

pub(crate) fn with_offer_routes<S>(service: Arc<OfferService<S>>) -> axum::Router
where
    S: SessionStore + 'static,
{
    let matcher = Arc::new(MatchingEngine::new(*service.matching_config()));

    offer_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/catalog/preview",
            axum::routing::post(catalog_preview_endpoint),
        )
        .layer(Extension(matcher))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn catalog_preview_endpoint(
    Extension(matcher): Extension<Arc<MatchingEngine>>,
    Json(payload): Json<CatalogPreviewRequest>,
) -> Result<Json<CatalogPreviewResponse>, AppError> {
    let CatalogPreviewRequest {
        catalog,
        format,
        profile,
        today,
    } = payload;

    let reader = Cursor::new(catalog.into_bytes());
    let catalog = match format {
        CatalogFormat::Json => CatalogLoader::from_reader(reader)?,
        CatalogFormat::Csv => CatalogLoader::from_csv_reader(reader)?,
    };

    let profile = ProfileBuilder
        .build(profile)
        .map_err(OfferServiceError::from)?;
    let now = evaluation_instant(today);
    let matches = matcher.match_catalog(&catalog, &MatchCriteria::from(&profile), now);

    Ok(Json(CatalogPreviewResponse {
        today: now.date(),
        summary: ProfileSummary::from_profile(&profile),
        matches,
    }))
}
