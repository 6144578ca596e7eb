use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Need, OfferKey, Stage};
use super::profile::ProfileForm;
use super::scoring::ScoreInputs;
use super::service::{OfferService, OfferServiceError};
use super::wishlist::SessionStore;

/// Router builder exposing the diagnostic, filtering and wishlist endpoints.
pub fn offer_router<S>(service: Arc<OfferService<S>>) -> Router
where
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/offers", get(catalog_handler::<S>))
        .route("/api/v1/offers/matches", get(matches_handler::<S>))
        .route("/api/v1/offers/filter", get(filter_handler::<S>))
        .route(
            "/api/v1/profile",
            get(profile_handler::<S>)
                .post(submit_profile_handler::<S>)
                .delete(reset_profile_handler::<S>),
        )
        .route("/api/v1/score", post(score_handler::<S>))
        .route("/api/v1/wishlist", get(wishlist_handler::<S>))
        .route("/api/v1/wishlist/toggle", post(toggle_handler::<S>))
        .route("/api/v1/wishlist/export", get(export_handler::<S>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ClockQuery {
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

impl ClockQuery {
    fn now(&self) -> NaiveDateTime {
        self.today
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_else(|| Utc::now().naive_utc())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FilterQuery {
    #[serde(default)]
    pub(crate) stage: Option<String>,
    #[serde(default)]
    pub(crate) need: Option<String>,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ToggleRequest {
    pub(crate) source: String,
    pub(crate) title: String,
}

pub(crate) async fn catalog_handler<S>(State(service): State<Arc<OfferService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    (StatusCode::OK, axum::Json(&service.catalog().sources)).into_response()
}

pub(crate) async fn matches_handler<S>(
    State(service): State<Arc<OfferService<S>>>,
    Query(clock): Query<ClockQuery>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.current_matches(clock.now()) {
        Ok(matches) => (StatusCode::OK, axum::Json(matches)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn filter_handler<S>(
    State(service): State<Arc<OfferService<S>>>,
    Query(filter): Query<FilterQuery>,
) -> Response
where
    S: SessionStore + 'static,
{
    let stage = filter.stage.as_deref().and_then(Stage::parse);
    let need = filter.need.as_deref().and_then(Need::parse);
    let clock = ClockQuery {
        today: filter.today,
    };

    let matches = service.quick_filter(stage, need, clock.now());
    (StatusCode::OK, axum::Json(matches)).into_response()
}

pub(crate) async fn profile_handler<S>(State(service): State<Arc<OfferService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    match service.profile() {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_profile_handler<S>(
    State(service): State<Arc<OfferService<S>>>,
    Query(clock): Query<ClockQuery>,
    axum::Json(form): axum::Json<ProfileForm>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.submit_profile(form, clock.now()) {
        Ok(outcome) => (StatusCode::CREATED, axum::Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_profile_handler<S>(
    State(service): State<Arc<OfferService<S>>>,
) -> Response
where
    S: SessionStore + 'static,
{
    match service.reset_profile() {
        Ok(matches) => (StatusCode::OK, axum::Json(matches)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn score_handler<S>(
    State(service): State<Arc<OfferService<S>>>,
    axum::Json(inputs): axum::Json<ScoreInputs>,
) -> Response
where
    S: SessionStore + 'static,
{
    let outcome = service.score(&inputs);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn wishlist_handler<S>(State(service): State<Arc<OfferService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    match service.wishlist() {
        Ok(wishlist) => (StatusCode::OK, axum::Json(wishlist)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn toggle_handler<S>(
    State(service): State<Arc<OfferService<S>>>,
    axum::Json(request): axum::Json<ToggleRequest>,
) -> Response
where
    S: SessionStore + 'static,
{
    let key = OfferKey::new(request.source, request.title);
    match service.toggle_wishlist(&key) {
        Ok((toggle, wishlist)) => {
            let payload = json!({
                "id": key.to_string(),
                "status": toggle,
                "wishlist": wishlist,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<S>(State(service): State<Arc<OfferService<S>>>) -> Response
where
    S: SessionStore + 'static,
{
    match service.export_wishlist() {
        Ok(document) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            document.render_text(),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: OfferServiceError) -> Response {
    let status = match &err {
        OfferServiceError::Profile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        OfferServiceError::UnknownOffer(_) | OfferServiceError::Export(_) => StatusCode::NOT_FOUND,
        OfferServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
