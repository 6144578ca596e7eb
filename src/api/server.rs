use super::cli::ServeArgs;
use super::infra::{AppState, InMemorySessionStore, JsonFileSessionStore};
use super::routes::with_offer_routes;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::telemetry;
use crate::workflows::offers::{CatalogLoader, OfferService, SessionStore};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.offers.store_dir.clone() {
        Some(dir) => {
            info!(store = %dir.display(), "persisting session records on disk");
            serve(config, Arc::new(JsonFileSessionStore::new(dir))).await
        }
        None => {
            info!("session records kept in memory");
            serve(config, Arc::new(InMemorySessionStore::default())).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: SessionStore + 'static,
{
    let catalog = Arc::new(CatalogLoader::load_or_empty(
        config.offers.catalog_path.as_deref(),
    ));
    let service = Arc::new(OfferService::new(
        catalog,
        store,
        config.offers.service_config(),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let app_state = AppState::new(prometheus_handle);
    let readiness_flag = app_state.readiness.clone();

    let app = with_offer_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "offer matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
