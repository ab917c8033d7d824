use axum::{routing::get, routing::post, Router};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::alerts::{spawn_alert_watcher, AlertNotifier};
use crate::config::Config;
use crate::dashboard::{Dashboard, Sources};
use crate::favorites::{FavoritesStore, FileStore};
use crate::feeds::build_client;
use crate::refresh::Scheduler;

use super::api::alerts as alert_handlers;
use super::api::favorites as favorite_handlers;
use super::api::proxy::{self as proxy_handlers, ProxyTarget};
use super::api::sources as source_handlers;
use super::api_doc::ApiDoc;
use super::state::AppState;

const ALERT_CHANNEL_CAPACITY: usize = 64;

pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Source data
        .route("/api/status", get(source_handlers::status))
        .route("/api/catalog", get(source_handlers::catalog))
        .route("/api/catalog/positions", get(source_handlers::positions))
        .route("/api/catalog/{name}/track", get(source_handlers::track))
        .route("/api/signals", get(source_handlers::signals))
        .route("/api/signals/anomalies", get(source_handlers::anomalies))
        .route("/api/passes", get(source_handlers::passes))
        .route(
            "/api/sources/{source}/refresh",
            post(source_handlers::refresh),
        )
        // Favorites
        .route("/api/favorites", get(favorite_handlers::list_favorites))
        .route(
            "/api/favorites/{name}",
            post(favorite_handlers::toggle_favorite),
        )
        // Alerts
        .route("/api/alerts", get(alert_handlers::stream))
        // Signals proxy
        .route("/api/satnogs", get(proxy_handlers::satnogs))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn load_favorites(config: &Config) -> FavoritesStore {
    let backend = || Box::new(FileStore::new(config.favorites.folder.clone()));
    match FavoritesStore::load(backend()) {
        Ok(store) => store,
        Err(e) => {
            log::warn!("Starting with no favorites: {}", e);
            FavoritesStore::empty(backend())
        }
    }
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let http = build_client(&config.http).map_err(std::io::Error::other)?;

    let station = match &config.station {
        Some(station_config) => {
            let station = station_config.ground_station();
            if let Some(station) = &station {
                log::info!(
                    "Ground station {} at {:.4}, {:.4}",
                    station_config.name.as_deref().unwrap_or("(unnamed)"),
                    station.latitude_deg,
                    station.longitude_deg
                );
            }
            station
        }
        None => None,
    };

    let mut scheduler = Scheduler::new();
    let sources = Sources::register(&mut scheduler, &config, http.clone());

    let (alerts_tx, _) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
    let watcher = spawn_alert_watcher(
        sources.signals.subscribe(),
        AlertNotifier::new(config.alerts.notify_on_first_cycle),
        alerts_tx.clone(),
    );

    let dashboard = Dashboard::new(
        sources,
        load_favorites(&config),
        config.anomaly.band(),
        station,
        alerts_tx,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState {
        dashboard: Arc::new(dashboard),
        proxy: Arc::new(ProxyTarget::new(http, config.sources.signals.url.clone())),
        shutdown: shutdown_rx,
    };

    let app = build_router(state, config.web.static_dir.as_deref());

    log::info!("Starting server on {}", config.web.bind);

    let listener = tokio::net::TcpListener::bind(&config.web.bind).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Long-lived alert streams end on this.
            let _ = shutdown_tx.send(true);
        })
        .await;

    scheduler.stop().await;
    if let Err(e) = watcher.await {
        log::warn!("Alert watcher ended abnormally: {}", e);
    }
    log::info!("Server stopped");
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}
