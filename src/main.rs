use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::analytics::recovery::{MeasuredSource, RecoverySignalSource, SimulatedSource};
use crate::api::analytics::{
    AppState, balance_handler, comparison_handler, radar_handler, recovery_handler,
    refresh_handler, training_load_handler, trend_handler,
};
use crate::clients::hevy::HevyClient;
use crate::config::{Config, RecoverySourceConfig};
use crate::services::analytics::AnalyticsService;
use crate::services::data_loader::HistoryCache;

mod analytics;
mod api;
mod clients;
mod config;
mod error;
mod scheduler;
mod services;

fn recovery_source(config: &Config) -> anyhow::Result<Arc<dyn RecoverySignalSource>> {
    match &config.recovery_source {
        RecoverySourceConfig::Simulated { seed } => {
            tracing::info!(seed, "recovery.simulated_source");
            Ok(Arc::new(SimulatedSource::new(*seed)))
        }
        RecoverySourceConfig::Measured { telemetry_path } => {
            tracing::info!(path = %telemetry_path.display(), "recovery.measured_source");
            Ok(Arc::new(MeasuredSource::from_json_file(telemetry_path)?))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let hevy_client = HevyClient::new(&config)?;
    let history = HistoryCache::new(hevy_client, config.history_ttl_minutes);
    let analytics_service = AnalyticsService::new(
        history,
        recovery_source(&config)?,
        config.thresholds.clone(),
    );

    let _scheduler =
        scheduler::start_scheduler(&config.sync_cron, analytics_service.clone()).await?;

    let state = AppState {
        config: config.clone(),
        analytics_service,
    };

    let app = Router::new()
        .route("/", get(|| async { "Hevy training analytics" }))
        .route("/api/analytics/load", get(training_load_handler))
        .route("/api/analytics/trend", get(trend_handler))
        .route("/api/analytics/recovery", get(recovery_handler))
        .route("/api/analytics/radar/{exercise_id}", get(radar_handler))
        .route("/api/analytics/balance", get(balance_handler))
        .route("/api/analytics/comparison", get(comparison_handler))
        .route("/api/history/refresh", post(refresh_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = %config.port, "server.listening");
    axum::serve(listener, app).await?;
    Ok(())
}
