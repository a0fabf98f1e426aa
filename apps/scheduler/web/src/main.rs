use axum_helpers::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(config.database.clone(), None)
        .await
        .map_err(|e| eyre::eyre!("Database connection failed: {}", e))?;

    database::postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let state = AppState { config, db };

    let app = app(&state);

    info!("Starting scheduler with graceful shutdown (30s timeout)");

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing database connections");
            match state.db.close().await {
                Ok(_) => info!("Database connection closed successfully"),
                Err(e) => tracing::error!("Error closing database: {}", e),
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Scheduler shutdown complete");
    Ok(())
}

/// Page routes wrapped with docs and middleware, plus the probes:
/// - /health: liveness check with app name/version
/// - /ready: readiness check with a database ping
fn app(state: &AppState) -> axum::Router {
    create_router::<openapi::ApiDoc>(api::routes(state))
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use database::postgres::PostgresConfig;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use test_utils::TestDatabase;
    use tower::ServiceExt;

    async fn state() -> AppState {
        let db = TestDatabase::new().await;
        AppState {
            config: Config {
                app: app_info!(),
                database: PostgresConfig::new("sqlite::memory:"),
                server: ServerConfig::default(),
                environment: config::Environment::Development,
            },
            db: db.connection(),
        }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_ready_pings_database() {
        let state = state().await;
        let (status, body) = get_json(app(&state), "/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_health_and_dashboard_are_mounted() {
        let state = state().await;

        let (status, body) = get_json(app(&state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "scheduler_web");

        let (status, body) = get_json(app(&state), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_tasks"], 0);
    }

    #[tokio::test]
    async fn test_openapi_lists_task_pages() {
        let state = state().await;
        let (status, body) = get_json(app(&state), "/api-docs/openapi.json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Scheduler");
        assert!(body["paths"]["/trash/"].is_object());
        assert!(body["paths"]["/delete-forever/{id}/"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let state = state().await;
        let (status, body) = get_json(app(&state), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
