//! Happy Diving - dive label service
//!
//! Turns recorded dive logs into stop schedules and validates stop schedules
//! into exposure figures and printable labels. Django calls these endpoints;
//! nothing is stored.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, response::Json, routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
pub mod dive;
mod error;

use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "divelabel_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        round_depth_m = config.import.segments.round_depth_m,
        min_segment_sec = config.import.segments.min_segment_sec,
        ppo2_limit = config.import.ppo2_limit,
        "Import settings loaded"
    );

    let addr = config.bind_addr.clone();
    let app = build_router(AppState {
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router with middleware.
fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        // Import and label API (called by Django)
        .nest("/api/dive", dive::router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rust-dive-label"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            config: Arc::new(Config::default()),
        }
    }

    #[tokio::test]
    async fn test_service_health() {
        let response = build_router(state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dive_routes_nested() {
        let response = build_router(state())
            .oneshot(Request::builder().uri("/api/dive/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_body_limit_applies() {
        let config = Config {
            max_upload_bytes: 16,
            ..Config::default()
        };
        let app = build_router(AppState {
            config: Arc::new(config),
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/dive/label")
                    .header("content-type", "application/json")
                    .body(Body::from(vec![b' '; 1024]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
