//! Route definitions and middleware assembly

use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use infrastructure::AppConfig;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as CorsAny, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::error;

use crate::{
    error::ApiError,
    handlers,
    middleware::{
        RateLimiterState, RequestIdLayer, SecurityPipelineLayer, ValidationLayer, ValidationSpec,
    },
    schema::catalog,
    state::AppState,
};

/// Create the route tree with per-route validation
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // Account API
        .route(
            "/api/auth/register",
            post(handlers::auth::register).layer(ValidationLayer::body(catalog::user::create())),
        )
        .route(
            "/api/users",
            get(handlers::users::list_users)
                .layer(ValidationLayer::query(catalog::common::pagination())),
        )
        // Sentiment API
        .route(
            "/api/news/sentiment",
            post(handlers::news::analyze_sentiment)
                .layer(ValidationLayer::body(catalog::news::analyze_sentiment())),
        )
        .route(
            "/api/news/batch",
            post(handlers::news::batch_analyze)
                .layer(ValidationLayer::body(catalog::news::batch_analyze())),
        )
        // Forecast API
        .route(
            "/api/predictions/{symbol}",
            get(handlers::predictions::forecast).layer(ValidationLayer::new(
                ValidationSpec::new()
                    .params(catalog::prediction::params())
                    .query(catalog::prediction::query()),
            )),
        )
        // Payments API
        .route(
            "/api/payments/upi",
            post(handlers::payments::initiate_upi)
                .layer(ValidationLayer::body(catalog::payment::initiate_upi())),
        )
        // Backups API: one combined layer; body validation skips GET
        .route(
            "/api/backups",
            post(handlers::backups::create_backup)
                .get(handlers::backups::list_backups)
                .layer(ValidationLayer::new(
                    ValidationSpec::new()
                        .body(catalog::backup::create())
                        .query(catalog::common::pagination()),
                )),
        )
        // Logs and exports
        .route(
            "/api/logs",
            get(handlers::logs::query_logs).layer(ValidationLayer::query(catalog::log::query())),
        )
        .route(
            "/api/exports",
            get(handlers::exports::list_exports)
                .layer(ValidationLayer::query(catalog::export::query())),
        )
        // Attach state
        .with_state(state)
}

/// Assemble the full application: routes, security pipeline, correlation,
/// CORS, body limits and panic containment
///
/// Returns the router plus the rate limiter state so the caller can spawn
/// the cleanup sweep.
pub fn create_app(state: AppState, config: &AppConfig) -> (Router, std::sync::Arc<RateLimiterState>) {
    let pipeline = SecurityPipelineLayer::new(&config.security, config.environment);
    let rate_limiter = pipeline.rate_limiter();

    let mut router = create_router(state)
        .layer(pipeline)
        .layer(RequestIdLayer::new());

    if config.server.cors_enabled {
        router = router.layer(cors_layer(&config.server.allowed_origins));
    }

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(
            config.server.max_body_size_json_bytes,
        ))
        .layer(CatchPanicLayer::custom(handle_panic));

    (router, rate_limiter)
}

/// Build the CORS layer from the configured origins
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(CorsAny)
            .allow_methods(CorsAny)
            .allow_headers(CorsAny)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(CorsAny)
    }
}

/// Convert a caught panic into the generic 500 envelope
///
/// The pipeline promises that no internal failure escapes as an unshaped
/// error; this is the outermost net.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "opaque panic payload".to_string());
    error!(detail = %detail, "Handler panicked");
    ApiError::Internal(detail).into_response()
}
