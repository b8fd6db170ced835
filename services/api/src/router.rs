//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the RTC connect API, health checks, and OpenAPI documentation.

use crate::{
    handlers,
    models::{ErrorResponse, HealthResponse},
    state::AppState,
};

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::root, handlers::health, handlers::rtc_connect),
    components(schemas(HealthResponse, ErrorResponse)),
    tags(
        (name = "Interpreter Relay API", description = "WebRTC session brokering for the front-desk interpreter")
    )
)]
pub struct ApiDoc;

/// CORS policy for `/api/*`: only the configured frontend origin may call it.
pub fn cors_layer(state: &AppState) -> CorsLayer {
    const ALLOWED_HEADERS: [HeaderName; 2] = [header::CONTENT_TYPE, header::AUTHORIZATION];

    CorsLayer::new()
        .allow_origin(state.config.frontend_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS)
        .allow_credentials(true)
}

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/rtc-connect", post(handlers::rtc_connect))
        .layer(cors_layer(&app_state))
        .with_state(app_state.clone());

    let service_router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(service_router)
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
}
