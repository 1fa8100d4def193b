//! HTTP gateway (Axum) for knowledge lookups.
//!
//! The grading function calls these endpoints instead of talking to the store directly, so
//! the per-process caches are shared by every request the server handles.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{
    ExampleParams, LookupResponse, RubricParams, resolve_example_handler,
    resolve_rubric_handler, stats_handler,
};
pub use state::GatewayState;

use crate::store::DocumentStore;

/// Response header carrying the resolution source (`cache`, `primary`, ...).
pub const SSAK_LOOKUP_HEADER: &str = "x-ssak-lookup";

pub fn create_router<S: DocumentStore + 'static>(state: GatewayState<S>) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/rubrics/resolve", get(resolve_rubric_handler::<S>))
        .route("/v1/examples/resolve", get(resolve_example_handler::<S>))
        .route("/v1/stats", get(stats_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(SSAK_LOOKUP_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
