use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use super::SSAK_LOOKUP_HEADER;
use super::error::GatewayError;
use super::state::GatewayState;
use crate::records::CollectionStats;
use crate::resolver::{ResolveSource, Resolution};
use crate::store::DocumentStore;

#[derive(Debug, Default, Deserialize)]
pub struct RubricParams {
    pub grade_level: Option<String>,
    pub genre: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExampleParams {
    pub grade_level: Option<String>,
    pub genre: Option<String>,
    pub level: Option<String>,
}

/// Body of both resolve endpoints. `record` is `null` when nothing matched.
#[derive(Debug, Serialize)]
pub struct LookupResponse<T> {
    pub found: bool,
    pub source: ResolveSource,
    pub record: Option<T>,
}

#[instrument(skip(state))]
pub async fn resolve_rubric_handler<S: DocumentStore + 'static>(
    State(state): State<GatewayState<S>>,
    Query(params): Query<RubricParams>,
) -> Result<Response, GatewayError> {
    let grade_level = required("grade_level", params.grade_level)?;
    let genre = required("genre", params.genre)?;
    let domain = required("domain", params.domain)?;

    let resolution = state
        .resolver
        .resolve_rubric_traced(&grade_level, &genre, &domain)
        .await;
    Ok(lookup_response(resolution))
}

#[instrument(skip(state))]
pub async fn resolve_example_handler<S: DocumentStore + 'static>(
    State(state): State<GatewayState<S>>,
    Query(params): Query<ExampleParams>,
) -> Result<Response, GatewayError> {
    let grade_level = required("grade_level", params.grade_level)?;
    let genre = required("genre", params.genre)?;
    let level = required("level", params.level)?;

    let resolution = state
        .resolver
        .resolve_example_traced(&grade_level, &genre, &level)
        .await;
    Ok(lookup_response(resolution))
}

#[instrument(skip(state))]
pub async fn stats_handler<S: DocumentStore + 'static>(
    State(state): State<GatewayState<S>>,
) -> Result<Json<CollectionStats>, GatewayError> {
    match CollectionStats::fetch(state.resolver.store()).await {
        Ok(Some(stats)) => Ok(Json(stats)),
        Ok(None) => Err(GatewayError::NotFound(
            "no upload summary has been written".to_string(),
        )),
        Err(e) => {
            error!(error = %e, "failed to read upload summary");
            Err(GatewayError::Store(e))
        }
    }
}

/// Rejects absent and blank query parameters.
pub(crate) fn required(name: &str, value: Option<String>) -> Result<String, GatewayError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::InvalidRequest(format!(
            "missing query parameter '{name}'"
        ))),
    }
}

pub(crate) fn lookup_response<T: Serialize>(resolution: Resolution<T>) -> Response {
    let source = resolution.source;
    let mut headers = HeaderMap::new();
    headers.insert(SSAK_LOOKUP_HEADER, HeaderValue::from_static(source.as_str()));

    let body = LookupResponse {
        found: resolution.is_found(),
        source,
        record: resolution.record,
    };

    (StatusCode::OK, headers, Json(body)).into_response()
}
