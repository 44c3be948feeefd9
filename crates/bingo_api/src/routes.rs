//! Admin routes over the resolution service.
//!
//!   GET /api/status            -> 200 when authenticated, else 401
//!   GET /api/resolutions       -> all rows by position
//!   GET /api/resolutions/{id}  -> one row
//!   PUT /api/resolutions/{id}  -> partial update (authenticated)
//!
//! # Invariants
//! - Handlers never panic; every failure is an `ApiError`.
//! - Writes require an authenticated request; auth is checked before the
//!   id or payload are looked at.

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::state::ApiState;
use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::HeaderMap;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use bingo_core::{RepoError, Resolution, ResolutionId, ResolutionPatch};
use log::info;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(status).fallback(method_not_allowed))
        .route("/api/resolutions", get(list).fallback(method_not_allowed))
        .route(
            "/api/resolutions/{id}",
            get(get_one).put(update).fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

/// Serves the router until the listener fails.
pub async fn serve(listener: TcpListener, state: ApiState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("event=api_serve module=api status=listening addr={addr}");
    axum::serve(listener, router(state)).await
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();
    let response = next.run(request).await;
    info!(
        "event=api_request module=api method={method} path={path} status={} duration_ms={}",
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

async fn status(State(state): State<ApiState>, headers: HeaderMap) -> ApiResult<()> {
    if !state.is_authenticated(&headers) {
        return Err(ApiError::Unauthenticated);
    }
    Ok(Json(Envelope::message("Admin access granted")))
}

async fn list(State(state): State<ApiState>) -> ApiResult<Vec<Resolution>> {
    let resolutions = state
        .with_service(|service| service.list())
        .map_err(|err| ApiError::internal("list", &err, "Error fetching resolutions"))?;
    Ok(Json(Envelope::data("OK", resolutions)))
}

async fn get_one(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Resolution> {
    let id = parse_id(&raw_id)?;
    match state.with_service(|service| service.get(id)) {
        Ok(Some(resolution)) => Ok(Json(Envelope::data("OK", resolution))),
        Ok(None) => Err(ApiError::ResolutionNotFound),
        Err(err) => Err(ApiError::internal("get", &err, "Error fetching resolution")),
    }
}

async fn update(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> ApiResult<Resolution> {
    if !state.is_authenticated(&headers) {
        return Err(ApiError::Unauthenticated);
    }
    let id = parse_id(&raw_id)?;
    let patch = parse_patch(&body)?;

    match state.with_service(|service| service.update(id, &patch)) {
        Ok(resolution) => Ok(Json(Envelope::data("Updated successfully", resolution))),
        Err(RepoError::NotFound(_)) => Err(ApiError::ResolutionNotFound),
        Err(RepoError::Validation(err)) => Err(ApiError::Rejected(err.to_string())),
        Err(err) => Err(ApiError::internal("update", &err, "Error updating resolution")),
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Ids that do not parse cannot name a row.
fn parse_id(raw: &str) -> Result<ResolutionId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::ResolutionNotFound)
}

/// An empty body is an empty patch.
fn parse_patch(body: &[u8]) -> Result<ResolutionPatch, ApiError> {
    let raw = std::str::from_utf8(body).map_err(|_| ApiError::MalformedPayload)?;
    match raw.trim() {
        "" => Ok(ResolutionPatch::default()),
        raw => serde_json::from_str(raw).map_err(|_| ApiError::MalformedPayload),
    }
}
