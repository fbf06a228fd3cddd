//! HTTP layer - five REST endpoints over the storage contract.
//!
//! Routes:
//! - `GET    /thing`        list (query: `page`, `limit`)
//! - `POST   /thing/new`    create
//! - `GET    /thing/:uuid`  fetch
//! - `PUT    /thing/:uuid`  update value
//! - `DELETE /thing/:uuid`  delete (unconditional)
//!
//! Not-found maps to 404, validation failures to 400, everything else to 500;
//! all error bodies are `{"error": "<message>"}`.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::constants::{
    HTTP_REQUEST_TIMEOUT_SECS, LIST_LIMIT_COUNT_MAX, LIST_LIMIT_DEFAULT, LIST_PAGE_DEFAULT,
    THING_NAME_BYTES_MAX, THING_VALUE_BYTES_MAX,
};
use crate::storage::{StorageBackend, StorageError, Thing};

// =============================================================================
// State & Router
// =============================================================================

#[derive(Clone)]
struct ApiState {
    store: Arc<dyn StorageBackend>,
}

/// Build the application router over the given store.
pub fn router(store: Arc<dyn StorageBackend>) -> Router {
    Router::new()
        .route("/thing", get(list_things))
        .route("/thing/new", post(create_thing))
        .route(
            "/thing/:uuid",
            get(get_thing).put(update_thing).delete(delete_thing),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(
            HTTP_REQUEST_TIMEOUT_SECS,
        )))
        .with_state(ApiState { store })
}

/// Serve the API on an already-bound listener until `shutdown` resolves.
///
/// The caller owns the lifecycle: it binds the listener and decides when to
/// stop. In-flight requests are drained before this returns.
pub async fn serve(
    listener: tokio::net::TcpListener,
    store: Arc<dyn StorageBackend>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}

// =============================================================================
// Error Mapping
// =============================================================================

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message.
    pub error: String,
}

#[derive(Debug, Error)]
enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn validate_field(field: &str, value: &str, bytes_max: usize) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    if value.len() > bytes_max {
        return Err(ApiError::BadRequest(format!(
            "{field} exceeds {bytes_max} bytes"
        )));
    }
    Ok(())
}

// =============================================================================
// DTOs
// =============================================================================

/// A thing as encoded on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThingResponse {
    /// Unique identifier.
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Payload.
    pub value: String,
    /// Last update timestamp (RFC3339).
    pub updated: DateTime<Utc>,
    /// Creation timestamp (RFC3339).
    pub created: DateTime<Utc>,
}

impl From<Thing> for ThingResponse {
    fn from(thing: Thing) -> Self {
        Self {
            uuid: thing.uuid,
            name: thing.name,
            value: thing.value,
            updated: thing.updated,
            created: thing.created,
        }
    }
}

/// Body for `POST /thing/new`.
#[derive(Debug, Deserialize)]
pub struct CreateThingRequest {
    /// Required, immutable after creation.
    pub name: String,
    /// Required.
    pub value: String,
}

/// Body for `PUT /thing/:uuid`.
#[derive(Debug, Deserialize)]
pub struct UpdateThingRequest {
    /// Required replacement value.
    pub value: String,
}

/// Response for `GET /thing`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ThingsResponse {
    /// Total count of all things, irrespective of the page window.
    pub total: usize,
    /// The page that was served.
    pub page: usize,
    /// The page size that was served.
    pub limit: usize,
    /// The page of things.
    pub things: Vec<ThingResponse>,
}

/// Query parameters for `GET /thing`.
///
/// Parsed leniently: absent, non-numeric, or out-of-range values fall back
/// to the defaults rather than erroring.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
}

impl ListParams {
    fn page(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(LIST_PAGE_DEFAULT)
    }

    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|l| *l >= 1 && *l <= LIST_LIMIT_COUNT_MAX)
            .unwrap_or(LIST_LIMIT_DEFAULT)
    }

    fn offset(&self) -> usize {
        // A huge but parseable page must not overflow; the result also has
        // to fit the i64 the relational backend binds.
        (self.page() - 1)
            .saturating_mul(self.limit())
            .min(i64::MAX as usize)
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn get_thing(
    State(state): State<ApiState>,
    Path(uuid): Path<String>,
) -> Result<Json<ThingResponse>, ApiError> {
    let thing = state.store.get_thing(&uuid).await?;
    Ok(Json(thing.into()))
}

async fn create_thing(
    State(state): State<ApiState>,
    Json(req): Json<CreateThingRequest>,
) -> Result<Json<ThingResponse>, ApiError> {
    validate_field("name", &req.name, THING_NAME_BYTES_MAX)?;
    validate_field("value", &req.value, THING_VALUE_BYTES_MAX)?;

    let thing = state.store.create_thing(&req.name, &req.value).await?;
    Ok(Json(thing.into()))
}

async fn update_thing(
    State(state): State<ApiState>,
    Path(uuid): Path<String>,
    Json(req): Json<UpdateThingRequest>,
) -> Result<Json<ThingResponse>, ApiError> {
    validate_field("value", &req.value, THING_VALUE_BYTES_MAX)?;

    let thing = state.store.update_thing(&uuid, &req.value).await?;
    Ok(Json(thing.into()))
}

async fn delete_thing(
    State(state): State<ApiState>,
    Path(uuid): Path<String>,
) -> Result<(), ApiError> {
    state.store.delete_thing(&uuid).await?;
    Ok(())
}

async fn list_things(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ThingsResponse>, ApiError> {
    let page = params.page();
    let limit = params.limit();

    let (things, total) = state.store.list_things(params.offset(), limit).await?;

    Ok(Json(ThingsResponse {
        total,
        page,
        limit,
        things: things.into_iter().map(Into::into).collect(),
    }))
}
