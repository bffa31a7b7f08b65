//! HTTP API for bug records.
//!
//! Five operations over `/bugs`, plus a health probe. Every response is
//! wrapped in the uniform [`ApiResponse`] envelope; no failure escapes a
//! handler un-enveloped. Identifier parsing happens here, before the store
//! is consulted, so malformed identifiers are a 400 and never an internal
//! error. Validation runs against the raw wire payload and rejects with the
//! aggregated field errors.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::log_entry::{DurableLogger, LogEntry, LogOperation, OperationStatus};
use crate::validate::{FieldError, clean_draft, clean_patch};
use crate::{Bug, BugDraft, BugId, BugPatch, BugStore};

////////////////////////////////////////////// Envelope ///////////////////////////////////////////////

/// The uniform success/error wrapper carried by every API response.
///
/// - `data` holds the record (or records) on success.
/// - `count` appears only on successful list responses and equals the
///   returned list's length.
/// - `error` appears only on failures and mirrors the transport status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// List length, on successful list responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Failure details, on error responses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

/// The nested error object inside failure envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable failure summary.
    pub message: String,
    /// Numeric status mirroring the transport status code.
    pub status: u16,
    /// Per-field details, on validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    /// A successful single-record envelope.
    pub fn record(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            count: None,
            error: None,
        }
    }

    /// A failure envelope.
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            count: None,
            error: Some(ApiErrorBody {
                message: message.into(),
                status: status.as_u16(),
                errors: None,
            }),
        }
    }

    /// A validation-failure envelope carrying the aggregated field errors.
    pub fn validation_failure(errors: Vec<FieldError>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            count: None,
            error: Some(ApiErrorBody {
                message: "Validation failed".to_string(),
                status: StatusCode::BAD_REQUEST.as_u16(),
                errors: Some(errors),
            }),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// A successful list envelope; `count` equals the list's length.
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        ApiResponse {
            success: true,
            data: Some(data),
            count: Some(count),
            error: None,
        }
    }
}

////////////////////////////////////////////// Handlers ///////////////////////////////////////////////

/// Shared state for the bug routes: the record store and the operation log.
#[derive(Clone)]
pub struct ApiState {
    store: Arc<dyn BugStore>,
    logger: Arc<DurableLogger>,
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn not_found<T>() -> Reply<T> {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(StatusCode::NOT_FOUND, "Bug not found")),
    )
}

fn malformed_id<T>() -> Reply<T> {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure(
            StatusCode::BAD_REQUEST,
            "Invalid bug ID format",
        )),
    )
}

fn malformed_body<T>() -> Reply<T> {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::failure(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
        )),
    )
}

fn internal_error<T>() -> Reply<T> {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )),
    )
}

/// `GET /bugs`: all records, newest-created first. An empty store is an
/// empty list, not an error.
async fn list_bugs(State(state): State<ApiState>) -> Reply<Vec<Bug>> {
    match state.store.list_bugs().await {
        Ok(bugs) => (StatusCode::OK, Json(ApiResponse::list(bugs))),
        Err(e) => {
            eprintln!("Error listing bugs: {}", e);
            internal_error()
        }
    }
}

/// `GET /bugs/:id`: a single record by identifier.
async fn get_bug(State(state): State<ApiState>, Path(id): Path<String>) -> Reply<Bug> {
    let Ok(id) = id.parse::<BugId>() else {
        return malformed_id();
    };
    match state.store.get_bug(&id).await {
        Ok(Some(bug)) => (StatusCode::OK, Json(ApiResponse::record(bug))),
        Ok(None) => not_found(),
        Err(e) => {
            eprintln!("Error fetching bug {}: {}", id, e);
            internal_error()
        }
    }
}

/// `POST /bugs`: create a record from candidate fields. A missing status
/// defaults to `open` before validation, so the default satisfies the status
/// requirement. A body that cannot be read as JSON at all is a 400 envelope,
/// never a bare transport rejection.
async fn create_bug(
    State(state): State<ApiState>,
    draft: Result<Json<BugDraft>, JsonRejection>,
) -> Reply<Bug> {
    let Ok(Json(mut draft)) = draft else {
        return malformed_body();
    };
    if draft.status.is_none() {
        draft.status = Some("open".to_string());
    }
    let new_bug = match clean_draft(&draft) {
        Ok(new_bug) => new_bug,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::validation_failure(errors)),
            );
        }
    };
    match state.store.create_bug(&new_bug).await {
        Ok(bug) => {
            state.logger.log_or_error(&LogEntry::new(
                LogOperation::BugCreate { bug: bug.clone() },
                OperationStatus::Success,
            ));
            (StatusCode::CREATED, Json(ApiResponse::record(bug)))
        }
        Err(e) => {
            eprintln!("Error creating bug: {}", e);
            internal_error()
        }
    }
}

fn supplied_fields(patch: &BugPatch) -> Vec<String> {
    let mut fields = Vec::new();
    if patch.title.is_some() {
        fields.push("title".to_string());
    }
    if patch.description.is_some() {
        fields.push("description".to_string());
    }
    if patch.status.is_some() {
        fields.push("status".to_string());
    }
    if patch.priority.is_some() {
        fields.push("priority".to_string());
    }
    if patch.reporter.is_some() {
        fields.push("reporter".to_string());
    }
    fields
}

/// `PUT /bugs/:id`: partial update. Only supplied fields are validated and
/// written; everything else retains its stored value.
async fn update_bug(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    patch: Result<Json<BugPatch>, JsonRejection>,
) -> Reply<Bug> {
    let Ok(id) = id.parse::<BugId>() else {
        return malformed_id();
    };
    let Ok(Json(patch)) = patch else {
        return malformed_body();
    };
    let changes = match clean_patch(&patch) {
        Ok(changes) => changes,
        Err(errors) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::validation_failure(errors)),
            );
        }
    };
    let fields = supplied_fields(&patch);
    match state.store.update_bug(&id, &changes).await {
        Ok(Some(bug)) => {
            state.logger.log_or_error(&LogEntry::new(
                LogOperation::BugUpdate {
                    bug_id: id.to_string(),
                    fields,
                },
                OperationStatus::Success,
            ));
            (StatusCode::OK, Json(ApiResponse::record(bug)))
        }
        Ok(None) => {
            state.logger.log_or_error(&LogEntry::new(
                LogOperation::BugUpdate {
                    bug_id: id.to_string(),
                    fields,
                },
                OperationStatus::Failure,
            ));
            not_found()
        }
        Err(e) => {
            eprintln!("Error updating bug {}: {}", id, e);
            internal_error()
        }
    }
}

/// `DELETE /bugs/:id`: hard delete. Success carries an empty object payload.
async fn delete_bug(State(state): State<ApiState>, Path(id): Path<String>) -> Reply<Value> {
    let Ok(id) = id.parse::<BugId>() else {
        return malformed_id();
    };
    match state.store.delete_bug(&id).await {
        Ok(true) => {
            state.logger.log_or_error(&LogEntry::new(
                LogOperation::BugDelete {
                    bug_id: id.to_string(),
                },
                OperationStatus::Success,
            ));
            (StatusCode::OK, Json(ApiResponse::record(json!({}))))
        }
        Ok(false) => {
            state.logger.log_or_error(&LogEntry::new(
                LogOperation::BugDelete {
                    bug_id: id.to_string(),
                },
                OperationStatus::Failure,
            ));
            not_found()
        }
        Err(e) => {
            eprintln!("Error deleting bug {}: {}", id, e);
            internal_error()
        }
    }
}

/// `GET /health`: liveness probe.
async fn health() -> Json<Value> {
    Json(json!({"status": "OK", "message": "Server is running"}))
}

/// Fallback for unmatched routes: a generic not-found envelope.
pub async fn route_not_found() -> Reply<Value> {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(StatusCode::NOT_FOUND, "Route not found")),
    )
}

////////////////////////////////////////////// Router /////////////////////////////////////////////////

/// Creates the bug API router. The daemon nests this under `/api`.
pub fn create_bug_router(logger: Arc<DurableLogger>, store: Arc<dyn BugStore>) -> Router {
    let state = ApiState { store, logger };
    Router::new()
        .route("/bugs", get(list_bugs).post(create_bug))
        .route(
            "/bugs/:id",
            get(get_bug).put(update_bug).delete(delete_bug),
        )
        .route("/health", get(health))
        .with_state(state)
}
