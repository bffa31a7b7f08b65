//! # Bugtrack: a small bug tracking service
//!
//! Bugtrack is a CRUD service for bug reports: a validated data model, a
//! RESTful HTTP API over it, and a client-side state controller that keeps a
//! remote-backed list consistent in the face of slow or failing requests.
//!
//! This crate provides:
//!
//! - **Validated Records**: Candidate input is checked field by field
//!   against explicit rules (required fields, length caps, closed enums)
//!   before anything reaches storage, and every failing field is reported
//!   at once
//! - **Pluggable Storage**: A trait-based store abstraction with an
//!   in-memory implementation for tests and a PostgreSQL implementation for
//!   production
//! - **HTTP API**: RESTful endpoints under `/api/bugs` with a uniform
//!   response envelope for both success and failure
//! - **Persistent Logging**: Mutating operations are logged to JSONL files
//!   for auditability and debugging
//! - **Client State**: A reducer-driven tracker that mirrors the server's
//!   list, applies optimistic-free reconciliation, and resolves failure
//!   messages consistently
//!
//! ## Core Concepts
//!
//! ### Bugs
//! A bug is a titled, described defect report with a lifecycle status
//! (`open`, `in-progress`, `resolved`), an optional priority, and an
//! optional reporter name. Identifiers are opaque 12-byte values rendered
//! as 24 lowercase hexadecimal characters.
//!
//! ### Validation
//! Raw wire payloads ([`BugDraft`], [`BugPatch`]) carry unvalidated
//! strings. The validation layer converts them into typed values
//! ([`NewBug`], [`BugChanges`]) or a list of per-field errors. The same
//! rules are duplicated client-side in [`form`] so a form can reject bad
//! input without a round trip.
//!
//! ### Response Envelope
//! Every API response, success or failure, is an [`ApiResponse`]: a
//! `success` flag, the payload under `data`, a `count` for lists, and a
//! structured `error` with a message and mirrored status code on failure.
//!
//! ## Usage Examples
//!
//! ### Validating and Storing a Bug
//!
//! ```rust
//! # use bugtrack::{BugDraft, BugStore, InMemoryBugStore, validate};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryBugStore::new();
//!
//! let draft = BugDraft {
//!     title: Some("Login page returns 500".to_string()),
//!     description: Some("Submitting the login form crashes".to_string()),
//!     status: Some("open".to_string()),
//!     priority: Some("high".to_string()),
//!     reporter: None,
//! };
//!
//! let new_bug = validate::clean_draft(&draft).map_err(|_| "invalid")?;
//! let bug = store.create_bug(&new_bug).await?;
//! assert_eq!(bug.title, "Login page returns 500");
//! # Ok(())
//! # }
//! ```
//!
//! ### Serving the API
//!
//! ```rust,no_run
//! # use bugtrack::{DurableLogger, InMemoryBugStore, create_bug_router, route_not_found};
//! # use std::path::PathBuf;
//! # use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let logger = Arc::new(DurableLogger::new(PathBuf::from("bugtrack.jsonl")));
//! let store = Arc::new(InMemoryBugStore::new());
//! let app = axum::Router::new()
//!     .nest("/api", create_bug_router(logger, store))
//!     .fallback(route_not_found);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
mod api;
mod bug;
mod data_store;
mod errors;
mod log_entry;
mod sql;

/// Command-line interface utilities for program termination and output formatting.
pub mod cli_utils;

/// Command-line interface command handlers for the bugctl application.
pub mod commands;

/// Client-side validation for the bug creation form.
pub mod form;

/// HTTP client utilities for interacting with a bugtrack service.
pub mod http_utils;

/// Client-side state for the bug list.
pub mod tracker;

/// Field validation rules for bug records.
pub mod validate;

pub use api::{
    ApiErrorBody, ApiResponse, ApiState, create_bug_router, route_not_found,
};
pub use bug::{
    Bug, BugChanges, BugDraft, BugId, BugIdParseError, BugPatch, BugPriority, BugStatus, NewBug,
    PRIORITY_VALUES, STATUS_VALUES,
};
pub use data_store::{BugStore, InMemoryBugStore};
pub use errors::DataStoreError;
pub use log_entry::{DurableLogger, LogEntry, LogOperation, OperationStatus};
pub use sql::PostgresBugStore;
