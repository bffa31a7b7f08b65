//! # Command Handlers
//!
//! This module contains organized command handlers for the bugctl CLI
//! application.
//!
//! ## Structure
//!
//! - `bug` - Bug record commands (create, list, get, update, delete)
//! - `errors` - User-facing error extraction for parse failures
//! - `shared` - Shared utilities and validation functions

pub mod bug;
pub mod errors;
pub mod shared;

pub use bug::handle_bug_command;
