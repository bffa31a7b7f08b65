//! # Command Error Handling
//!
//! This module provides error handling utilities for bugctl CLI commands
//! using the handled crate for consistent error property extraction.

use handled::Handle;

use crate::bug::BugIdParseError;

/// User-friendly error information that can be extracted from various error types
#[derive(Debug, Clone)]
pub struct UserError {
    /// The main error message to display to the user
    pub message: String,
    /// Optional usage hint to help the user correct the error
    pub usage_hint: Option<String>,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Implements Handle<UserError> for itself to allow extraction
impl Handle<UserError> for UserError {
    fn handle(&self) -> Option<UserError> {
        Some(self.clone())
    }
}

impl Handle<UserError> for BugIdParseError {
    fn handle(&self) -> Option<UserError> {
        Some(UserError {
            message: format!("Invalid bug ID format: {}", self),
            usage_hint: Some(
                "Bug IDs are 24 lowercase hexadecimal characters, e.g. 64a1f2c3d4e5f60718293a4b"
                    .to_string(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bug_id_parse_error_extracts_user_error() {
        let user_error = BugIdParseError::InvalidLength.handle().unwrap();
        assert!(user_error.message.starts_with("Invalid bug ID format"));
        assert!(user_error.usage_hint.is_some());
    }
}
