//! Field validation rules for bug records.
//!
//! These are the authoritative server-side rules. The client form in
//! [`crate::form`] carries an independent implementation of the same
//! constraints for optimistic pre-submission checks; the two are kept in
//! lockstep by a shared fixture table in the test suite, not by shared code.
//!
//! Every rule is a pure function returning a [`Validity`]: a flag plus a
//! human-readable message when invalid. Aggregate checks collect failures
//! into ordered [`FieldError`] lists that serialize straight into the API
//! error envelope.

use serde::{Deserialize, Serialize};

use crate::bug::{
    BugChanges, BugDraft, BugPatch, BugStatus, NewBug, PRIORITY_VALUES, STATUS_VALUES,
};

/// Maximum title length in characters, after trimming.
pub const TITLE_MAX: usize = 200;
/// Maximum description length in characters, after trimming.
pub const DESCRIPTION_MAX: usize = 2000;
/// Maximum reporter name length in characters, after trimming.
pub const REPORTER_MAX: usize = 100;

/// The outcome of a single field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    /// Whether the value satisfied the rule.
    pub is_valid: bool,
    /// Human-readable reason when invalid; `None` when valid.
    pub error: Option<String>,
}

impl Validity {
    /// A passing verdict.
    pub fn valid() -> Self {
        Validity {
            is_valid: true,
            error: None,
        }
    }

    /// A failing verdict with a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Validity {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// A single field failure, as it appears in the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the offending field.
    pub field: String,
    /// Why the field was rejected.
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: String) -> Self {
        FieldError {
            field: field.to_string(),
            message,
        }
    }
}

/// Character count after trimming. Lengths are measured in Unicode scalar
/// values so multi-byte text is not penalized.
fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Validates a bug title: required, non-empty after trimming, at most
/// [`TITLE_MAX`] characters.
pub fn validate_title(value: Option<&str>) -> Validity {
    let Some(value) = value else {
        return Validity::invalid("Title is required");
    };
    let len = trimmed_len(value);
    if len == 0 {
        Validity::invalid("Title cannot be empty")
    } else if len > TITLE_MAX {
        Validity::invalid(format!("Title cannot exceed {} characters", TITLE_MAX))
    } else {
        Validity::valid()
    }
}

/// Validates a bug description: required, non-empty after trimming, at most
/// [`DESCRIPTION_MAX`] characters.
pub fn validate_description(value: Option<&str>) -> Validity {
    let Some(value) = value else {
        return Validity::invalid("Description is required");
    };
    let len = trimmed_len(value);
    if len == 0 {
        Validity::invalid("Description cannot be empty")
    } else if len > DESCRIPTION_MAX {
        Validity::invalid(format!(
            "Description cannot exceed {} characters",
            DESCRIPTION_MAX
        ))
    } else {
        Validity::valid()
    }
}

/// Validates a status spelling: required, and case-sensitively one of
/// `open`, `in-progress`, `resolved`.
pub fn validate_status(value: Option<&str>) -> Validity {
    let Some(value) = value else {
        return Validity::invalid("Status is required");
    };
    if STATUS_VALUES.contains(&value) {
        Validity::valid()
    } else {
        Validity::invalid(format!(
            "Status must be one of: {}",
            STATUS_VALUES.join(", ")
        ))
    }
}

/// Validates a priority spelling: absence is valid; a present value must be
/// case-sensitively one of `low`, `medium`, `high`, `critical`.
pub fn validate_priority(value: Option<&str>) -> Validity {
    let Some(value) = value else {
        return Validity::valid();
    };
    if PRIORITY_VALUES.contains(&value) {
        Validity::valid()
    } else {
        Validity::invalid(format!(
            "Priority must be one of: {}",
            PRIORITY_VALUES.join(", ")
        ))
    }
}

/// Validates a reporter name: absence is valid; a present value must trim to
/// at most [`REPORTER_MAX`] characters.
pub fn validate_reporter(value: Option<&str>) -> Validity {
    let Some(value) = value else {
        return Validity::valid();
    };
    if trimmed_len(value) > REPORTER_MAX {
        Validity::invalid(format!(
            "Reporter name cannot exceed {} characters",
            REPORTER_MAX
        ))
    } else {
        Validity::valid()
    }
}

fn collect(errors: &mut Vec<FieldError>, field: &str, validity: Validity) {
    if let Some(message) = validity.error {
        errors.push(FieldError::new(field, message));
    }
}

/// Validates a full candidate record.
///
/// Title, description, and status are checked unconditionally; priority only
/// when present; reporter last. Failures are aggregated in check order, and
/// the draft is valid iff the returned list is empty.
pub fn validate_bug(draft: &BugDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    collect(&mut errors, "title", validate_title(draft.title.as_deref()));
    collect(
        &mut errors,
        "description",
        validate_description(draft.description.as_deref()),
    );
    collect(&mut errors, "status", validate_status(draft.status.as_deref()));
    if draft.priority.is_some() {
        collect(
            &mut errors,
            "priority",
            validate_priority(draft.priority.as_deref()),
        );
    }
    collect(
        &mut errors,
        "reporter",
        validate_reporter(draft.reporter.as_deref()),
    );
    errors
}

/// Validates only the fields a partial update supplies.
///
/// Unsupplied fields are not validated; the stored values they would shadow
/// were validated when written and remain untouched.
pub fn validate_patch(patch: &BugPatch) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if patch.title.is_some() {
        collect(&mut errors, "title", validate_title(patch.title.as_deref()));
    }
    if patch.description.is_some() {
        collect(
            &mut errors,
            "description",
            validate_description(patch.description.as_deref()),
        );
    }
    if patch.status.is_some() {
        collect(&mut errors, "status", validate_status(patch.status.as_deref()));
    }
    if patch.priority.is_some() {
        collect(
            &mut errors,
            "priority",
            validate_priority(patch.priority.as_deref()),
        );
    }
    if patch.reporter.is_some() {
        collect(
            &mut errors,
            "reporter",
            validate_reporter(patch.reporter.as_deref()),
        );
    }
    errors
}

/// Trims a reporter value, mapping whitespace-only input to absence so blank
/// reporters never round-trip out of the store.
fn clean_reporter(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Validates and normalizes a draft into a store-ready [`NewBug`].
///
/// The create boundary applies the status default before calling this, so a
/// missing status here is a validation failure, not a default.
pub fn clean_draft(draft: &BugDraft) -> Result<NewBug, Vec<FieldError>> {
    let errors = validate_bug(draft);
    if !errors.is_empty() {
        return Err(errors);
    }
    // The checks above guarantee these parses succeed.
    let status = draft
        .status
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(BugStatus::Open);
    let priority = draft.priority.as_deref().and_then(|p| p.parse().ok());
    Ok(NewBug {
        title: draft.title.as_deref().unwrap_or_default().trim().to_string(),
        description: draft
            .description
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        status,
        priority,
        reporter: clean_reporter(draft.reporter.as_deref()),
    })
}

/// Validates and normalizes a partial update into store-ready [`BugChanges`].
pub fn clean_patch(patch: &BugPatch) -> Result<BugChanges, Vec<FieldError>> {
    let errors = validate_patch(patch);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(BugChanges {
        title: patch.title.as_deref().map(|t| t.trim().to_string()),
        description: patch.description.as_deref().map(|d| d.trim().to_string()),
        status: patch.status.as_deref().and_then(|s| s.parse().ok()),
        priority: patch.priority.as_deref().and_then(|p| p.parse().ok()),
        reporter: clean_reporter(patch.reporter.as_deref()),
    })
}
