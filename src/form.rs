//! Client-side validation for the bug creation form.
//!
//! The form validates its fields before submitting so the user gets
//! immediate feedback without a round trip. The rules here are a deliberate
//! duplicate of [`crate::validate`]: the form holds raw strings (an empty
//! string plays the role of a missing field), while the server validates
//! optional wire payloads. The lockstep tests under `tests/` hold the two
//! implementations to the same verdicts.

use crate::bug::{BugDraft, PRIORITY_VALUES, STATUS_VALUES};
use crate::validate::{DESCRIPTION_MAX, REPORTER_MAX, TITLE_MAX};

/// Raw form input, one string per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugFormData {
    /// Title input.
    pub title: String,
    /// Description input.
    pub description: String,
    /// Status selection.
    pub status: String,
    /// Priority selection.
    pub priority: String,
    /// Reporter input.
    pub reporter: String,
}

impl Default for BugFormData {
    fn default() -> Self {
        BugFormData {
            title: String::new(),
            description: String::new(),
            status: "open".to_string(),
            priority: "medium".to_string(),
            reporter: String::new(),
        }
    }
}

/// Per-field error messages, `None` when the field is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    /// Error for the title field.
    pub title: Option<String>,
    /// Error for the description field.
    pub description: Option<String>,
    /// Error for the status field.
    pub status: Option<String>,
    /// Error for the priority field.
    pub priority: Option<String>,
    /// Error for the reporter field.
    pub reporter: Option<String>,
}

impl FormErrors {
    /// True when every field is acceptable.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.reporter.is_none()
    }
}

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

impl BugFormData {
    /// Checks every field, collecting a message per failing field.
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        let title_len = trimmed_len(&self.title);
        if title_len == 0 {
            errors.title = Some("Title is required".to_string());
        } else if title_len > TITLE_MAX {
            errors.title = Some(format!("Title cannot exceed {} characters", TITLE_MAX));
        }
        let description_len = trimmed_len(&self.description);
        if description_len == 0 {
            errors.description = Some("Description is required".to_string());
        } else if description_len > DESCRIPTION_MAX {
            errors.description = Some(format!(
                "Description cannot exceed {} characters",
                DESCRIPTION_MAX
            ));
        }
        if !STATUS_VALUES.contains(&self.status.as_str()) {
            errors.status = Some(format!(
                "Status must be one of: {}",
                STATUS_VALUES.join(", ")
            ));
        }
        if !self.priority.is_empty() && !PRIORITY_VALUES.contains(&self.priority.as_str()) {
            errors.priority = Some(format!(
                "Priority must be one of: {}",
                PRIORITY_VALUES.join(", ")
            ));
        }
        if trimmed_len(&self.reporter) > REPORTER_MAX {
            errors.reporter = Some(format!(
                "Reporter name cannot exceed {} characters",
                REPORTER_MAX
            ));
        }
        errors
    }

    /// Converts the form into a wire payload. Empty strings become absent
    /// fields so the server applies its own defaults and treats a blank
    /// reporter as anonymous.
    pub fn to_draft(&self) -> BugDraft {
        fn present(value: &str) -> Option<String> {
            if value.trim().is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        BugDraft {
            title: present(&self.title),
            description: present(&self.description),
            status: present(&self.status),
            priority: present(&self.priority),
            reporter: present(&self.reporter),
        }
    }
}
