//! Client-side state for the bug list.
//!
//! The controller holds a transient, possibly-stale copy of the server's
//! list and reconciles it against API responses. State transitions are pure:
//! [`reduce`] maps a ([`TrackerState`], [`TrackerEvent`]) pair to the next
//! state, so the reconciliation logic is testable without a network or a
//! renderer. [`BugTracker`] drives the reducer with real API calls.
//!
//! Refreshes are tagged with a monotonically increasing sequence number and
//! the reducer discards responses that are not the latest issued, so an
//! in-flight refresh resolving late can never clobber newer data.

use crate::http_utils::{ApiClientError, BugApiClient, resolve_message};
use crate::{Bug, BugDraft, BugId, BugPatch};

/// Fallback message when a list fetch fails without a usable error.
pub const FETCH_BUGS_FALLBACK: &str = "Failed to fetch bugs";
/// Fallback message when a create fails without a usable error.
pub const CREATE_BUG_FALLBACK: &str = "Failed to create bug";
/// Fallback message when an update fails without a usable error.
pub const UPDATE_BUG_FALLBACK: &str = "Failed to update bug";
/// Fallback message when a delete fails without a usable error.
pub const DELETE_BUG_FALLBACK: &str = "Failed to delete bug";

/// The tracker's view of the world.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    /// Last-reconciled list of bugs, newest first.
    pub bugs: Vec<Bug>,
    /// Whether a refresh is in flight.
    pub loading: bool,
    /// The most recent failure message, if any.
    pub error: Option<String>,
    /// Whether the creation form is visible.
    pub show_form: bool,
    /// Sequence number of the latest issued refresh.
    pub refresh_seq: u64,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerState {
    /// The initial state: empty list, loading (a refresh is expected
    /// immediately), no error, form hidden.
    pub fn new() -> Self {
        TrackerState {
            bugs: Vec::new(),
            loading: true,
            error: None,
            show_form: false,
            refresh_seq: 0,
        }
    }
}

/// Everything that can happen to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// A refresh was issued with the given sequence number.
    RefreshStarted {
        /// Sequence number of this refresh.
        seq: u64,
    },
    /// A refresh came back with the full list.
    RefreshSucceeded {
        /// Sequence number of the refresh that produced this response.
        seq: u64,
        /// The fetched list, newest first.
        bugs: Vec<Bug>,
    },
    /// A refresh failed.
    RefreshFailed {
        /// Sequence number of the refresh that failed.
        seq: u64,
        /// Resolved failure message.
        message: String,
    },
    /// A create was issued.
    CreateStarted,
    /// The server stored a new record.
    CreateSucceeded {
        /// The stored record, as returned by the server.
        bug: Bug,
    },
    /// A create failed.
    CreateFailed {
        /// Resolved failure message.
        message: String,
    },
    /// An update was issued.
    UpdateStarted,
    /// The server applied a partial update.
    UpdateSucceeded {
        /// The full updated record.
        bug: Bug,
    },
    /// An update failed.
    UpdateFailed {
        /// Resolved failure message.
        message: String,
    },
    /// A delete was issued.
    DeleteStarted,
    /// The server deleted a record.
    DeleteSucceeded {
        /// Identifier of the deleted record.
        id: BugId,
    },
    /// A delete failed; the held list is left unchanged.
    DeleteFailed {
        /// Resolved failure message.
        message: String,
    },
    /// The creation form was shown or hidden.
    FormToggled {
        /// New visibility.
        visible: bool,
    },
}

/// Applies one event to the state, producing the next state.
pub fn reduce(mut state: TrackerState, event: TrackerEvent) -> TrackerState {
    match event {
        TrackerEvent::RefreshStarted { seq } => {
            if seq > state.refresh_seq {
                state.refresh_seq = seq;
            }
            state.loading = true;
            state.error = None;
        }
        TrackerEvent::RefreshSucceeded { seq, bugs } => {
            // A response from a superseded refresh is stale; drop it.
            if seq == state.refresh_seq {
                state.bugs = bugs;
                state.loading = false;
            }
        }
        TrackerEvent::RefreshFailed { seq, message } => {
            if seq == state.refresh_seq {
                state.error = Some(message);
                state.loading = false;
            }
        }
        TrackerEvent::CreateStarted
        | TrackerEvent::UpdateStarted
        | TrackerEvent::DeleteStarted => {
            state.error = None;
        }
        TrackerEvent::CreateSucceeded { bug } => {
            state.bugs.insert(0, bug);
            state.show_form = false;
        }
        TrackerEvent::UpdateSucceeded { bug } => {
            if let Some(held) = state.bugs.iter_mut().find(|b| b.id == bug.id) {
                *held = bug;
            }
        }
        TrackerEvent::DeleteSucceeded { id } => {
            state.bugs.retain(|b| b.id != id);
        }
        TrackerEvent::CreateFailed { message }
        | TrackerEvent::UpdateFailed { message }
        | TrackerEvent::DeleteFailed { message } => {
            state.error = Some(message);
        }
        TrackerEvent::FormToggled { visible } => {
            state.show_form = visible;
        }
    }
    state
}

/// Drives [`reduce`] with real API calls.
///
/// Create and update re-raise their failures so the originating form or
/// item can keep its own open/edit state; delete does not, matching the
/// presentation contract.
pub struct BugTracker {
    state: TrackerState,
    client: BugApiClient,
    next_seq: u64,
}

impl BugTracker {
    /// Creates a tracker over the given API client.
    pub fn new(client: BugApiClient) -> Self {
        BugTracker {
            state: TrackerState::new(),
            client,
            next_seq: 0,
        }
    }

    /// The current state, for rendering.
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    fn apply(&mut self, event: TrackerEvent) {
        self.state = reduce(std::mem::take(&mut self.state), event);
    }

    /// Fetches the full list and replaces the held copy. Safe to call
    /// repeatedly; stale responses are discarded by the reducer.
    pub async fn refresh(&mut self) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.apply(TrackerEvent::RefreshStarted { seq });
        match self.client.list_bugs().await {
            Ok(bugs) => self.apply(TrackerEvent::RefreshSucceeded { seq, bugs }),
            Err(e) => self.apply(TrackerEvent::RefreshFailed {
                seq,
                message: resolve_message(&e, FETCH_BUGS_FALLBACK),
            }),
        }
    }

    /// Creates a bug; on success the record is prepended and the form
    /// hidden. Failures are re-raised so the form can stay open with the
    /// user's input intact.
    pub async fn create_bug(&mut self, draft: &BugDraft) -> Result<Bug, ApiClientError> {
        self.apply(TrackerEvent::CreateStarted);
        match self.client.create_bug(draft).await {
            Ok(bug) => {
                self.apply(TrackerEvent::CreateSucceeded { bug: bug.clone() });
                Ok(bug)
            }
            Err(e) => {
                self.apply(TrackerEvent::CreateFailed {
                    message: resolve_message(&e, CREATE_BUG_FALLBACK),
                });
                Err(e)
            }
        }
    }

    /// Applies a partial update; on success the matching record is replaced
    /// in place. Failures are re-raised so the item can remain in edit mode.
    pub async fn update_bug(
        &mut self,
        id: &BugId,
        patch: &BugPatch,
    ) -> Result<Bug, ApiClientError> {
        self.apply(TrackerEvent::UpdateStarted);
        match self.client.update_bug(id, patch).await {
            Ok(bug) => {
                self.apply(TrackerEvent::UpdateSucceeded { bug: bug.clone() });
                Ok(bug)
            }
            Err(e) => {
                self.apply(TrackerEvent::UpdateFailed {
                    message: resolve_message(&e, UPDATE_BUG_FALLBACK),
                });
                Err(e)
            }
        }
    }

    /// Deletes a bug. The caller is responsible for having confirmed the
    /// user's intent. On failure the held list is left unchanged and the
    /// error is surfaced through state only.
    pub async fn delete_bug(&mut self, id: &BugId) {
        self.apply(TrackerEvent::DeleteStarted);
        match self.client.delete_bug(id).await {
            Ok(()) => self.apply(TrackerEvent::DeleteSucceeded { id: *id }),
            Err(e) => self.apply(TrackerEvent::DeleteFailed {
                message: resolve_message(&e, DELETE_BUG_FALLBACK),
            }),
        }
    }

    /// Shows or hides the creation form.
    pub fn toggle_form(&mut self, visible: bool) {
        self.apply(TrackerEvent::FormToggled { visible });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bug::BugStatus;
    use chrono::Utc;

    fn sample_bug(title: &str) -> Bug {
        Bug {
            id: BugId::generate(),
            title: title.to_string(),
            description: "Desc".to_string(),
            status: BugStatus::Open,
            priority: None,
            reporter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn refresh_replaces_list_and_clears_loading() {
        let state = TrackerState::new();
        let state = reduce(state, TrackerEvent::RefreshStarted { seq: 1 });
        assert!(state.loading);
        assert_eq!(state.error, None);

        let bugs = vec![sample_bug("a"), sample_bug("b")];
        let state = reduce(
            state,
            TrackerEvent::RefreshSucceeded {
                seq: 1,
                bugs: bugs.clone(),
            },
        );
        assert!(!state.loading);
        assert_eq!(state.bugs, bugs);
    }

    #[test]
    fn stale_refresh_response_is_discarded() {
        let state = TrackerState::new();
        let state = reduce(state, TrackerEvent::RefreshStarted { seq: 1 });
        let state = reduce(state, TrackerEvent::RefreshStarted { seq: 2 });

        // The first refresh resolves after the second was issued.
        let stale = vec![sample_bug("stale")];
        let state = reduce(
            state,
            TrackerEvent::RefreshSucceeded {
                seq: 1,
                bugs: stale,
            },
        );
        assert!(state.bugs.is_empty());
        assert!(state.loading);

        let fresh = vec![sample_bug("fresh")];
        let state = reduce(
            state,
            TrackerEvent::RefreshSucceeded {
                seq: 2,
                bugs: fresh.clone(),
            },
        );
        assert_eq!(state.bugs, fresh);
        assert!(!state.loading);
    }

    #[test]
    fn stale_refresh_failure_is_discarded() {
        let state = reduce(TrackerState::new(), TrackerEvent::RefreshStarted { seq: 1 });
        let state = reduce(state, TrackerEvent::RefreshStarted { seq: 2 });
        let state = reduce(
            state,
            TrackerEvent::RefreshFailed {
                seq: 1,
                message: "boom".to_string(),
            },
        );
        assert_eq!(state.error, None);
        assert!(state.loading);
    }

    #[test]
    fn refresh_failure_sets_error() {
        let state = reduce(TrackerState::new(), TrackerEvent::RefreshStarted { seq: 1 });
        let state = reduce(
            state,
            TrackerEvent::RefreshFailed {
                seq: 1,
                message: "Failed to fetch bugs".to_string(),
            },
        );
        assert_eq!(state.error.as_deref(), Some("Failed to fetch bugs"));
        assert!(!state.loading);
    }

    #[test]
    fn create_prepends_and_hides_form() {
        let existing = sample_bug("existing");
        let mut state = TrackerState::new();
        state.bugs = vec![existing.clone()];
        state.show_form = true;

        let created = sample_bug("created");
        let state = reduce(
            state,
            TrackerEvent::CreateSucceeded {
                bug: created.clone(),
            },
        );
        assert_eq!(state.bugs, vec![created, existing]);
        assert!(!state.show_form);
    }

    #[test]
    fn create_failure_keeps_form_open() {
        let mut state = TrackerState::new();
        state.show_form = true;
        let state = reduce(
            state,
            TrackerEvent::CreateFailed {
                message: "Validation failed".to_string(),
            },
        );
        assert!(state.show_form);
        assert_eq!(state.error.as_deref(), Some("Validation failed"));
        assert!(state.bugs.is_empty());
    }

    #[test]
    fn update_replaces_matching_record_in_place() {
        let a = sample_bug("a");
        let b = sample_bug("b");
        let c = sample_bug("c");
        let mut state = TrackerState::new();
        state.bugs = vec![a.clone(), b.clone(), c.clone()];

        let mut updated = b.clone();
        updated.status = BugStatus::Resolved;
        let state = reduce(
            state,
            TrackerEvent::UpdateSucceeded {
                bug: updated.clone(),
            },
        );
        assert_eq!(state.bugs, vec![a, updated, c]);
    }

    #[test]
    fn delete_removes_matching_record() {
        let a = sample_bug("a");
        let b = sample_bug("b");
        let mut state = TrackerState::new();
        state.bugs = vec![a.clone(), b.clone()];

        let state = reduce(state, TrackerEvent::DeleteSucceeded { id: a.id });
        assert_eq!(state.bugs, vec![b]);
    }

    #[test]
    fn delete_failure_leaves_list_unchanged() {
        let a = sample_bug("a");
        let mut state = TrackerState::new();
        state.bugs = vec![a.clone()];

        let state = reduce(
            state,
            TrackerEvent::DeleteFailed {
                message: "Failed to delete bug".to_string(),
            },
        );
        assert_eq!(state.bugs, vec![a]);
        assert_eq!(state.error.as_deref(), Some("Failed to delete bug"));
    }

    #[test]
    fn mutation_start_clears_previous_error() {
        let mut state = TrackerState::new();
        state.error = Some("old error".to_string());
        let state = reduce(state, TrackerEvent::CreateStarted);
        assert_eq!(state.error, None);
    }

    #[test]
    fn form_toggle() {
        let state = reduce(TrackerState::new(), TrackerEvent::FormToggled { visible: true });
        assert!(state.show_form);
        let state = reduce(state, TrackerEvent::FormToggled { visible: false });
        assert!(!state.show_form);
    }
}
