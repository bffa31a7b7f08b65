//! Record storage abstraction for bug records.
//!
//! The store is the exclusive owner of persisted records: it assigns
//! identifiers and timestamps on create and is the only place a record
//! mutates. Two backends implement the [`BugStore`] trait:
//!
//! - [`InMemoryBugStore`]: thread-safe `Mutex<HashMap>` storage, used by the
//!   test suites and the daemon's default configuration.
//! - [`crate::sql::PostgresBugStore`]: sqlx-backed persistent storage.
//!
//! All methods take validated input ([`NewBug`], [`BugChanges`]) — raw wire
//! payloads never reach a store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::{Bug, BugChanges, BugId, DataStoreError, NewBug};

/// The core storage interface for bug records.
///
/// Implementors must be thread-safe; the HTTP layer shares one store across
/// all requests. Every operation returns `Result<_, DataStoreError>`;
/// absence is modeled with `Option`/`bool` rather than errors so callers can
/// shape their own not-found responses.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use bugtrack::{BugStore, InMemoryBugStore, NewBug, BugStatus};
///
/// # async fn example() {
/// let store: Arc<dyn BugStore> = Arc::new(InMemoryBugStore::new());
/// let new_bug = NewBug {
///     title: "Bug A".to_string(),
///     description: "Desc".to_string(),
///     status: BugStatus::Open,
///     priority: None,
///     reporter: None,
/// };
/// let bug = store.create_bug(&new_bug).await.unwrap();
/// let found = store.get_bug(&bug.id).await.unwrap();
/// assert_eq!(found, Some(bug));
/// # }
/// ```
#[async_trait]
pub trait BugStore: Send + Sync {
    /// Creates a new record from validated fields, assigning an identifier
    /// and creation timestamp, and returns the stored record.
    async fn create_bug(&self, new_bug: &NewBug) -> Result<Bug, DataStoreError>;

    /// Retrieves a record by identifier. `Ok(None)` when absent.
    async fn get_bug(&self, id: &BugId) -> Result<Option<Bug>, DataStoreError>;

    /// Lists all records, newest-created first. Creation-time ties are
    /// broken by identifier so the order is consistent per invocation.
    async fn list_bugs(&self) -> Result<Vec<Bug>, DataStoreError>;

    /// Applies a partial update to a record. Only the supplied fields
    /// change; `updated_at` is bumped. Returns the updated record, or
    /// `Ok(None)` when the identifier has no record.
    async fn update_bug(
        &self,
        id: &BugId,
        changes: &BugChanges,
    ) -> Result<Option<Bug>, DataStoreError>;

    /// Hard-deletes a record. `Ok(true)` when a record existed and was
    /// removed, `Ok(false)` when the identifier had no record.
    async fn delete_bug(&self, id: &BugId) -> Result<bool, DataStoreError>;
}

/// Thread-safe in-memory implementation of [`BugStore`].
pub struct InMemoryBugStore {
    bugs: Mutex<HashMap<BugId, Bug>>,
}

impl InMemoryBugStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            bugs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBugStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BugStore for InMemoryBugStore {
    async fn create_bug(&self, new_bug: &NewBug) -> Result<Bug, DataStoreError> {
        let mut bugs = self.bugs.lock().unwrap();
        let mut id = BugId::generate();
        while bugs.contains_key(&id) {
            id = BugId::generate();
        }
        let now = Utc::now();
        let bug = Bug {
            id,
            title: new_bug.title.clone(),
            description: new_bug.description.clone(),
            status: new_bug.status,
            priority: new_bug.priority,
            reporter: new_bug.reporter.clone(),
            created_at: now,
            updated_at: now,
        };
        bugs.insert(id, bug.clone());
        Ok(bug)
    }

    async fn get_bug(&self, id: &BugId) -> Result<Option<Bug>, DataStoreError> {
        let bugs = self.bugs.lock().unwrap();
        Ok(bugs.get(id).cloned())
    }

    async fn list_bugs(&self) -> Result<Vec<Bug>, DataStoreError> {
        let bugs = self.bugs.lock().unwrap();
        let mut all: Vec<Bug> = bugs.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(all)
    }

    async fn update_bug(
        &self,
        id: &BugId,
        changes: &BugChanges,
    ) -> Result<Option<Bug>, DataStoreError> {
        let mut bugs = self.bugs.lock().unwrap();
        match bugs.get_mut(id) {
            Some(bug) => {
                changes.apply_to(bug);
                Ok(Some(bug.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_bug(&self, id: &BugId) -> Result<bool, DataStoreError> {
        let mut bugs = self.bugs.lock().unwrap();
        Ok(bugs.remove(id).is_some())
    }
}
