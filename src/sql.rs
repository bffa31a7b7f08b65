//! PostgreSQL-backed bug record storage.
//!
//! Rows map one-to-one onto [`Bug`]: the identifier is stored as 12 raw
//! bytes, enum fields as their wire spellings. Queries are bound at runtime
//! so the crate builds without a live database; the schema lives in
//! `migrations/` and is applied by the `bugtrack-migrate-up` binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::{Bug, BugChanges, BugId, BugStore, DataStoreError, NewBug};

/// [`crate::BugStore`] backend over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresBugStore {
    pool: PgPool,
}

impl PostgresBugStore {
    /// Wraps an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the given database URL.
    pub async fn connect(database_url: &str) -> Result<Self, DataStoreError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }
}

fn row_to_bug(row: &PgRow) -> Result<Bug, DataStoreError> {
    let id_bytes: Vec<u8> = row.try_get("bug_id")?;
    let id = BugId::from_slice(&id_bytes)
        .ok_or_else(|| DataStoreError::Internal("stored bug_id is not 12 bytes".to_string()))?;
    let status: String = row.try_get("status")?;
    let status = status
        .parse()
        .map_err(|()| DataStoreError::Internal(format!("stored status {:?} is invalid", status)))?;
    let priority: Option<String> = row.try_get("priority")?;
    let priority = match priority {
        Some(p) => Some(p.parse().map_err(|()| {
            DataStoreError::Internal(format!("stored priority {:?} is invalid", p))
        })?),
        None => None,
    };
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;
    Ok(Bug {
        id,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status,
        priority,
        reporter: row.try_get("reporter")?,
        created_at,
        updated_at,
    })
}

const SELECT_COLUMNS: &str =
    "bug_id, title, description, status, priority, reporter, created_at, updated_at";

#[async_trait]
impl BugStore for PostgresBugStore {
    async fn create_bug(&self, new_bug: &NewBug) -> Result<Bug, DataStoreError> {
        let id = BugId::generate();
        let now = Utc::now();
        let query = format!(
            "INSERT INTO bugs (bug_id, title, description, status, priority, reporter, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id.as_bytes().to_vec())
            .bind(&new_bug.title)
            .bind(&new_bug.description)
            .bind(new_bug.status.as_str())
            .bind(new_bug.priority.map(|p| p.as_str()))
            .bind(new_bug.reporter.as_deref())
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        row_to_bug(&row)
    }

    async fn get_bug(&self, id: &BugId) -> Result<Option<Bug>, DataStoreError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM bugs WHERE bug_id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_bytes().to_vec())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_bug).transpose()
    }

    async fn list_bugs(&self) -> Result<Vec<Bug>, DataStoreError> {
        let query = format!(
            "SELECT {SELECT_COLUMNS} FROM bugs ORDER BY created_at DESC, bug_id DESC"
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_bug).collect()
    }

    async fn update_bug(
        &self,
        id: &BugId,
        changes: &BugChanges,
    ) -> Result<Option<Bug>, DataStoreError> {
        // COALESCE keeps the stored value wherever the patch is silent.
        let query = format!(
            "UPDATE bugs SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             status = COALESCE($4, status), \
             priority = COALESCE($5, priority), \
             reporter = COALESCE($6, reporter), \
             updated_at = $7 \
             WHERE bug_id = $1 \
             RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id.as_bytes().to_vec())
            .bind(changes.title.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.priority.map(|p| p.as_str()))
            .bind(changes.reporter.as_deref())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_bug).transpose()
    }

    async fn delete_bug(&self, id: &BugId) -> Result<bool, DataStoreError> {
        let result = sqlx::query("DELETE FROM bugs WHERE bug_id = $1")
            .bind(id.as_bytes().to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
