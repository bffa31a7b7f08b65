//! Durable JSONL operation log.
//!
//! Every mutating API operation appends one [`LogEntry`] to an append-only
//! JSON Lines file, giving the daemon an audit trail of creates, updates,
//! and deletes without coupling request handling to the log: a failed write
//! is reported to stderr and the request proceeds.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Bug;

/// A single logged operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique identifier for this log entry.
    pub id: String,
    /// When the operation occurred.
    pub timestamp: DateTime<Utc>,
    /// The operation that was performed.
    pub operation: LogOperation,
    /// Whether the operation succeeded.
    pub status: OperationStatus,
}

/// The mutating operations that are logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogOperation {
    /// A record was created.
    BugCreate {
        /// The stored record.
        bug: Bug,
    },
    /// A record was partially updated.
    BugUpdate {
        /// Identifier of the updated record.
        bug_id: String,
        /// Names of the fields the update supplied.
        fields: Vec<String>,
    },
    /// A record was deleted.
    BugDelete {
        /// Identifier of the deleted record.
        bug_id: String,
    },
}

/// Outcome of a logged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    /// The operation completed.
    Success,
    /// The operation failed (validation, missing record, or store error).
    Failure,
}

impl LogEntry {
    /// Creates a log entry stamped with the current time.
    pub fn new(operation: LogOperation, status: OperationStatus) -> Self {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);
        let timestamp = Utc::now();
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        LogEntry {
            id: format!("op-{}-{}", timestamp.timestamp_millis(), seq),
            timestamp,
            operation,
            status,
        }
    }

    /// Returns true when the logged operation succeeded.
    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

/// Appends [`LogEntry`] values to a JSONL file.
pub struct DurableLogger {
    log_file_path: PathBuf,
}

impl DurableLogger {
    /// Creates a logger writing to the given path. The file is created on
    /// first write.
    pub fn new(log_file_path: PathBuf) -> Self {
        Self { log_file_path }
    }

    /// Appends one entry as a JSON line.
    pub fn log(&self, entry: &LogEntry) -> Result<(), std::io::Error> {
        let line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Appends one entry, reporting failures to stderr instead of
    /// propagating them. The operation log must never fail a request.
    pub fn log_or_error(&self, entry: &LogEntry) {
        if let Err(e) = self.log(entry) {
            eprintln!(
                "Failed to write log entry to {:?}: {}",
                self.log_file_path, e
            );
        }
    }

    /// Reads all entries back, skipping blank lines.
    pub fn read_log_entries(&self) -> Result<Vec<LogEntry>, std::io::Error> {
        if !self.log_file_path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(&self.log_file_path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            entries.push(entry);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bug::{BugId, BugStatus};

    fn sample_bug() -> Bug {
        Bug {
            id: BugId::generate(),
            title: "Bug A".to_string(),
            description: "Desc".to_string(),
            status: BugStatus::Open,
            priority: None,
            reporter: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn temp_log_path(suffix: &str) -> PathBuf {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir().join(format!(
            "bugtrack_log_test_{}_{}_{}.jsonl",
            std::process::id(),
            timestamp,
            suffix
        ))
    }

    #[test]
    fn entries_round_trip_through_the_file() {
        let path = temp_log_path("round_trip");
        let logger = DurableLogger::new(path.clone());

        let bug = sample_bug();
        logger
            .log(&LogEntry::new(
                LogOperation::BugCreate { bug: bug.clone() },
                OperationStatus::Success,
            ))
            .unwrap();
        logger
            .log(&LogEntry::new(
                LogOperation::BugDelete {
                    bug_id: bug.id.to_string(),
                },
                OperationStatus::Failure,
            ))
            .unwrap();

        let entries = logger.read_log_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_success());
        assert!(!entries[1].is_success());
        match &entries[0].operation {
            LogOperation::BugCreate { bug: logged } => assert_eq!(logged, &bug),
            other => panic!("unexpected operation: {:?}", other),
        }

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn reading_a_missing_file_is_empty() {
        let logger = DurableLogger::new(temp_log_path("missing"));
        assert!(logger.read_log_entries().unwrap().is_empty());
    }

    #[test]
    fn entry_ids_are_unique() {
        let a = LogEntry::new(
            LogOperation::BugDelete {
                bug_id: "64a1f2c3d4e5f60718293a4b".to_string(),
            },
            OperationStatus::Success,
        );
        let b = LogEntry::new(
            LogOperation::BugDelete {
                bug_id: "64a1f2c3d4e5f60718293a4b".to_string(),
            },
            OperationStatus::Success,
        );
        assert_ne!(a.id, b.id);
    }
}
