//! Append-only audit journal of entity mutations
//!
//! Every mutation attempt against a provider ends up here: the entity
//! snapshot, the operation name, its outcome and the change kind, one JSON
//! record per line. The journal is write-only from the provider's point of
//! view; it never feeds back into any operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::store::StoreError;

/// What happened to the entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

/// Whether the mutation went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionStatus {
    Success,
    Fault,
}

/// One audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// What kind of record the snapshot is, e.g. "task"
    pub entity_type: String,

    /// Serialized state of the entity at mutation time
    pub snapshot: serde_json::Value,

    /// Provider operation that performed the mutation
    pub method: String,

    pub status: ActionStatus,

    pub change: ChangeType,

    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new<T: Serialize>(
        entity_type: &str,
        entity: &T,
        method: &str,
        status: ActionStatus,
        change: ChangeType,
    ) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            snapshot: serde_json::to_value(entity).unwrap_or(serde_json::Value::Null),
            method: method.to_string(),
            status,
            change,
            recorded_at: Utc::now(),
        }
    }
}

/// Append-only JSON-lines journal
#[derive(Debug, Clone)]
pub struct HistoryJournal {
    path: PathBuf,
}

impl HistoryJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry
    pub fn record(&self, record: &HistoryRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record).map_err(|e| StoreError::Encode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        writeln!(file, "{}", line).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Read the whole journal back, oldest first
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|e| StoreError::Decode {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_journal_appends_in_order() {
        let dir = TempDir::new().unwrap();
        let journal = HistoryJournal::new(dir.path().join("history.jsonl"));

        for method in ["create_task", "delete_task"] {
            let record = HistoryRecord::new(
                "task",
                &serde_json::json!({"name": "x"}),
                method,
                ActionStatus::Success,
                ChangeType::Create,
            );
            journal.record(&record).unwrap();
        }

        let back = journal.read_all().unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].method, "create_task");
        assert_eq!(back[1].method, "delete_task");
    }

    #[test]
    fn test_absent_journal_reads_empty() {
        let dir = TempDir::new().unwrap();
        let journal = HistoryJournal::new(dir.path().join("history.jsonl"));
        assert!(journal.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_fault_entries_roundtrip() {
        let dir = TempDir::new().unwrap();
        let journal = HistoryJournal::new(dir.path().join("history.jsonl"));

        let record = HistoryRecord::new(
            "project",
            &serde_json::json!({"name": "doomed"}),
            "create_project",
            ActionStatus::Fault,
            ChangeType::Create,
        );
        journal.record(&record).unwrap();

        let back = journal.read_all().unwrap();
        assert_eq!(back[0].status, ActionStatus::Fault);
        assert_eq!(back[0].change, ChangeType::Create);
    }
}
