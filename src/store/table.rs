//! CSV table codec
//!
//! Each entity file is one table: a header row plus one row per record,
//! fields separated by `;`. Timestamps are RFC 3339 strings. CSV has no
//! nested structure, so collection-valued fields (task tags, documentation
//! body) travel as JSON strings inside a single cell; the row types in
//! [`crate::store::rows`] own that flattening.

use std::fs::File;
use std::path::Path;

use crate::store::{FileCodec, StoreError, StoreRecord};

/// Field delimiter for every table
pub const DELIMITER: u8 = b';';

/// Conversion between a domain record and its flat CSV row
pub trait TableRecord: Sized {
    type Row: serde::Serialize + serde::de::DeserializeOwned;

    fn to_row(&self) -> Self::Row;

    /// Rebuild the record; fails when a flattened cell does not parse
    fn from_row(row: Self::Row) -> Result<Self, String>;
}

/// Whole-file CSV table codec
pub struct CsvCodec;

impl FileCodec for CsvCodec {
    const EXTENSION: &'static str = "csv";

    fn read_all<T: StoreRecord>(path: &Path) -> Result<Vec<T>, StoreError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .from_reader(file);

        let mut records = Vec::new();
        for row in reader.deserialize::<T::Row>() {
            let row = row.map_err(|e| StoreError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let record = T::from_row(row).map_err(|message| StoreError::Decode {
                path: path.to_path_buf(),
                message,
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn write_all<T: StoreRecord>(path: &Path, records: &[T]) -> Result<(), StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(file);

        for record in records {
            writer
                .serialize(record.to_row())
                .map_err(|e| StoreError::Encode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
        }

        writer.flush().map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityKind};
    use crate::entities::{Documentation, Event, Task};
    use chrono::Utc;
    use tempfile::TempDir;

    fn ids() -> (EntityId, EntityId) {
        (
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
        )
    }

    #[test]
    fn test_read_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let records: Vec<Task> = CsvCodec::read_all(&dir.path().join("tasks.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_task_roundtrip_with_tags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.csv");
        let (project, employee) = ids();

        let tasks = vec![
            Task::new(project, employee, "Nika Adams", "tagged", Utc::now())
                .with_tags(["codec", "storage"]),
            Task::new(project, employee, "Nika Adams", "untagged", Utc::now()),
        ];

        CsvCodec::write_all(&path, &tasks).unwrap();
        let back: Vec<Task> = CsvCodec::read_all(&path).unwrap();

        assert_eq!(tasks, back);
        assert!(back[1].tags.is_empty());
        assert!(back[1].completed_at.is_none());
    }

    #[test]
    fn test_event_roundtrip_without_end_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.csv");
        let (project, employee) = ids();

        let events = vec![Event::new(project, employee, "Nika Adams", "retro", Utc::now())];
        CsvCodec::write_all(&path, &events).unwrap();

        let back: Vec<Event> = CsvCodec::read_all(&path).unwrap();
        assert_eq!(events, back);
        assert!(back[0].end_date.is_none());
    }

    #[test]
    fn test_documentation_roundtrip_with_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documentations.csv");
        let (project, employee) = ids();

        let docs = vec![
            Documentation::new(project, employee, "Nika Adams", "guide")
                .with_section("Install", "cargo install")
                .with_section("Notes", "semicolons; and, commas are fine"),
            Documentation::new(project, employee, "Nika Adams", "empty"),
        ];

        CsvCodec::write_all(&path, &docs).unwrap();
        let back: Vec<Documentation> = CsvCodec::read_all(&path).unwrap();

        assert_eq!(docs, back);
        assert!(back[1].body.is_empty());
    }
}
