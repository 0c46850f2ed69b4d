//! File-backed record stores
//!
//! One file per entity type, whole-file read and rewrite on every
//! operation. Two codecs share the contract: a YAML document container and
//! a CSV table. Neither guarantees crash atomicity; a crash mid-rewrite can
//! corrupt the file.

pub mod document;
pub mod rows;
pub mod table;

pub use document::YamlCodec;
pub use table::CsvCodec;

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::entity::Record;
use crate::core::identity::EntityId;
use crate::store::table::TableRecord;

/// Fixed per-entity file stems; the codec supplies the extension
pub const PROJECTS_FILE: &str = "projects";
pub const EMPLOYEES_FILE: &str = "employees";
pub const TASKS_FILE: &str = "tasks";
pub const BUG_REPORTS_FILE: &str = "bug_reports";
pub const EVENTS_FILE: &str = "events";
pub const DOCUMENTATIONS_FILE: &str = "documentations";
pub const EMPLOYEE_PROJECT_FILE: &str = "employee_project";

/// Errors raised by the file codecs
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode records for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("failed to decode records from {path}: {message}")]
    Decode { path: PathBuf, message: String },
}

/// Everything a record needs to travel through either file codec
pub trait StoreRecord: Serialize + DeserializeOwned + TableRecord + Clone {}

impl<T: Serialize + DeserializeOwned + TableRecord + Clone> StoreRecord for T {}

/// A whole-file record codec
///
/// `read_all` yields an empty vec for an absent or empty file, preserving
/// record order otherwise; `write_all` rewrites the file in place.
pub trait FileCodec {
    const EXTENSION: &'static str;

    fn read_all<T: StoreRecord>(path: &Path) -> Result<Vec<T>, StoreError>;

    fn write_all<T: StoreRecord>(path: &Path, records: &[T]) -> Result<(), StoreError>;
}

/// Append one record, preserving the existing ones
pub fn append_record<C: FileCodec, T: StoreRecord>(
    path: &Path,
    record: &T,
) -> Result<(), StoreError> {
    let mut records = C::read_all::<T>(path)?;
    records.push(record.clone());
    C::write_all(path, &records)
}

/// Read-all-and-scan existence check, O(n) over the file
pub fn record_exists<C: FileCodec, T: StoreRecord + Record>(
    path: &Path,
    id: EntityId,
) -> Result<bool, StoreError> {
    Ok(C::read_all::<T>(path)?.iter().any(|r| r.id() == id))
}

/// Resolved locations of every backing file for one data directory
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub projects: PathBuf,
    pub employees: PathBuf,
    pub tasks: PathBuf,
    pub bug_reports: PathBuf,
    pub events: PathBuf,
    pub documentations: PathBuf,
    pub links: PathBuf,
}

impl StorePaths {
    /// Derive the file set for a base directory and codec extension
    pub fn resolve(dir: &Path, extension: &str) -> Self {
        let file = |stem: &str| dir.join(format!("{}.{}", stem, extension));
        Self {
            projects: file(PROJECTS_FILE),
            employees: file(EMPLOYEES_FILE),
            tasks: file(TASKS_FILE),
            bug_reports: file(BUG_REPORTS_FILE),
            events: file(EVENTS_FILE),
            documentations: file(DOCUMENTATIONS_FILE),
            links: file(EMPLOYEE_PROJECT_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_carry_extension() {
        let paths = StorePaths::resolve(Path::new("/data"), "csv");
        assert_eq!(paths.projects, PathBuf::from("/data/projects.csv"));
        assert_eq!(paths.links, PathBuf::from("/data/employee_project.csv"));
    }
}
