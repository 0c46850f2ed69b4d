//! YAML document codec
//!
//! Each entity file is a single document: a root mapping whose `records`
//! key wraps the full list of typed child records.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::store::{FileCodec, StoreError, StoreRecord};

/// Root container wrapping the record list
#[derive(Debug, Serialize, Deserialize)]
struct Container<T> {
    #[serde(default = "Vec::new")]
    records: Vec<T>,
}

/// Whole-file YAML document codec
pub struct YamlCodec;

impl FileCodec for YamlCodec {
    const EXTENSION: &'static str = "yaml";

    fn read_all<T: StoreRecord>(path: &Path) -> Result<Vec<T>, StoreError> {
        read_document(path)
    }

    fn write_all<T: StoreRecord>(path: &Path, records: &[T]) -> Result<(), StoreError> {
        write_document(path, records)
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let container: Container<T> =
        serde_yml::from_str(&content).map_err(|e| StoreError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    Ok(container.records)
}

fn write_document<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let container = Container {
        records: records.iter().collect::<Vec<_>>(),
    };

    let content = serde_yml::to_string(&container).map_err(|e| StoreError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    fs::write(path, content).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
