//! Store location configuration with environment selection

use std::path::PathBuf;

/// Deployment environment, selecting where backing files live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Production,
    Test,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

/// Resolved locations of the backing store
///
/// Built either programmatically ([`StoreConfig::new`], what tests use) or
/// from the process environment ([`StoreConfig::from_env`]).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory for the per-entity data files
    pub data_dir: PathBuf,
    /// Path of the append-only history journal
    pub history_path: PathBuf,
    /// Path of the SQLite database file
    pub sqlite_path: PathBuf,
}

impl StoreConfig {
    /// Point every store at the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            history_path: dir.join("history.jsonl"),
            sqlite_path: dir.join("tracklet.db"),
            data_dir: dir,
        }
    }

    /// Resolve locations from the process environment
    ///
    /// `TRACKLET_ENV` (production | test) picks the base directory;
    /// `TRACKLET_DATA_DIR`, `TRACKLET_HISTORY_FILE` and
    /// `TRACKLET_SQLITE_PATH` override individual locations.
    pub fn from_env() -> Self {
        let environment = std::env::var("TRACKLET_ENV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        let base = match environment {
            Environment::Production => PathBuf::from("data"),
            Environment::Test => PathBuf::from("data-test"),
        };

        let mut config = Self::new(base);

        if let Ok(dir) = std::env::var("TRACKLET_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("TRACKLET_HISTORY_FILE") {
            config.history_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("TRACKLET_SQLITE_PATH") {
            config.sqlite_path = PathBuf::from(path);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            "production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Test);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_config_paths_share_dir() {
        let config = StoreConfig::new("/tmp/tracklet");
        assert_eq!(config.history_path, PathBuf::from("/tmp/tracklet/history.jsonl"));
        assert_eq!(config.sqlite_path, PathBuf::from("/tmp/tracklet/tracklet.db"));
    }
}
