//! Entity identity system using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity kinds known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Project,
    Employee,
    Task,
    BugReport,
    Event,
    Documentation,
}

impl EntityKind {
    /// Get the id prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Project => "PROJ",
            EntityKind::Employee => "EMP",
            EntityKind::Task => "TASK",
            EntityKind::BugReport => "BUG",
            EntityKind::Event => "EVT",
            EntityKind::Documentation => "DOC",
        }
    }

    /// Snake-case name used by the history journal
    pub fn entity_name(&self) -> &'static str {
        match self {
            EntityKind::Project => "project",
            EntityKind::Employee => "employee",
            EntityKind::Task => "task",
            EntityKind::BugReport => "bug_report",
            EntityKind::Event => "event",
            EntityKind::Documentation => "documentation",
        }
    }

    /// Get all entity kinds
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Project,
            EntityKind::Employee,
            EntityKind::Task,
            EntityKind::BugReport,
            EntityKind::Event,
            EntityKind::Documentation,
        ]
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl FromStr for EntityKind {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PROJ" => Ok(EntityKind::Project),
            "EMP" => Ok(EntityKind::Employee),
            "TASK" => Ok(EntityKind::Task),
            "BUG" => Ok(EntityKind::BugReport),
            "EVT" => Ok(EntityKind::Event),
            "DOC" => Ok(EntityKind::Documentation),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique entity identifier combining a kind prefix and ULID
///
/// Assigned once at construction and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    kind: EntityKind,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh EntityId for the given kind
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            ulid: Ulid::new(),
        }
    }

    /// Build an EntityId from a kind and existing ULID
    pub fn from_parts(kind: EntityKind, ulid: Ulid) -> Self {
        Self { kind, ulid }
    }

    /// Get the entity kind
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.ulid
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let kind = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { kind, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing entity IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid entity prefix: '{0}' (valid: PROJ, EMP, TASK, BUG, EVT, DOC)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in entity ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityKind::Project);
        assert!(id.to_string().starts_with("PROJ-"));
        assert_eq!(id.to_string().len(), 31); // PROJ- (5) + ULID (26) = 31
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let original = EntityId::new(EntityKind::Task);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.kind(), EntityKind::Task);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("TASK01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("EMP-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_kinds_parse() {
        for kind in EntityKind::all() {
            let id = EntityId::new(*kind);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.kind(), *kind);
        }
    }

    #[test]
    fn test_serde_string_form() {
        let id = EntityId::new(EntityKind::BugReport);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
