//! Record trait - common interface for all stored entity types

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityKind};

/// Common trait for all stored records
pub trait Record: Serialize + DeserializeOwned {
    /// The entity kind this record belongs to
    const KIND: EntityKind;

    /// Get the record's unique ID
    fn id(&self) -> EntityId;

    /// Get the record's display name
    fn name(&self) -> &str;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;
}

/// Execution status of a task
///
/// Labels are SCREAMING_SNAKE_CASE on the wire and in `Display` because the
/// status-tracking maps expose them verbatim.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum WorkStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkStatus::NotStarted => write!(f, "NOT_STARTED"),
            WorkStatus::InProgress => write!(f, "IN_PROGRESS"),
            WorkStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for WorkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NOT_STARTED" => Ok(WorkStatus::NotStarted),
            "IN_PROGRESS" => Ok(WorkStatus::InProgress),
            "COMPLETED" => Ok(WorkStatus::Completed),
            _ => Err(format!("Unknown work status: {}", s)),
        }
    }
}

/// Lifecycle status of a bug report
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum BugStatus {
    #[default]
    Opened,
    InProgress,
    Closed,
}

impl std::fmt::Display for BugStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BugStatus::Opened => write!(f, "OPENED"),
            BugStatus::InProgress => write!(f, "IN_PROGRESS"),
            BugStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl std::str::FromStr for BugStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OPENED" => Ok(BugStatus::Opened),
            "IN_PROGRESS" => Ok(BugStatus::InProgress),
            "CLOSED" => Ok(BugStatus::Closed),
            _ => Err(format!("Unknown bug status: {}", s)),
        }
    }
}

/// Lifecycle status of a project
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum ProjectStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Planned => write!(f, "PLANNED"),
            ProjectStatus::InProgress => write!(f, "IN_PROGRESS"),
            ProjectStatus::Completed => write!(f, "COMPLETED"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PLANNED" => Ok(ProjectStatus::Planned),
            "IN_PROGRESS" => Ok(ProjectStatus::InProgress),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

/// Priority values shared by tasks and bug reports
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
            Priority::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}
