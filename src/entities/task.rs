//! Task record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::entity::{Priority, Record, WorkStatus};
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::ProjectScoped;

/// A task belonging to one project and assigned to one employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: EntityId,

    /// Owning project
    pub project_id: EntityId,

    /// Assigned employee
    pub employee_id: EntityId,

    /// Denormalized snapshot of the assignee's name, kept in sync at write
    /// time so status listings need no employee lookup
    pub employee_full_name: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default)]
    pub status: WorkStatus,

    /// Free-form labels used by tag search
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    pub deadline: DateTime<Utc>,

    /// Stamped by [`Task::complete`]; never set any other way
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub priority: Priority,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with a fresh id
    pub fn new(
        project_id: EntityId,
        employee_id: EntityId,
        employee_full_name: impl Into<String>,
        name: impl Into<String>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityKind::Task),
            project_id,
            employee_id,
            employee_full_name: employee_full_name.into(),
            name: name.into(),
            description: String::new(),
            comment: None,
            status: WorkStatus::default(),
            tags: BTreeSet::new(),
            deadline,
            completed_at: None,
            priority: Priority::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: WorkStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Transition to completed and stamp the completion time
    pub fn complete(&mut self) {
        self.status = WorkStatus::Completed;
        self.completed_at = Some(Utc::now());
    }
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ProjectScoped for Task {
    fn project_id(&self) -> EntityId {
        self.project_id
    }

    fn employee_id(&self) -> EntityId {
        self.employee_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task() -> Task {
        Task::new(
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
            "Nika Adams",
            "wire the codec",
            Utc::now() + Duration::days(7),
        )
    }

    #[test]
    fn test_task_roundtrip() {
        let task = task().with_tags(["storage", "codec"]);
        let yaml = serde_yml::to_string(&task).unwrap();
        let parsed: Task = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(task, parsed);
    }

    #[test]
    fn test_empty_tags_roundtrip() {
        let task = task();
        let yaml = serde_yml::to_string(&task).unwrap();
        assert!(!yaml.contains("tags"));
        let parsed: Task = serde_yml::from_str(&yaml).unwrap();
        assert!(parsed.tags.is_empty());
        assert!(parsed.completed_at.is_none());
    }

    #[test]
    fn test_complete_stamps_time() {
        let mut task = task();
        assert_eq!(task.status, WorkStatus::NotStarted);
        assert!(task.completed_at.is_none());

        task.complete();

        assert_eq!(task.status, WorkStatus::Completed);
        assert!(task.completed_at.is_some());
    }
}
