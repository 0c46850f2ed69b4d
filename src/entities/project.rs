//! Project record and the transient aggregate used for bulk initialization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{ProjectStatus, Record};
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::{BugReport, Documentation, Employee, Event, Task};

/// A project record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: EntityId,

    /// Short project name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Current status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Delivery deadline, if one has been set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// Manager, set through `bind_project_manager`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EntityId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with a fresh id
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityKind::Project),
            name: name.into(),
            description: description.into(),
            status: ProjectStatus::default(),
            deadline: None,
            manager_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }
}

impl Record for Project {
    const KIND: EntityKind = EntityKind::Project;

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

/// A fully populated in-memory project with its attached entities
///
/// Only the [`Project`] record inside is ever persisted as-is; the attached
/// collections feed `init_project_entities` and are lost on reload. The
/// manager designation is `project.manager_id` naming a team member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAggregate {
    pub project: Project,
    /// Team member designated as manager, bound after the team is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EntityId>,
    #[serde(default)]
    pub team: Vec<Employee>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub bug_reports: Vec<BugReport>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub documentations: Vec<Documentation>,
}

impl ProjectAggregate {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            manager_id: None,
            team: Vec::new(),
            tasks: Vec::new(),
            bug_reports: Vec::new(),
            events: Vec::new(),
            documentations: Vec::new(),
        }
    }
}
