//! Bug report record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::{BugStatus, Priority, Record};
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::ProjectScoped;

/// A bug report filed against one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugReport {
    /// Unique identifier
    pub id: EntityId,

    /// Owning project
    pub project_id: EntityId,

    /// Reporting employee
    pub employee_id: EntityId,

    /// Denormalized snapshot of the reporter's name
    pub employee_full_name: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: BugStatus,

    #[serde(default)]
    pub priority: Priority,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl BugReport {
    /// Create a new bug report with a fresh id
    pub fn new(
        project_id: EntityId,
        employee_id: EntityId,
        employee_full_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityKind::BugReport),
            project_id,
            employee_id,
            employee_full_name: employee_full_name.into(),
            name: name.into(),
            description: String::new(),
            status: BugStatus::default(),
            priority: Priority::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: BugStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

impl Record for BugReport {
    const KIND: EntityKind = EntityKind::BugReport;

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

impl ProjectScoped for BugReport {
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

    #[test]
    fn test_bug_report_roundtrip() {
        let bug = BugReport::new(
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
            "Nika Adams",
            "journal loses last line",
        )
        .with_priority(Priority::High);

        let yaml = serde_yml::to_string(&bug).unwrap();
        let parsed: BugReport = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(bug, parsed);
        assert_eq!(parsed.status, BugStatus::Opened);
    }
}
