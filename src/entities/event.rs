//! Event record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::ProjectScoped;

/// A calendar event attached to one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: EntityId,

    /// Owning project
    pub project_id: EntityId,

    /// Organizing employee
    pub employee_id: EntityId,

    /// Denormalized snapshot of the organizer's name
    pub employee_full_name: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub start_date: DateTime<Utc>,

    /// Open-ended events carry no end date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with a fresh id
    pub fn new(
        project_id: EntityId,
        employee_id: EntityId,
        employee_full_name: impl Into<String>,
        name: impl Into<String>,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityKind::Event),
            project_id,
            employee_id,
            employee_full_name: employee_full_name.into(),
            name: name.into(),
            description: String::new(),
            start_date,
            end_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

impl Record for Event {
    const KIND: EntityKind = EntityKind::Event;

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

impl ProjectScoped for Event {
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
    fn test_event_roundtrip_without_end_date() {
        let event = Event::new(
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
            "Nika Adams",
            "release retro",
            Utc::now(),
        );

        let yaml = serde_yml::to_string(&event).unwrap();
        assert!(!yaml.contains("end_date"));

        let parsed: Event = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(event, parsed);
        assert!(parsed.end_date.is_none());
    }
}
