//! Documentation record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::ProjectScoped;

/// A documentation item attached to one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Documentation {
    /// Unique identifier
    pub id: EntityId,

    /// Owning project
    pub project_id: EntityId,

    /// Authoring employee
    pub employee_id: EntityId,

    /// Denormalized snapshot of the author's name
    pub employee_full_name: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Section title to section text
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub body: BTreeMap<String, String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Documentation {
    /// Create a new documentation item with a fresh id
    pub fn new(
        project_id: EntityId,
        employee_id: EntityId,
        employee_full_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityKind::Documentation),
            project_id,
            employee_id,
            employee_full_name: employee_full_name.into(),
            name: name.into(),
            description: String::new(),
            body: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_section(mut self, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.body.insert(title.into(), text.into());
        self
    }
}

impl Record for Documentation {
    const KIND: EntityKind = EntityKind::Documentation;

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

impl ProjectScoped for Documentation {
    fn project_id(&self) -> EntityId {
        self.project_id
    }

    fn employee_id(&self) -> EntityId {
        self.employee_id
    }
}
