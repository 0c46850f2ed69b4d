//! Employee record

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityKind};

/// An employee record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier
    pub id: EntityId,

    pub first_name: String,

    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<String>,

    pub birthday: NaiveDate,

    #[serde(default)]
    pub phone: String,

    /// Job position, e.g. "backend developer"
    #[serde(default)]
    pub position: String,

    #[serde(default)]
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Create a new employee with a fresh id
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birthday: NaiveDate,
        position: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityKind::Employee),
            first_name: first_name.into(),
            last_name: last_name.into(),
            patronymic: None,
            birthday,
            phone: String::new(),
            position: position.into(),
            email: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Display name, the value denormalized onto project-owned records
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.last_name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn birthday() -> NaiveDate {
        NaiveDate::from_ymd_opt(1991, 4, 12).unwrap()
    }

    #[test]
    fn test_employee_roundtrip() {
        let employee = Employee::new("Nika", "Adams", birthday(), "tester");

        let yaml = serde_yml::to_string(&employee).unwrap();
        let parsed: Employee = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(employee, parsed);
    }

    #[test]
    fn test_full_name() {
        let employee = Employee::new("Nika", "Adams", birthday(), "tester");
        assert_eq!(employee.full_name(), "Nika Adams");
    }
}
