//! Flat CSV row types and their record conversions
//!
//! Rows carry every field explicitly (no serde skips) so each record always
//! occupies the same columns. Collection-valued fields are JSON strings in
//! one cell; an empty cell reads back as the empty collection.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::entity::{BugStatus, Priority, ProjectStatus, WorkStatus};
use crate::core::identity::EntityId;
use crate::entities::{
    BugReport, Documentation, Employee, EmployeeProjectLink, Event, Project, Task,
};
use crate::store::table::TableRecord;

// Encoding string collections cannot fail; an empty cell is the fallback.
fn json_cell<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn tags_from_cell(cell: &str) -> Result<BTreeSet<String>, String> {
    if cell.is_empty() {
        return Ok(BTreeSet::new());
    }
    serde_json::from_str(cell).map_err(|e| format!("bad tags cell '{}': {}", cell, e))
}

fn body_from_cell(cell: &str) -> Result<BTreeMap<String, String>, String> {
    if cell.is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(cell).map_err(|e| format!("bad body cell '{}': {}", cell, e))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub manager_id: Option<EntityId>,
    pub created_at: DateTime<Utc>,
}

impl TableRecord for Project {
    type Row = ProjectRow;

    fn to_row(&self) -> ProjectRow {
        ProjectRow {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            deadline: self.deadline,
            manager_id: self.manager_id,
            created_at: self.created_at,
        }
    }

    fn from_row(row: ProjectRow) -> Result<Self, String> {
        Ok(Project {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            deadline: row.deadline,
            manager_id: row.manager_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeRow {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub birthday: NaiveDate,
    pub phone: String,
    pub position: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl TableRecord for Employee {
    type Row = EmployeeRow;

    fn to_row(&self) -> EmployeeRow {
        EmployeeRow {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            patronymic: self.patronymic.clone(),
            birthday: self.birthday,
            phone: self.phone.clone(),
            position: self.position.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }

    fn from_row(row: EmployeeRow) -> Result<Self, String> {
        Ok(Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            patronymic: row.patronymic,
            birthday: row.birthday,
            phone: row.phone,
            position: row.position,
            email: row.email,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: EntityId,
    pub project_id: EntityId,
    pub employee_id: EntityId,
    pub employee_full_name: String,
    pub name: String,
    pub description: String,
    pub comment: Option<String>,
    pub status: WorkStatus,
    /// JSON array of strings
    pub tags: String,
    pub deadline: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl TableRecord for Task {
    type Row = TaskRow;

    fn to_row(&self) -> TaskRow {
        TaskRow {
            id: self.id,
            project_id: self.project_id,
            employee_id: self.employee_id,
            employee_full_name: self.employee_full_name.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            comment: self.comment.clone(),
            status: self.status,
            tags: json_cell(&self.tags),
            deadline: self.deadline,
            completed_at: self.completed_at,
            priority: self.priority,
            created_at: self.created_at,
        }
    }

    fn from_row(row: TaskRow) -> Result<Self, String> {
        Ok(Task {
            id: row.id,
            project_id: row.project_id,
            employee_id: row.employee_id,
            employee_full_name: row.employee_full_name,
            name: row.name,
            description: row.description,
            comment: row.comment,
            status: row.status,
            tags: tags_from_cell(&row.tags)?,
            deadline: row.deadline,
            completed_at: row.completed_at,
            priority: row.priority,
            created_at: row.created_at,
        })
    }
}

impl TableRecord for BugReport {
    type Row = BugReport;

    fn to_row(&self) -> BugReport {
        self.clone()
    }

    fn from_row(row: BugReport) -> Result<Self, String> {
        Ok(row)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventRow {
    pub id: EntityId,
    pub project_id: EntityId,
    pub employee_id: EntityId,
    pub employee_full_name: String,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TableRecord for Event {
    type Row = EventRow;

    fn to_row(&self) -> EventRow {
        EventRow {
            id: self.id,
            project_id: self.project_id,
            employee_id: self.employee_id,
            employee_full_name: self.employee_full_name.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
        }
    }

    fn from_row(row: EventRow) -> Result<Self, String> {
        Ok(Event {
            id: row.id,
            project_id: row.project_id,
            employee_id: row.employee_id,
            employee_full_name: row.employee_full_name,
            name: row.name,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentationRow {
    pub id: EntityId,
    pub project_id: EntityId,
    pub employee_id: EntityId,
    pub employee_full_name: String,
    pub name: String,
    pub description: String,
    /// JSON object of section title to text
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl TableRecord for Documentation {
    type Row = DocumentationRow;

    fn to_row(&self) -> DocumentationRow {
        DocumentationRow {
            id: self.id,
            project_id: self.project_id,
            employee_id: self.employee_id,
            employee_full_name: self.employee_full_name.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            body: json_cell(&self.body),
            created_at: self.created_at,
        }
    }

    fn from_row(row: DocumentationRow) -> Result<Self, String> {
        Ok(Documentation {
            id: row.id,
            project_id: row.project_id,
            employee_id: row.employee_id,
            employee_full_name: row.employee_full_name,
            name: row.name,
            description: row.description,
            body: body_from_cell(&row.body)?,
            created_at: row.created_at,
        })
    }
}

impl TableRecord for EmployeeProjectLink {
    type Row = EmployeeProjectLink;

    fn to_row(&self) -> EmployeeProjectLink {
        *self
    }

    fn from_row(row: EmployeeProjectLink) -> Result<Self, String> {
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cells_read_back_as_empty_collections() {
        assert!(tags_from_cell("").unwrap().is_empty());
        assert!(body_from_cell("").unwrap().is_empty());
    }

    #[test]
    fn test_bad_json_cell_is_an_error() {
        assert!(tags_from_cell("not json").is_err());
        assert!(body_from_cell("[1,2]").is_err());
    }

    #[test]
    fn test_json_cell_roundtrip() {
        let tags: BTreeSet<String> = ["a".to_string(), "b".to_string()].into();
        let cell = json_cell(&tags);
        assert_eq!(tags_from_cell(&cell).unwrap(), tags);
    }
}
