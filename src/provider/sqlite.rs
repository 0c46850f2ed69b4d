//! SQLite-backed provider
//!
//! One table per entity type plus the link table, created at open.
//! Collection-valued fields are JSON text columns; timestamps are RFC 3339
//! text. Reference checks are COUNT queries building the same violation
//! maps as the file checker.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tracing::{debug, info};

use crate::checker::{
    not_exists_message, not_linked_message, ConstraintViolations, EMPLOYEE_KEY, LINK_KEY,
    MANAGER_KEY, PROJECT_KEY,
};
use crate::core::config::StoreConfig;
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::{
    BugReport, Documentation, Employee, EmployeeProjectLink, Event, Project, ProjectScoped, Task,
};
use crate::history::{ActionStatus, ChangeType, HistoryJournal};
use crate::provider::{DataProvider, ProviderError, ProviderResult};
use crate::store::StoreError;

/// Provider persisting to a single SQLite database
pub struct SqliteDataProvider {
    conn: Connection,
    history: HistoryJournal,
}

impl SqliteDataProvider {
    /// Open (and if needed create) the database at the configured path
    pub fn open(config: &StoreConfig) -> ProviderResult<Self> {
        if let Some(parent) = config.sqlite_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&config.sqlite_path)?;
        let provider = Self {
            conn,
            history: HistoryJournal::new(&config.history_path),
        };
        provider.init_schema()?;
        Ok(provider)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                deadline TEXT,
                manager_id TEXT,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS employees (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                patronymic TEXT,
                birthday TEXT NOT NULL,
                phone TEXT NOT NULL,
                position TEXT NOT NULL,
                email TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                employee_id TEXT NOT NULL,
                employee_full_name TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                comment TEXT,
                status TEXT NOT NULL,
                tags TEXT NOT NULL,
                deadline TEXT NOT NULL,
                completed_at TEXT,
                priority TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS bug_reports (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                employee_id TEXT NOT NULL,
                employee_full_name TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                priority TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                employee_id TEXT NOT NULL,
                employee_full_name TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS documentations (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                employee_id TEXT NOT NULL,
                employee_full_name TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS employee_project (
                employee_id TEXT NOT NULL,
                project_id TEXT NOT NULL
            );
            "#,
        )
    }

    fn count(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> rusqlite::Result<bool> {
        let n: i64 = self.conn.query_row(sql, args, |row| row.get(0))?;
        Ok(n > 0)
    }

    fn project_exists(&self, id: EntityId) -> rusqlite::Result<bool> {
        self.count(
            "SELECT COUNT(*) FROM projects WHERE id = ?1",
            &[&id.to_string()],
        )
    }

    fn employee_exists(&self, id: EntityId) -> rusqlite::Result<bool> {
        self.count(
            "SELECT COUNT(*) FROM employees WHERE id = ?1",
            &[&id.to_string()],
        )
    }

    fn link_exists(&self, employee_id: EntityId, project_id: EntityId) -> rusqlite::Result<bool> {
        self.count(
            "SELECT COUNT(*) FROM employee_project WHERE employee_id = ?1 AND project_id = ?2",
            &[&employee_id.to_string(), &project_id.to_string()],
        )
    }

    fn require_project(&self, project_id: EntityId) -> ProviderResult<()> {
        if !self.project_exists(project_id)? {
            return Err(ProviderError::NotFound {
                kind: EntityKind::Project,
                id: project_id,
            });
        }
        Ok(())
    }

    /// Same violation set as the file checker's pre-create validation
    fn check_before_create<E: ProjectScoped>(&self, entity: &E) -> ProviderResult<()> {
        let employee_id = entity.employee_id();
        let project_id = entity.project_id();
        let mut violations = ConstraintViolations::new();

        if !self.employee_exists(employee_id)? {
            violations.insert(EMPLOYEE_KEY, not_exists_message("employee", employee_id));
        }
        if !self.project_exists(project_id)? {
            violations.insert(PROJECT_KEY, not_exists_message("project", project_id));
        }
        if !self.link_exists(employee_id, project_id)? {
            violations.insert(LINK_KEY, not_linked_message(employee_id, project_id));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Invalid(violations))
        }
    }

    fn journal_create<T: serde::Serialize>(
        &self,
        kind: EntityKind,
        entity: &T,
        method: &str,
        result: rusqlite::Result<usize>,
    ) -> ProviderResult<()> {
        match result {
            Ok(_) => {
                self.record_history(
                    kind.entity_name(),
                    entity,
                    method,
                    ActionStatus::Success,
                    ChangeType::Create,
                );
                debug!(method, "row inserted");
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    kind.entity_name(),
                    entity,
                    method,
                    ActionStatus::Fault,
                    ChangeType::Create,
                );
                Err(e.into())
            }
        }
    }
}

// Column decoding helpers shared by the row mappers.

fn text_err(
    idx: usize,
    e: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
}

fn id_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<EntityId> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| text_err(idx, e))
}

fn opt_id_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<EntityId>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| s.parse().map_err(|e| text_err(idx, e))).transpose()
}

fn dt_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| text_err(idx, e))
}

fn opt_dt_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| text_err(idx, e))
    })
    .transpose()
}

fn date_col(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| text_err(idx, e))
}

fn parse_col<T: std::str::FromStr<Err = String>>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    s.parse().map_err(|e: String| text_err(idx, e))
}

fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: id_col(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: parse_col(row, 3)?,
        deadline: opt_dt_col(row, 4)?,
        manager_id: opt_id_col(row, 5)?,
        created_at: dt_col(row, 6)?,
    })
}

fn employee_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: id_col(row, 0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        patronymic: row.get(3)?,
        birthday: date_col(row, 4)?,
        phone: row.get(5)?,
        position: row.get(6)?,
        email: row.get(7)?,
        created_at: dt_col(row, 8)?,
    })
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let tags: String = row.get(8)?;
    let tags: BTreeSet<String> =
        serde_json::from_str(&tags).map_err(|e| text_err(8, e))?;

    Ok(Task {
        id: id_col(row, 0)?,
        project_id: id_col(row, 1)?,
        employee_id: id_col(row, 2)?,
        employee_full_name: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        comment: row.get(6)?,
        status: parse_col(row, 7)?,
        tags,
        deadline: dt_col(row, 9)?,
        completed_at: opt_dt_col(row, 10)?,
        priority: parse_col(row, 11)?,
        created_at: dt_col(row, 12)?,
    })
}

fn bug_report_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BugReport> {
    Ok(BugReport {
        id: id_col(row, 0)?,
        project_id: id_col(row, 1)?,
        employee_id: id_col(row, 2)?,
        employee_full_name: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        status: parse_col(row, 6)?,
        priority: parse_col(row, 7)?,
        created_at: dt_col(row, 8)?,
    })
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: id_col(row, 0)?,
        project_id: id_col(row, 1)?,
        employee_id: id_col(row, 2)?,
        employee_full_name: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        start_date: dt_col(row, 6)?,
        end_date: opt_dt_col(row, 7)?,
        created_at: dt_col(row, 8)?,
    })
}

fn documentation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Documentation> {
    let body: String = row.get(6)?;
    let body: BTreeMap<String, String> =
        serde_json::from_str(&body).map_err(|e| text_err(6, e))?;

    Ok(Documentation {
        id: id_col(row, 0)?,
        project_id: id_col(row, 1)?,
        employee_id: id_col(row, 2)?,
        employee_full_name: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        body,
        created_at: dt_col(row, 7)?,
    })
}

fn opt_dt_sql(value: &Option<DateTime<Utc>>) -> Option<String> {
    value.map(|dt| dt.to_rfc3339())
}

impl SqliteDataProvider {
    fn select_one<T>(
        &self,
        sql: &str,
        id: EntityId,
        kind: EntityKind,
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> ProviderResult<T> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query_map(params![id.to_string()], map)?;
        match rows.next() {
            Some(row) => Ok(row?),
            None => Err(ProviderError::NotFound { kind, id }),
        }
    }

    fn select_scoped<T>(
        &self,
        sql: &str,
        project_id: EntityId,
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> ProviderResult<Vec<T>> {
        self.require_project(project_id)?;
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![project_id.to_string()], map)?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    fn delete_one<T: serde::Serialize>(
        &self,
        select_sql: &str,
        delete_sql: &str,
        id: EntityId,
        kind: EntityKind,
        map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
        method: &str,
    ) -> ProviderResult<()> {
        let removed = self.select_one(select_sql, id, kind, map)?;
        let result = self.conn.execute(delete_sql, params![id.to_string()]);

        match result {
            Ok(_) => {
                self.record_history(
                    kind.entity_name(),
                    &removed,
                    method,
                    ActionStatus::Success,
                    ChangeType::Delete,
                );
                info!(method, %id, "row deleted");
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    kind.entity_name(),
                    &removed,
                    method,
                    ActionStatus::Fault,
                    ChangeType::Delete,
                );
                Err(e.into())
            }
        }
    }
}

impl DataProvider for SqliteDataProvider {
    fn history(&self) -> &HistoryJournal {
        &self.history
    }

    fn create_project(&self, project: &Project) -> ProviderResult<()> {
        if let Some(manager_id) = project.manager_id {
            if !self.employee_exists(manager_id)? {
                let mut violations = ConstraintViolations::new();
                violations.insert(MANAGER_KEY, not_exists_message("employee", manager_id));
                return Err(ProviderError::Invalid(violations));
            }
        }

        let result = self.conn.execute(
            "INSERT INTO projects (id, name, description, status, deadline, manager_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                project.id.to_string(),
                project.name,
                project.description,
                project.status.to_string(),
                opt_dt_sql(&project.deadline),
                project.manager_id.map(|id| id.to_string()),
                project.created_at.to_rfc3339(),
            ],
        );
        self.journal_create(EntityKind::Project, project, "create_project", result)
    }

    fn create_employee(&self, employee: &Employee) -> ProviderResult<()> {
        let result = self.conn.execute(
            "INSERT INTO employees (id, first_name, last_name, patronymic, birthday, phone, position, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                employee.id.to_string(),
                employee.first_name,
                employee.last_name,
                employee.patronymic,
                employee.birthday.to_string(),
                employee.phone,
                employee.position,
                employee.email,
                employee.created_at.to_rfc3339(),
            ],
        );
        self.journal_create(EntityKind::Employee, employee, "create_employee", result)
    }

    fn create_task(&self, task: &Task) -> ProviderResult<()> {
        self.check_before_create(task)?;

        let tags = serde_json::to_string(&task.tags).unwrap_or_default();
        let result = self.conn.execute(
            "INSERT INTO tasks (id, project_id, employee_id, employee_full_name, name, description,
                                comment, status, tags, deadline, completed_at, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.employee_id.to_string(),
                task.employee_full_name,
                task.name,
                task.description,
                task.comment,
                task.status.to_string(),
                tags,
                task.deadline.to_rfc3339(),
                opt_dt_sql(&task.completed_at),
                task.priority.to_string(),
                task.created_at.to_rfc3339(),
            ],
        );
        self.journal_create(EntityKind::Task, task, "create_task", result)
    }

    fn create_bug_report(&self, bug_report: &BugReport) -> ProviderResult<()> {
        self.check_before_create(bug_report)?;

        let result = self.conn.execute(
            "INSERT INTO bug_reports (id, project_id, employee_id, employee_full_name, name,
                                      description, status, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                bug_report.id.to_string(),
                bug_report.project_id.to_string(),
                bug_report.employee_id.to_string(),
                bug_report.employee_full_name,
                bug_report.name,
                bug_report.description,
                bug_report.status.to_string(),
                bug_report.priority.to_string(),
                bug_report.created_at.to_rfc3339(),
            ],
        );
        self.journal_create(EntityKind::BugReport, bug_report, "create_bug_report", result)
    }

    fn create_event(&self, event: &Event) -> ProviderResult<()> {
        self.check_before_create(event)?;

        let result = self.conn.execute(
            "INSERT INTO events (id, project_id, employee_id, employee_full_name, name,
                                 description, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                event.id.to_string(),
                event.project_id.to_string(),
                event.employee_id.to_string(),
                event.employee_full_name,
                event.name,
                event.description,
                event.start_date.to_rfc3339(),
                opt_dt_sql(&event.end_date),
                event.created_at.to_rfc3339(),
            ],
        );
        self.journal_create(EntityKind::Event, event, "create_event", result)
    }

    fn create_documentation(&self, documentation: &Documentation) -> ProviderResult<()> {
        self.check_before_create(documentation)?;

        let body = serde_json::to_string(&documentation.body).unwrap_or_default();
        let result = self.conn.execute(
            "INSERT INTO documentations (id, project_id, employee_id, employee_full_name, name,
                                         description, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                documentation.id.to_string(),
                documentation.project_id.to_string(),
                documentation.employee_id.to_string(),
                documentation.employee_full_name,
                documentation.name,
                documentation.description,
                body,
                documentation.created_at.to_rfc3339(),
            ],
        );
        self.journal_create(
            EntityKind::Documentation,
            documentation,
            "create_documentation",
            result,
        )
    }

    fn get_project_by_id(&self, id: EntityId) -> ProviderResult<Project> {
        self.select_one(
            "SELECT id, name, description, status, deadline, manager_id, created_at
             FROM projects WHERE id = ?1",
            id,
            EntityKind::Project,
            project_from_row,
        )
    }

    fn get_employee_by_id(&self, id: EntityId) -> ProviderResult<Employee> {
        self.select_one(
            "SELECT id, first_name, last_name, patronymic, birthday, phone, position, email, created_at
             FROM employees WHERE id = ?1",
            id,
            EntityKind::Employee,
            employee_from_row,
        )
    }

    fn get_task_by_id(&self, id: EntityId) -> ProviderResult<Task> {
        self.select_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, comment,
                    status, tags, deadline, completed_at, priority, created_at
             FROM tasks WHERE id = ?1",
            id,
            EntityKind::Task,
            task_from_row,
        )
    }

    fn get_bug_report_by_id(&self, id: EntityId) -> ProviderResult<BugReport> {
        self.select_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, status,
                    priority, created_at
             FROM bug_reports WHERE id = ?1",
            id,
            EntityKind::BugReport,
            bug_report_from_row,
        )
    }

    fn get_event_by_id(&self, id: EntityId) -> ProviderResult<Event> {
        self.select_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description,
                    start_date, end_date, created_at
             FROM events WHERE id = ?1",
            id,
            EntityKind::Event,
            event_from_row,
        )
    }

    fn get_documentation_by_id(&self, id: EntityId) -> ProviderResult<Documentation> {
        self.select_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, body,
                    created_at
             FROM documentations WHERE id = ?1",
            id,
            EntityKind::Documentation,
            documentation_from_row,
        )
    }

    fn get_tasks_by_project_id(&self, project_id: EntityId) -> ProviderResult<Vec<Task>> {
        self.select_scoped(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, comment,
                    status, tags, deadline, completed_at, priority, created_at
             FROM tasks WHERE project_id = ?1",
            project_id,
            task_from_row,
        )
    }

    fn get_tasks_by_employee_id(&self, employee_id: EntityId) -> ProviderResult<Vec<Task>> {
        if !self.employee_exists(employee_id)? {
            return Err(ProviderError::NotFound {
                kind: EntityKind::Employee,
                id: employee_id,
            });
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, comment,
                    status, tags, deadline, completed_at, priority, created_at
             FROM tasks WHERE employee_id = ?1",
        )?;
        let rows = stmt.query_map(params![employee_id.to_string()], task_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<Task>>>()?)
    }

    fn get_tasks_by_tags(
        &self,
        tags: &[String],
        project_id: EntityId,
    ) -> ProviderResult<Vec<Task>> {
        // Tags live in a JSON cell, so the intersection happens here rather
        // than in SQL.
        let tasks = self.get_tasks_by_project_id(project_id)?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.tags.iter().any(|tag| tags.contains(tag)))
            .collect())
    }

    fn get_bug_reports_by_project_id(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<Vec<BugReport>> {
        self.select_scoped(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, status,
                    priority, created_at
             FROM bug_reports WHERE project_id = ?1",
            project_id,
            bug_report_from_row,
        )
    }

    fn get_events_by_project_id(&self, project_id: EntityId) -> ProviderResult<Vec<Event>> {
        self.select_scoped(
            "SELECT id, project_id, employee_id, employee_full_name, name, description,
                    start_date, end_date, created_at
             FROM events WHERE project_id = ?1",
            project_id,
            event_from_row,
        )
    }

    fn get_documentations_by_project_id(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<Vec<Documentation>> {
        self.select_scoped(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, body,
                    created_at
             FROM documentations WHERE project_id = ?1",
            project_id,
            documentation_from_row,
        )
    }

    fn get_project_team(&self, project_id: EntityId) -> ProviderResult<Vec<Employee>> {
        self.select_scoped(
            "SELECT e.id, e.first_name, e.last_name, e.patronymic, e.birthday, e.phone,
                    e.position, e.email, e.created_at
             FROM employees e
             JOIN employee_project l ON l.employee_id = e.id
             WHERE l.project_id = ?1",
            project_id,
            employee_from_row,
        )
    }

    fn delete_project(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_one(
            "SELECT id, name, description, status, deadline, manager_id, created_at
             FROM projects WHERE id = ?1",
            "DELETE FROM projects WHERE id = ?1",
            id,
            EntityKind::Project,
            project_from_row,
            "delete_project",
        )
    }

    fn delete_employee(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_one(
            "SELECT id, first_name, last_name, patronymic, birthday, phone, position, email, created_at
             FROM employees WHERE id = ?1",
            "DELETE FROM employees WHERE id = ?1",
            id,
            EntityKind::Employee,
            employee_from_row,
            "delete_employee",
        )
    }

    fn delete_task(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, comment,
                    status, tags, deadline, completed_at, priority, created_at
             FROM tasks WHERE id = ?1",
            "DELETE FROM tasks WHERE id = ?1",
            id,
            EntityKind::Task,
            task_from_row,
            "delete_task",
        )
    }

    fn delete_bug_report(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, status,
                    priority, created_at
             FROM bug_reports WHERE id = ?1",
            "DELETE FROM bug_reports WHERE id = ?1",
            id,
            EntityKind::BugReport,
            bug_report_from_row,
            "delete_bug_report",
        )
    }

    fn delete_event(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description,
                    start_date, end_date, created_at
             FROM events WHERE id = ?1",
            "DELETE FROM events WHERE id = ?1",
            id,
            EntityKind::Event,
            event_from_row,
            "delete_event",
        )
    }

    fn delete_documentation(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_one(
            "SELECT id, project_id, employee_id, employee_full_name, name, description, body,
                    created_at
             FROM documentations WHERE id = ?1",
            "DELETE FROM documentations WHERE id = ?1",
            id,
            EntityKind::Documentation,
            documentation_from_row,
            "delete_documentation",
        )
    }

    fn bind_employee_to_project(
        &self,
        employee_id: EntityId,
        project_id: EntityId,
    ) -> ProviderResult<()> {
        let mut violations = ConstraintViolations::new();
        if !self.employee_exists(employee_id)? {
            violations.insert(EMPLOYEE_KEY, not_exists_message("employee", employee_id));
        }
        if !self.project_exists(project_id)? {
            violations.insert(PROJECT_KEY, not_exists_message("project", project_id));
        }
        if !violations.is_empty() {
            return Err(ProviderError::Invalid(violations));
        }

        let link = EmployeeProjectLink::new(employee_id, project_id);
        let result = self.conn.execute(
            "INSERT INTO employee_project (employee_id, project_id) VALUES (?1, ?2)",
            params![employee_id.to_string(), project_id.to_string()],
        );

        match result {
            Ok(_) => {
                self.record_history(
                    "employee_project_link",
                    &link,
                    "bind_employee_to_project",
                    ActionStatus::Success,
                    ChangeType::Create,
                );
                debug!(%employee_id, %project_id, "employee linked to project");
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    "employee_project_link",
                    &link,
                    "bind_employee_to_project",
                    ActionStatus::Fault,
                    ChangeType::Create,
                );
                Err(e.into())
            }
        }
    }

    fn bind_project_manager(
        &self,
        manager_id: EntityId,
        project_id: EntityId,
    ) -> ProviderResult<()> {
        let manager = self.get_employee_by_id(manager_id)?;
        self.require_project(project_id)?;

        if !self.link_exists(manager.id, project_id)? {
            let mut violations = ConstraintViolations::new();
            violations.insert(LINK_KEY, not_linked_message(manager.id, project_id));
            return Err(ProviderError::Invalid(violations));
        }

        self.conn.execute(
            "UPDATE projects SET manager_id = ?1 WHERE id = ?2",
            params![manager.id.to_string(), project_id.to_string()],
        )?;

        let updated = self.get_project_by_id(project_id)?;
        self.record_history(
            EntityKind::Project.entity_name(),
            &updated,
            "bind_project_manager",
            ActionStatus::Success,
            ChangeType::Update,
        );
        Ok(())
    }

    fn complete_task(&self, task_id: EntityId) -> ProviderResult<()> {
        let mut task = self.get_task_by_id(task_id)?;
        task.complete();

        self.conn.execute(
            "UPDATE tasks SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![
                task.status.to_string(),
                opt_dt_sql(&task.completed_at),
                task_id.to_string(),
            ],
        )?;

        self.record_history(
            EntityKind::Task.entity_name(),
            &task,
            "complete_task",
            ActionStatus::Success,
            ChangeType::Update,
        );
        info!(%task_id, "task completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn provider() -> (TempDir, SqliteDataProvider) {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path());
        let provider = SqliteDataProvider::open(&config).unwrap();
        (dir, provider)
    }

    fn employee() -> Employee {
        Employee::new(
            "Nika",
            "Adams",
            NaiveDate::from_ymd_opt(1991, 4, 12).unwrap(),
            "tester",
        )
    }

    #[test]
    fn test_task_roundtrip_through_sql() {
        let (_dir, provider) = provider();

        let project = Project::new("Orbital", "tracker");
        let member = employee();
        provider.create_project(&project).unwrap();
        provider.create_employee(&member).unwrap();
        provider
            .bind_employee_to_project(member.id, project.id)
            .unwrap();

        let task = Task::new(
            project.id,
            member.id,
            member.full_name(),
            "wire the codec",
            Utc::now() + Duration::days(7),
        )
        .with_tags(["storage", "codec"]);
        provider.create_task(&task).unwrap();

        let back = provider.get_task_by_id(task.id).unwrap();
        assert_eq!(back.name, task.name);
        assert_eq!(back.tags, task.tags);
        assert!(back.completed_at.is_none());
    }

    #[test]
    fn test_create_task_against_missing_project_is_invalid() {
        let (_dir, provider) = provider();

        let task = Task::new(
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
            "ghost",
            "orphan",
            Utc::now(),
        );

        let err = provider.create_task(&task).unwrap_err();
        assert!(matches!(err, ProviderError::Invalid(_)));
        // nothing persisted
        assert!(provider.get_task_by_id(task.id).is_err());
    }

    #[test]
    fn test_delete_missing_row_is_not_found() {
        let (_dir, provider) = provider();
        let err = provider
            .delete_event(EntityId::new(EntityKind::Event))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
