//! Pre-write consistency checks
//!
//! File backends have no constraint engine, so every write that references
//! other entities is preceded by read-only full-file scans. Checks collect
//! every violated reference before returning, so a caller sees the complete
//! violation set rather than only the first.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use thiserror::Error;
use tracing::debug;

use crate::core::identity::EntityId;
use crate::entities::{Employee, EmployeeProjectLink, Project, ProjectScoped, Task};
use crate::store::{record_exists, FileCodec, StoreError, StorePaths};

/// Violation map keys, one per checked reference
pub const EMPLOYEE_KEY: &str = "employee";
pub const PROJECT_KEY: &str = "project";
pub const TASK_KEY: &str = "task";
pub const LINK_KEY: &str = "link";
pub const MANAGER_KEY: &str = "manager";

pub fn not_exists_message(label: &str, id: EntityId) -> String {
    format!("{} {} does not exist", label, id)
}

pub fn not_linked_message(employee_id: EntityId, project_id: EntityId) -> String {
    format!(
        "employee {} is not linked to project {}",
        employee_id, project_id
    )
}

/// Violated references collected by one check, keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintViolations(BTreeMap<String, String>);

impl ConstraintViolations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, message: String) {
        self.0.insert(key.to_string(), message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Ok when nothing was violated
    pub fn into_result(self) -> Result<(), CheckError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CheckError::Violations(self))
        }
    }
}

impl fmt::Display for ConstraintViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", key, message)?;
            first = false;
        }
        Ok(())
    }
}

/// A failed consistency check
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("constraint violations: {0}")]
    Violations(ConstraintViolations),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-only reference validator over one file store
///
/// Performs its own full-file scans on every call; nothing is cached.
pub struct ConsistencyChecker<'a, C: FileCodec> {
    paths: &'a StorePaths,
    _codec: PhantomData<C>,
}

impl<'a, C: FileCodec> ConsistencyChecker<'a, C> {
    pub fn new(paths: &'a StorePaths) -> Self {
        Self {
            paths,
            _codec: PhantomData,
        }
    }

    pub fn project_exists(&self, project_id: EntityId) -> Result<bool, StoreError> {
        record_exists::<C, Project>(&self.paths.projects, project_id)
    }

    pub fn employee_exists(&self, employee_id: EntityId) -> Result<bool, StoreError> {
        record_exists::<C, Employee>(&self.paths.employees, employee_id)
    }

    pub fn task_exists(&self, task_id: EntityId) -> Result<bool, StoreError> {
        record_exists::<C, Task>(&self.paths.tasks, task_id)
    }

    pub fn link_exists(
        &self,
        employee_id: EntityId,
        project_id: EntityId,
    ) -> Result<bool, StoreError> {
        let links: Vec<EmployeeProjectLink> = C::read_all(&self.paths.links)?;
        Ok(links
            .iter()
            .any(|l| l.employee_id == employee_id && l.project_id == project_id))
    }

    /// Both referenced entities must exist
    pub fn check_project_and_employee(
        &self,
        employee_id: EntityId,
        project_id: EntityId,
    ) -> Result<(), CheckError> {
        let mut violations = ConstraintViolations::new();

        if !self.employee_exists(employee_id)? {
            violations.insert(EMPLOYEE_KEY, not_exists_message("employee", employee_id));
        }
        if !self.project_exists(project_id)? {
            violations.insert(PROJECT_KEY, not_exists_message("project", project_id));
        }

        violations.into_result()
    }

    /// The referenced project must exist
    pub fn check_project_existence(&self, project_id: EntityId) -> Result<(), CheckError> {
        let mut violations = ConstraintViolations::new();

        if !self.project_exists(project_id)? {
            violations.insert(PROJECT_KEY, not_exists_message("project", project_id));
        }

        violations.into_result()
    }

    /// Validation preceding every project-owned create: the assignee and the
    /// project must exist and the assignee must be linked to the project
    pub fn check_before_create<E: ProjectScoped>(&self, entity: &E) -> Result<(), CheckError> {
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

        debug!(violations = violations.len(), "checked references before create");
        violations.into_result()
    }

    /// All three referenced entities plus the employee-project link,
    /// collected without short-circuiting
    pub fn check_before_bind_task_executor(
        &self,
        executor_id: EntityId,
        task_id: EntityId,
        project_id: EntityId,
    ) -> Result<(), CheckError> {
        let mut violations = ConstraintViolations::new();

        if !self.task_exists(task_id)? {
            violations.insert(TASK_KEY, not_exists_message("task", task_id));
        }
        if !self.employee_exists(executor_id)? {
            violations.insert(EMPLOYEE_KEY, not_exists_message("employee", executor_id));
        }
        if !self.project_exists(project_id)? {
            violations.insert(PROJECT_KEY, not_exists_message("project", project_id));
        }
        if !self.link_exists(executor_id, project_id)? {
            violations.insert(LINK_KEY, not_linked_message(executor_id, project_id));
        }

        violations.into_result()
    }

    /// The employee must exist and be linked to the project
    pub fn check_employee_belongs_to_project(
        &self,
        employee_id: EntityId,
        project_id: EntityId,
    ) -> Result<(), CheckError> {
        let mut violations = ConstraintViolations::new();

        if !self.employee_exists(employee_id)? {
            violations.insert(EMPLOYEE_KEY, not_exists_message("employee", employee_id));
        }
        if !self.link_exists(employee_id, project_id)? {
            violations.insert(LINK_KEY, not_linked_message(employee_id, project_id));
        }

        violations.into_result()
    }

    /// A preset manager reference must name an existing employee
    pub fn check_manager_constraint(&self, project: &Project) -> Result<(), CheckError> {
        let mut violations = ConstraintViolations::new();

        if let Some(manager_id) = project.manager_id {
            if !self.employee_exists(manager_id)? {
                violations.insert(MANAGER_KEY, not_exists_message("employee", manager_id));
            }
        }

        violations.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityKind;
    use crate::entities::Employee;
    use crate::store::{append_record, CsvCodec, YamlCodec};
    use chrono::{NaiveDate, Utc};
    use std::path::Path;
    use tempfile::TempDir;

    fn paths_for<C: FileCodec>(dir: &Path) -> StorePaths {
        StorePaths::resolve(dir, C::EXTENSION)
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
    fn test_check_collects_every_violation() {
        let dir = TempDir::new().unwrap();
        let paths = paths_for::<YamlCodec>(dir.path());
        let checker = ConsistencyChecker::<YamlCodec>::new(&paths);

        let task = Task::new(
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
            "ghost",
            "orphan task",
            Utc::now(),
        );

        let err = checker.check_before_create(&task).unwrap_err();
        match err {
            CheckError::Violations(violations) => {
                assert_eq!(violations.len(), 3);
                assert!(violations.get(EMPLOYEE_KEY).is_some());
                assert!(violations.get(PROJECT_KEY).is_some());
                assert!(violations.get(LINK_KEY).is_some());
            }
            other => panic!("expected violations, got {:?}", other),
        }
    }

    #[test]
    fn test_check_passes_when_references_resolve() {
        let dir = TempDir::new().unwrap();
        let paths = paths_for::<CsvCodec>(dir.path());
        let checker = ConsistencyChecker::<CsvCodec>::new(&paths);

        let project = Project::new("Orbital", "");
        let employee = employee();
        append_record::<CsvCodec, _>(&paths.projects, &project).unwrap();
        append_record::<CsvCodec, _>(&paths.employees, &employee).unwrap();
        append_record::<CsvCodec, _>(
            &paths.links,
            &EmployeeProjectLink::new(employee.id, project.id),
        )
        .unwrap();

        let task = Task::new(
            project.id,
            employee.id,
            employee.full_name(),
            "linked task",
            Utc::now(),
        );

        assert!(checker.check_before_create(&task).is_ok());
        assert!(checker
            .check_employee_belongs_to_project(employee.id, project.id)
            .is_ok());
    }

    #[test]
    fn test_bind_task_executor_check_collects_all_four() {
        let dir = TempDir::new().unwrap();
        let paths = paths_for::<YamlCodec>(dir.path());
        let checker = ConsistencyChecker::<YamlCodec>::new(&paths);

        let err = checker
            .check_before_bind_task_executor(
                EntityId::new(EntityKind::Employee),
                EntityId::new(EntityKind::Task),
                EntityId::new(EntityKind::Project),
            )
            .unwrap_err();

        match err {
            CheckError::Violations(violations) => assert_eq!(violations.len(), 4),
            other => panic!("expected violations, got {:?}", other),
        }
    }

    #[test]
    fn test_manager_constraint() {
        let dir = TempDir::new().unwrap();
        let paths = paths_for::<YamlCodec>(dir.path());
        let checker = ConsistencyChecker::<YamlCodec>::new(&paths);

        let mut project = Project::new("Orbital", "");
        assert!(checker.check_manager_constraint(&project).is_ok());

        project.manager_id = Some(EntityId::new(EntityKind::Employee));
        assert!(checker.check_manager_constraint(&project).is_err());
    }
}
