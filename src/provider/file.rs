//! File-backed provider, generic over the codec
//!
//! One implementation serves both file formats: `FileDataProvider<YamlCodec>`
//! and `FileDataProvider<CsvCodec>`. Deletion is load-filter-rewrite over
//! the whole file; every operation re-reads its file on each call.

use std::fs;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, error, info};

use crate::checker::ConsistencyChecker;
use crate::core::config::StoreConfig;
use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::{
    BugReport, Documentation, Employee, EmployeeProjectLink, Event, Project, ProjectScoped, Task,
};
use crate::history::{ActionStatus, ChangeType, HistoryJournal};
use crate::provider::{DataProvider, ProviderError, ProviderResult};
use crate::store::{
    append_record, CsvCodec, FileCodec, StoreError, StorePaths, StoreRecord, YamlCodec,
};

/// Provider persisting to one file per entity type
pub struct FileDataProvider<C: FileCodec> {
    paths: StorePaths,
    history: HistoryJournal,
    _codec: PhantomData<C>,
}

/// YAML document backend
pub type YamlDataProvider = FileDataProvider<YamlCodec>;

/// CSV table backend
pub type CsvDataProvider = FileDataProvider<CsvCodec>;

impl<C: FileCodec> FileDataProvider<C> {
    /// Open a provider over the configured data directory, creating the
    /// directory if needed
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.data_dir).map_err(|source| StoreError::Io {
            path: config.data_dir.clone(),
            source,
        })?;

        Ok(Self {
            paths: StorePaths::resolve(&config.data_dir, C::EXTENSION),
            history: HistoryJournal::new(&config.history_path),
            _codec: PhantomData,
        })
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    fn checker(&self) -> ConsistencyChecker<'_, C> {
        ConsistencyChecker::new(&self.paths)
    }

    fn find_by_id<T: StoreRecord + Record>(&self, path: &Path, id: EntityId) -> ProviderResult<T> {
        C::read_all::<T>(path)?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or(ProviderError::NotFound { kind: T::KIND, id })
    }

    fn require_project(&self, project_id: EntityId) -> ProviderResult<()> {
        if !self.checker().project_exists(project_id)? {
            return Err(ProviderError::NotFound {
                kind: EntityKind::Project,
                id: project_id,
            });
        }
        Ok(())
    }

    /// Append a validated record and journal the outcome
    fn persist_new<T: StoreRecord + Record>(
        &self,
        path: &Path,
        entity: &T,
        method: &str,
    ) -> ProviderResult<()> {
        match append_record::<C, T>(path, entity) {
            Ok(()) => {
                self.record_history(
                    T::KIND.entity_name(),
                    entity,
                    method,
                    ActionStatus::Success,
                    ChangeType::Create,
                );
                debug!(method, id = %entity.id(), "record appended");
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    T::KIND.entity_name(),
                    entity,
                    method,
                    ActionStatus::Fault,
                    ChangeType::Create,
                );
                error!(method, error = %e, "record append failed");
                Err(e.into())
            }
        }
    }

    fn delete_record<T: StoreRecord + Record>(
        &self,
        path: &Path,
        id: EntityId,
        method: &str,
    ) -> ProviderResult<()> {
        let mut records: Vec<T> = C::read_all(path)?;
        let Some(index) = records.iter().position(|r| r.id() == id) else {
            return Err(ProviderError::NotFound { kind: T::KIND, id });
        };

        let removed = records.remove(index);
        match C::write_all(path, &records) {
            Ok(()) => {
                self.record_history(
                    T::KIND.entity_name(),
                    &removed,
                    method,
                    ActionStatus::Success,
                    ChangeType::Delete,
                );
                info!(method, %id, "record deleted");
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    T::KIND.entity_name(),
                    &removed,
                    method,
                    ActionStatus::Fault,
                    ChangeType::Delete,
                );
                error!(method, error = %e, "record delete failed");
                Err(e.into())
            }
        }
    }

    fn scoped_by_project<T: StoreRecord + ProjectScoped>(
        &self,
        path: &Path,
        project_id: EntityId,
    ) -> ProviderResult<Vec<T>> {
        self.require_project(project_id)?;

        Ok(C::read_all::<T>(path)?
            .into_iter()
            .filter(|e| e.project_id() == project_id)
            .collect())
    }

    fn create_scoped<T: StoreRecord + Record + ProjectScoped>(
        &self,
        path: &Path,
        entity: &T,
        method: &str,
    ) -> ProviderResult<()> {
        self.checker().check_before_create(entity)?;
        self.persist_new(path, entity, method)
    }
}

impl<C: FileCodec> DataProvider for FileDataProvider<C> {
    fn history(&self) -> &HistoryJournal {
        &self.history
    }

    fn create_project(&self, project: &Project) -> ProviderResult<()> {
        self.checker().check_manager_constraint(project)?;
        self.persist_new(&self.paths.projects, project, "create_project")
    }

    fn create_employee(&self, employee: &Employee) -> ProviderResult<()> {
        self.persist_new(&self.paths.employees, employee, "create_employee")
    }

    fn create_task(&self, task: &Task) -> ProviderResult<()> {
        self.create_scoped(&self.paths.tasks, task, "create_task")
    }

    fn create_bug_report(&self, bug_report: &BugReport) -> ProviderResult<()> {
        self.create_scoped(&self.paths.bug_reports, bug_report, "create_bug_report")
    }

    fn create_event(&self, event: &Event) -> ProviderResult<()> {
        self.create_scoped(&self.paths.events, event, "create_event")
    }

    fn create_documentation(&self, documentation: &Documentation) -> ProviderResult<()> {
        self.create_scoped(
            &self.paths.documentations,
            documentation,
            "create_documentation",
        )
    }

    fn get_project_by_id(&self, id: EntityId) -> ProviderResult<Project> {
        self.find_by_id(&self.paths.projects, id)
    }

    fn get_employee_by_id(&self, id: EntityId) -> ProviderResult<Employee> {
        self.find_by_id(&self.paths.employees, id)
    }

    fn get_task_by_id(&self, id: EntityId) -> ProviderResult<Task> {
        self.find_by_id(&self.paths.tasks, id)
    }

    fn get_bug_report_by_id(&self, id: EntityId) -> ProviderResult<BugReport> {
        self.find_by_id(&self.paths.bug_reports, id)
    }

    fn get_event_by_id(&self, id: EntityId) -> ProviderResult<Event> {
        self.find_by_id(&self.paths.events, id)
    }

    fn get_documentation_by_id(&self, id: EntityId) -> ProviderResult<Documentation> {
        self.find_by_id(&self.paths.documentations, id)
    }

    fn get_tasks_by_project_id(&self, project_id: EntityId) -> ProviderResult<Vec<Task>> {
        self.scoped_by_project(&self.paths.tasks, project_id)
    }

    fn get_tasks_by_employee_id(&self, employee_id: EntityId) -> ProviderResult<Vec<Task>> {
        if !self.checker().employee_exists(employee_id)? {
            return Err(ProviderError::NotFound {
                kind: EntityKind::Employee,
                id: employee_id,
            });
        }

        Ok(C::read_all::<Task>(&self.paths.tasks)?
            .into_iter()
            .filter(|t| t.employee_id == employee_id)
            .collect())
    }

    fn get_tasks_by_tags(
        &self,
        tags: &[String],
        project_id: EntityId,
    ) -> ProviderResult<Vec<Task>> {
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
        self.scoped_by_project(&self.paths.bug_reports, project_id)
    }

    fn get_events_by_project_id(&self, project_id: EntityId) -> ProviderResult<Vec<Event>> {
        self.scoped_by_project(&self.paths.events, project_id)
    }

    fn get_documentations_by_project_id(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<Vec<Documentation>> {
        self.scoped_by_project(&self.paths.documentations, project_id)
    }

    fn get_project_team(&self, project_id: EntityId) -> ProviderResult<Vec<Employee>> {
        self.require_project(project_id)?;

        let links: Vec<EmployeeProjectLink> = C::read_all(&self.paths.links)?;
        let employees: Vec<Employee> = C::read_all(&self.paths.employees)?;

        Ok(links
            .into_iter()
            .filter(|l| l.project_id == project_id)
            .filter_map(|l| employees.iter().find(|e| e.id == l.employee_id).cloned())
            .collect())
    }

    fn delete_project(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_record::<Project>(&self.paths.projects, id, "delete_project")
    }

    fn delete_employee(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_record::<Employee>(&self.paths.employees, id, "delete_employee")
    }

    fn delete_task(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_record::<Task>(&self.paths.tasks, id, "delete_task")
    }

    fn delete_bug_report(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_record::<BugReport>(&self.paths.bug_reports, id, "delete_bug_report")
    }

    fn delete_event(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_record::<Event>(&self.paths.events, id, "delete_event")
    }

    fn delete_documentation(&self, id: EntityId) -> ProviderResult<()> {
        self.delete_record::<Documentation>(&self.paths.documentations, id, "delete_documentation")
    }

    fn bind_employee_to_project(
        &self,
        employee_id: EntityId,
        project_id: EntityId,
    ) -> ProviderResult<()> {
        self.checker()
            .check_project_and_employee(employee_id, project_id)?;

        let link = EmployeeProjectLink::new(employee_id, project_id);
        match append_record::<C, EmployeeProjectLink>(&self.paths.links, &link) {
            Ok(()) => {
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
        self.checker()
            .check_employee_belongs_to_project(manager.id, project_id)?;

        let mut projects: Vec<Project> = C::read_all(&self.paths.projects)?;
        let Some(project) = projects.iter_mut().find(|p| p.id == project_id) else {
            return Err(ProviderError::NotFound {
                kind: EntityKind::Project,
                id: project_id,
            });
        };

        project.manager_id = Some(manager.id);
        let snapshot = project.clone();
        match C::write_all(&self.paths.projects, &projects) {
            Ok(()) => {
                self.record_history(
                    EntityKind::Project.entity_name(),
                    &snapshot,
                    "bind_project_manager",
                    ActionStatus::Success,
                    ChangeType::Update,
                );
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    EntityKind::Project.entity_name(),
                    &snapshot,
                    "bind_project_manager",
                    ActionStatus::Fault,
                    ChangeType::Update,
                );
                Err(e.into())
            }
        }
    }

    fn complete_task(&self, task_id: EntityId) -> ProviderResult<()> {
        let mut tasks: Vec<Task> = C::read_all(&self.paths.tasks)?;
        let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
            return Err(ProviderError::NotFound {
                kind: EntityKind::Task,
                id: task_id,
            });
        };

        task.complete();
        let snapshot = task.clone();
        match C::write_all(&self.paths.tasks, &tasks) {
            Ok(()) => {
                self.record_history(
                    EntityKind::Task.entity_name(),
                    &snapshot,
                    "complete_task",
                    ActionStatus::Success,
                    ChangeType::Update,
                );
                info!(%task_id, "task completed");
                Ok(())
            }
            Err(e) => {
                self.record_history(
                    EntityKind::Task.entity_name(),
                    &snapshot,
                    "complete_task",
                    ActionStatus::Fault,
                    ChangeType::Update,
                );
                Err(e.into())
            }
        }
    }
}
