//! The data-provider façade
//!
//! One [`DataProvider`] contract, three interchangeable backends: YAML
//! documents, CSV tables ([`FileDataProvider`]) and SQLite
//! ([`SqliteDataProvider`]). Statistics and the bulk initializer live on
//! the trait as provided methods so every backend shares them.

pub mod file;
pub mod sqlite;

pub use file::{CsvDataProvider, FileDataProvider, YamlDataProvider};
pub use sqlite::SqliteDataProvider;

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use crate::checker::{CheckError, ConstraintViolations};
use crate::core::entity::WorkStatus;
use crate::core::identity::{EntityId, EntityKind};
use crate::entities::{
    BugReport, Documentation, Employee, Event, Project, ProjectAggregate, Task,
};
use crate::history::{ActionStatus, ChangeType, HistoryJournal, HistoryRecord};
use crate::store::StoreError;

/// Errors surfaced by provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{} with id {} was not found", .kind.entity_name(), .id)]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("constraint violations: {0}")]
    Invalid(ConstraintViolations),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("database failure: {0}")]
    Database(#[from] rusqlite::Error),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

impl From<CheckError> for ProviderError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Violations(violations) => ProviderError::Invalid(violations),
            CheckError::Store(store) => ProviderError::Store(store),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Aggregated view over one project's records
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectStatistics {
    /// Percentage of tasks marked completed
    pub readiness: f32,

    /// Task id to status label
    pub task_status: BTreeMap<EntityId, String>,

    /// Employee id to efficiency score, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_efficiency: Option<BTreeMap<EntityId, f32>>,

    /// Bug report id to status label, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bug_report_status: Option<BTreeMap<EntityId, String>>,
}

/// Heuristic efficiency score over one employee's tasks
///
/// Completed tasks score 100 plus the day gap when finished early and 100
/// minus the gap when late; in-progress tasks past their deadline score 100
/// minus the overdue days, and contribute nothing otherwise. The sum is
/// averaged over ALL tasks. Deliberately unbounded in both directions -
/// early finishers land above 100 and badly late work can push the score
/// negative.
pub fn employee_efficiency(tasks: &[Task]) -> f32 {
    if tasks.is_empty() {
        return 0.0;
    }

    let now = Utc::now();
    let mut score_sum: i64 = 0;

    for task in tasks {
        match task.status {
            WorkStatus::Completed => {
                if let Some(completed_at) = task.completed_at {
                    let day_gap = (completed_at - task.deadline).num_days().abs();
                    if task.deadline < completed_at {
                        score_sum += 100 - day_gap;
                    } else {
                        score_sum += 100 + day_gap;
                    }
                }
            }
            WorkStatus::InProgress => {
                if task.deadline < now {
                    let day_gap = (now - task.deadline).num_days().abs();
                    score_sum += 100 - day_gap;
                }
            }
            WorkStatus::NotStarted => {}
        }
    }

    score_sum as f32 / tasks.len() as f32
}

/// Create/read/delete operations per entity type, binding operations and
/// derived statistics over one backing store
///
/// Every call re-reads the relevant store; there is no cross-call state.
/// The contract assumes a single writer per store.
pub trait DataProvider {
    /// The audit journal mutations are recorded to
    fn history(&self) -> &HistoryJournal;

    /// Append an audit entry; journal failures are logged, never surfaced
    fn record_history<T: Serialize>(
        &self,
        entity_type: &str,
        entity: &T,
        method: &str,
        status: ActionStatus,
        change: ChangeType,
    ) {
        let record = HistoryRecord::new(entity_type, entity, method, status, change);
        if let Err(e) = self.history().record(&record) {
            warn!(method, error = %e, "history journal append failed");
        }
    }

    fn create_project(&self, project: &Project) -> ProviderResult<()>;
    fn create_employee(&self, employee: &Employee) -> ProviderResult<()>;
    fn create_task(&self, task: &Task) -> ProviderResult<()>;
    fn create_bug_report(&self, bug_report: &BugReport) -> ProviderResult<()>;
    fn create_event(&self, event: &Event) -> ProviderResult<()>;
    fn create_documentation(&self, documentation: &Documentation) -> ProviderResult<()>;

    fn get_project_by_id(&self, id: EntityId) -> ProviderResult<Project>;
    fn get_employee_by_id(&self, id: EntityId) -> ProviderResult<Employee>;
    fn get_task_by_id(&self, id: EntityId) -> ProviderResult<Task>;
    fn get_bug_report_by_id(&self, id: EntityId) -> ProviderResult<BugReport>;
    fn get_event_by_id(&self, id: EntityId) -> ProviderResult<Event>;
    fn get_documentation_by_id(&self, id: EntityId) -> ProviderResult<Documentation>;

    fn get_tasks_by_project_id(&self, project_id: EntityId) -> ProviderResult<Vec<Task>>;
    fn get_tasks_by_employee_id(&self, employee_id: EntityId) -> ProviderResult<Vec<Task>>;

    /// Tasks of the project whose tag set intersects the query set
    fn get_tasks_by_tags(
        &self,
        tags: &[String],
        project_id: EntityId,
    ) -> ProviderResult<Vec<Task>>;

    fn get_bug_reports_by_project_id(&self, project_id: EntityId)
        -> ProviderResult<Vec<BugReport>>;
    fn get_events_by_project_id(&self, project_id: EntityId) -> ProviderResult<Vec<Event>>;
    fn get_documentations_by_project_id(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<Vec<Documentation>>;

    /// Employees linked to the project
    fn get_project_team(&self, project_id: EntityId) -> ProviderResult<Vec<Employee>>;

    fn delete_project(&self, id: EntityId) -> ProviderResult<()>;
    fn delete_employee(&self, id: EntityId) -> ProviderResult<()>;
    fn delete_task(&self, id: EntityId) -> ProviderResult<()>;
    fn delete_bug_report(&self, id: EntityId) -> ProviderResult<()>;
    fn delete_event(&self, id: EntityId) -> ProviderResult<()>;
    fn delete_documentation(&self, id: EntityId) -> ProviderResult<()>;

    /// Record the employee as a member of the project's team
    fn bind_employee_to_project(
        &self,
        employee_id: EntityId,
        project_id: EntityId,
    ) -> ProviderResult<()>;

    /// Set the project's manager; the employee must already be linked
    fn bind_project_manager(
        &self,
        manager_id: EntityId,
        project_id: EntityId,
    ) -> ProviderResult<()>;

    /// Transition the task to completed and stamp the completion time
    fn complete_task(&self, task_id: EntityId) -> ProviderResult<()>;

    /// Percentage of the project's tasks marked completed; 0 without tasks
    fn calculate_project_readiness(&self, project_id: EntityId) -> ProviderResult<f32> {
        let tasks = self.get_tasks_by_project_id(project_id)?;
        if tasks.is_empty() {
            return Ok(0.0);
        }

        let completed = tasks
            .iter()
            .filter(|t| t.status == WorkStatus::Completed)
            .count();

        Ok(completed as f32 / tasks.len() as f32 * 100.0)
    }

    /// Efficiency score for an arbitrary task list; see [`employee_efficiency`]
    fn calculate_employee_efficiency(&self, tasks: &[Task]) -> f32 {
        employee_efficiency(tasks)
    }

    /// Efficiency per team member, over all of their tasks; 0 without tasks
    fn calculate_labor_efficiency(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<BTreeMap<EntityId, f32>> {
        let team = self.get_project_team(project_id)?;
        let mut scores = BTreeMap::new();

        for employee in team {
            let tasks = self.get_tasks_by_employee_id(employee.id)?;
            scores.insert(employee.id, employee_efficiency(&tasks));
        }

        Ok(scores)
    }

    /// Task id to status label; empty map for a task-less project
    fn track_task_status(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<BTreeMap<EntityId, String>> {
        let tasks = self.get_tasks_by_project_id(project_id)?;
        Ok(tasks
            .into_iter()
            .map(|t| (t.id, t.status.to_string()))
            .collect())
    }

    /// Bug report id to status label; empty map without bug reports
    fn track_bug_report_status(
        &self,
        project_id: EntityId,
    ) -> ProviderResult<BTreeMap<EntityId, String>> {
        let bug_reports = self.get_bug_reports_by_project_id(project_id)?;
        Ok(bug_reports
            .into_iter()
            .map(|b| (b.id, b.status.to_string()))
            .collect())
    }

    /// Readiness and task status, plus labor efficiency and bug status on
    /// request
    fn monitor_project_characteristics(
        &self,
        project_id: EntityId,
        include_labor: bool,
        include_bugs: bool,
    ) -> ProviderResult<ProjectStatistics> {
        let mut statistics = ProjectStatistics {
            readiness: self.calculate_project_readiness(project_id)?,
            task_status: self.track_task_status(project_id)?,
            ..ProjectStatistics::default()
        };

        if include_labor {
            statistics.labor_efficiency = Some(self.calculate_labor_efficiency(project_id)?);
        }
        if include_bugs {
            statistics.bug_report_status = Some(self.track_bug_report_status(project_id)?);
        }

        Ok(statistics)
    }

    /// Create a whole project aggregate: the project record, then every
    /// employee with their link (binding the designated manager), then bug
    /// reports, documentation, events and tasks, in that fixed order.
    ///
    /// NOT transactional: the first failing result is returned, but records
    /// created before it stay behind.
    fn init_project_entities(&self, aggregate: &ProjectAggregate) -> ProviderResult<()> {
        let project = &aggregate.project;
        let mut results: Vec<ProviderResult<()>> = Vec::new();

        results.push(self.create_project(project));

        for employee in &aggregate.team {
            results.push(self.create_employee(employee));
            results.push(self.bind_employee_to_project(employee.id, project.id));

            if aggregate.manager_id == Some(employee.id) {
                results.push(self.bind_project_manager(employee.id, project.id));
            }
        }

        for bug_report in &aggregate.bug_reports {
            results.push(self.create_bug_report(bug_report));
        }
        for documentation in &aggregate.documentations {
            results.push(self.create_documentation(documentation));
        }
        for event in &aggregate.events {
            results.push(self.create_event(event));
        }
        for task in &aggregate.tasks {
            results.push(self.create_task(task));
        }

        for result in results {
            result?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn task_with_deadline(deadline: chrono::DateTime<Utc>) -> Task {
        Task::new(
            EntityId::new(EntityKind::Project),
            EntityId::new(EntityKind::Employee),
            "Nika Adams",
            "scored task",
            deadline,
        )
    }

    #[test]
    fn test_efficiency_four_days_early_scores_104() {
        let deadline = Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).unwrap();
        let completed = Utc.with_ymd_and_hms(2023, 12, 20, 0, 0, 0).unwrap();

        let mut task = task_with_deadline(deadline);
        task.status = WorkStatus::Completed;
        task.completed_at = Some(completed);

        assert_eq!(employee_efficiency(&[task]), 104.0);
    }

    #[test]
    fn test_efficiency_three_days_late_scores_97() {
        let deadline = Utc.with_ymd_and_hms(2023, 12, 20, 0, 0, 0).unwrap();
        let completed = Utc.with_ymd_and_hms(2023, 12, 23, 0, 0, 0).unwrap();

        let mut task = task_with_deadline(deadline);
        task.status = WorkStatus::Completed;
        task.completed_at = Some(completed);

        assert_eq!(employee_efficiency(&[task]), 97.0);
    }

    #[test]
    fn test_efficiency_in_progress_not_overdue_contributes_zero() {
        let mut task = task_with_deadline(Utc::now() + Duration::days(5));
        task.status = WorkStatus::InProgress;

        assert_eq!(employee_efficiency(&[task]), 0.0);
    }

    #[test]
    fn test_efficiency_in_progress_overdue_is_penalized() {
        let mut task = task_with_deadline(Utc::now() - Duration::days(10));
        task.status = WorkStatus::InProgress;

        // ten full days overdue, give or take the test's own runtime
        let score = employee_efficiency(&[task]);
        assert!((score - 90.0).abs() <= 1.0, "score was {}", score);
    }

    #[test]
    fn test_efficiency_empty_task_list_is_zero() {
        assert_eq!(employee_efficiency(&[]), 0.0);
    }

    #[test]
    fn test_efficiency_averages_over_all_tasks() {
        let deadline = Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).unwrap();

        let mut early = task_with_deadline(deadline);
        early.status = WorkStatus::Completed;
        early.completed_at = Some(deadline - Duration::days(4));

        // not started, contributes nothing but still counts in the divisor
        let untouched = task_with_deadline(deadline + Duration::days(30));

        assert_eq!(employee_efficiency(&[early, untouched]), 52.0);
    }
}
