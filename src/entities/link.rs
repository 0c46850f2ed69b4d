//! Employee-to-project link record

use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// Membership of one employee in one project's team
///
/// A pure link record: its identity is the (employee, project) pair and it
/// carries nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProjectLink {
    pub employee_id: EntityId,
    pub project_id: EntityId,
}

impl EmployeeProjectLink {
    pub fn new(employee_id: EntityId, project_id: EntityId) -> Self {
        Self {
            employee_id,
            project_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityKind;

    #[test]
    fn test_link_equality_is_the_pair() {
        let employee = EntityId::new(EntityKind::Employee);
        let project = EntityId::new(EntityKind::Project);

        let a = EmployeeProjectLink::new(employee, project);
        let b = EmployeeProjectLink::new(employee, project);
        assert_eq!(a, b);

        let c = EmployeeProjectLink::new(EntityId::new(EntityKind::Employee), project);
        assert_ne!(a, c);
    }
}
