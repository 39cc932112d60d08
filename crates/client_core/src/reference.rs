//! Whole-collection lookups backing the employee editor's pickers.

use futures::try_join;
use shared::protocol::{Department, Position, Project, Task};
use tracing::debug;

use crate::{
    api::ResourceApi,
    error::ApiError,
    paging::{PageRequest, REFERENCE_PAGE_SIZE},
};

#[derive(Debug, Clone, Default)]
pub struct EmployeeFormOptions {
    pub departments: Vec<Department>,
    pub positions: Vec<Position>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

impl EmployeeFormOptions {
    /// Loads all four reference lists concurrently.
    pub async fn load(
        departments: &dyn ResourceApi<Department>,
        positions: &dyn ResourceApi<Position>,
        projects: &dyn ResourceApi<Project>,
        tasks: &dyn ResourceApi<Task>,
    ) -> Result<Self, ApiError> {
        let request = PageRequest::new(0, REFERENCE_PAGE_SIZE);
        let (departments, positions, projects, tasks) = try_join!(
            departments.fetch_page(request),
            positions.fetch_page(request),
            projects.fetch_page(request),
            tasks.fetch_page(request),
        )?;
        debug!(
            departments = departments.items.len(),
            positions = positions.items.len(),
            projects = projects.items.len(),
            tasks = tasks.items.len(),
            "loaded employee form options"
        );
        Ok(Self {
            departments: departments.items,
            positions: positions.items,
            projects: projects.items,
            tasks: tasks.items,
        })
    }

    pub fn project_labels(&self) -> Vec<(String, String)> {
        self.projects
            .iter()
            .filter_map(|p| p.id.map(|id| (id.to_string(), p.name.clone())))
            .collect()
    }

    pub fn task_labels(&self) -> Vec<(String, String)> {
        self.tasks
            .iter()
            .filter_map(|t| t.id.map(|id| (id.to_string(), t.label())))
            .collect()
    }

    pub fn department_labels(&self) -> Vec<(String, String)> {
        self.departments
            .iter()
            .filter_map(|d| d.id.map(|id| (id.to_string(), d.department_name.clone())))
            .collect()
    }

    pub fn position_labels(&self) -> Vec<(String, String)> {
        self.positions
            .iter()
            .filter_map(|p| p.id.map(|id| (id.to_string(), p.position_name.clone())))
            .collect()
    }
}
