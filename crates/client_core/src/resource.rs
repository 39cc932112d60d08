//! Binds each entity to its id type, payload shapes and API path so the list
//! controller, mutation coordinator and HTTP client are written once.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        CompanyId, DepartmentId, EmployeeId, PositionId, ProjectId, ResourceKind, TaskId,
    },
    protocol::{
        Company, CompanyAdd, Department, DepartmentAdd, Employee, EmployeeAdd, Position,
        PositionAdd, Project, ProjectAdd, ProjectInfo, Task, TaskAdd, TaskEdit, TaskInfo,
    },
};

use crate::binding::Editable;

pub trait Resource:
    Clone + fmt::Debug + PartialEq + DeserializeOwned + Send + Sync + 'static
{
    type Id: Copy + Eq + From<i64> + fmt::Debug + fmt::Display + Send + Sync + 'static;
    /// Creation payload: no id, timestamps or denormalized names.
    type Add: Clone
        + fmt::Debug
        + Default
        + PartialEq
        + Serialize
        + Editable
        + Send
        + Sync
        + 'static;
    /// Update payload: carries the id and relationship edit targets.
    type Edit: Clone + fmt::Debug + PartialEq + Serialize + Editable + Send + Sync + 'static;

    const KIND: ResourceKind;

    fn id(&self) -> Option<Self::Id>;
    fn edit_id(edit: &Self::Edit) -> Option<Self::Id>;
    /// `None` when the record cannot be edited yet (no server id).
    fn to_edit(&self) -> Option<Self::Edit>;
}

macro_rules! self_edited_resource {
    ($ty:ty, $id:ty, $add:ty, $kind:expr) => {
        impl Resource for $ty {
            type Id = $id;
            type Add = $add;
            type Edit = $ty;

            const KIND: ResourceKind = $kind;

            fn id(&self) -> Option<Self::Id> {
                self.id
            }

            fn edit_id(edit: &Self::Edit) -> Option<Self::Id> {
                edit.id
            }

            fn to_edit(&self) -> Option<Self::Edit> {
                self.id.map(|_| self.clone())
            }
        }
    };
}

self_edited_resource!(Company, CompanyId, CompanyAdd, ResourceKind::Company);
self_edited_resource!(Department, DepartmentId, DepartmentAdd, ResourceKind::Department);
self_edited_resource!(Position, PositionId, PositionAdd, ResourceKind::Position);
self_edited_resource!(Project, ProjectId, ProjectAdd, ResourceKind::Project);
self_edited_resource!(Employee, EmployeeId, EmployeeAdd, ResourceKind::Employee);

impl Resource for Task {
    type Id = TaskId;
    type Add = TaskAdd;
    type Edit = TaskEdit;

    const KIND: ResourceKind = ResourceKind::Task;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn edit_id(edit: &Self::Edit) -> Option<Self::Id> {
        Some(edit.id)
    }

    fn to_edit(&self) -> Option<Self::Edit> {
        Task::to_edit(self)
    }
}

/// A resource that other records reference through an `{id, label}` summary.
pub trait Denormalize: Resource {
    type Summary: Clone + fmt::Debug + PartialEq;

    fn summarize(&self, id: Self::Id) -> Self::Summary;
    /// Summary stored when the id is missing from the reference list.
    fn placeholder(id: Self::Id) -> Self::Summary;
}

impl Denormalize for Project {
    type Summary = ProjectInfo;

    fn summarize(&self, id: ProjectId) -> ProjectInfo {
        ProjectInfo {
            id,
            name: self.name.clone(),
        }
    }

    fn placeholder(id: ProjectId) -> ProjectInfo {
        ProjectInfo {
            id,
            name: String::new(),
        }
    }
}

impl Denormalize for Task {
    type Summary = TaskInfo;

    fn summarize(&self, id: TaskId) -> TaskInfo {
        TaskInfo {
            id,
            task_number: self.task_number.clone(),
            task_status: Some(self.task_status),
            task_type: Some(self.task_type),
            task_priority: Some(self.task_priority),
            task_description: Some(self.task_description.clone()),
            time_spent_minutes: self.time_spent_minutes,
        }
    }

    fn placeholder(id: TaskId) -> TaskInfo {
        TaskInfo::bare(id)
    }
}

/// Resolves each id against `reference`, keeping ids that have no match with
/// a placeholder label so the result always has one entry per id.
pub fn resolve_relation<T: Denormalize>(ids: &[T::Id], reference: &[T]) -> Vec<T::Summary> {
    ids.iter()
        .map(|id| {
            reference
                .iter()
                .find(|candidate| candidate.id() == Some(*id))
                .map(|found| found.summarize(*id))
                .unwrap_or_else(|| T::placeholder(*id))
        })
        .collect()
}

/// Record field holding a list of `T` summaries.
pub trait HasRelations<T: Denormalize> {
    fn relation_ids(&self) -> Vec<T::Id>;
    fn set_relation(&mut self, entries: Vec<T::Summary>);
}

impl HasRelations<Project> for Employee {
    fn relation_ids(&self) -> Vec<ProjectId> {
        self.projects.iter().map(|p| p.id).collect()
    }

    fn set_relation(&mut self, entries: Vec<ProjectInfo>) {
        self.projects = entries;
    }
}

impl HasRelations<Task> for Employee {
    fn relation_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    fn set_relation(&mut self, entries: Vec<TaskInfo>) {
        self.tasks = entries;
    }
}

impl HasRelations<Project> for EmployeeAdd {
    fn relation_ids(&self) -> Vec<ProjectId> {
        self.projects.iter().map(|p| p.id).collect()
    }

    fn set_relation(&mut self, entries: Vec<ProjectInfo>) {
        self.projects = entries;
    }
}
