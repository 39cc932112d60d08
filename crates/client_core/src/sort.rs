//! View-local ordering for the task table. Applies to the held page only.

use shared::{
    domain::{TaskPriority, TaskStatus},
    protocol::Task,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    Status,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub key: TaskSortKey,
    pub order: SortOrder,
}

const STATUS_ASC: [TaskStatus; 3] = [
    TaskStatus::Active,
    TaskStatus::Pending,
    TaskStatus::Finished,
];
const PRIORITY_ASC: [TaskPriority; 3] = [
    TaskPriority::High,
    TaskPriority::Medium,
    TaskPriority::Low,
];

fn rank<T: PartialEq>(order: &[T], value: &T, direction: SortOrder) -> usize {
    let index = order.iter().position(|v| v == value).unwrap_or(0);
    match direction {
        SortOrder::Asc => index,
        SortOrder::Desc => order.len() - 1 - index,
    }
}

impl TaskSort {
    pub fn new(key: TaskSortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Stable sort: tasks with equal rank keep the server order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let mut sorted = tasks.to_vec();
        match self.key {
            TaskSortKey::Status => {
                sorted.sort_by_key(|t| rank(&STATUS_ASC, &t.task_status, self.order))
            }
            TaskSortKey::Priority => {
                sorted.sort_by_key(|t| rank(&PRIORITY_ASC, &t.task_priority, self.order))
            }
        }
        sorted
    }
}
