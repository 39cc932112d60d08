//! Plain-text tables for each resource.

use chrono::NaiveDate;
use client_core::{sort::TaskSort, PageState, Resource};
use shared::{
    protocol::{Company, Department, Employee, Position, Project, Task, TaskInfo},
    time::Timestamp,
};

const DATE_FORMAT: &str = "%d.%m.%Y";

pub trait TableRow: Resource {
    /// Whether the view offers a local sort for this resource.
    const SORTABLE: bool = false;

    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;

    fn arrange(rows: Vec<Self>, _sort: Option<TaskSort>) -> Vec<Self> {
        rows
    }
}

fn id_cell<I: ToString>(id: Option<I>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}

fn time_cell(at: &Option<Timestamp>) -> String {
    at.as_ref().map(Timestamp::display).unwrap_or_default()
}

impl TableRow for Company {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Industry", "Address", "Email", "Created", "Updated"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.name.clone(),
            self.industry.clone(),
            self.address.clone(),
            self.email.clone(),
            time_cell(&self.created_at),
            time_cell(&self.updated_at),
        ]
    }
}

impl TableRow for Department {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Description", "Created", "Updated"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.department_name.clone(),
            self.description.clone(),
            time_cell(&self.created_at),
            time_cell(&self.updated_at),
        ]
    }
}

impl TableRow for Position {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Experience (years)", "Created", "Updated"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.position_name.clone(),
            self.years_of_experience.to_string(),
            time_cell(&self.created_at),
            time_cell(&self.updated_at),
        ]
    }
}

impl TableRow for Project {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Status", "Start", "Finish", "Company", "Created"]
    }

    fn cells(&self) -> Vec<String> {
        let date = |d: Option<NaiveDate>| {
            d.map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        vec![
            id_cell(self.id),
            self.name.clone(),
            self.status.to_string(),
            date(self.start_date),
            date(self.finish_date),
            self.company_name.clone().unwrap_or_default(),
            time_cell(&self.created_at),
        ]
    }
}

impl TableRow for Task {
    const SORTABLE: bool = true;

    fn headers() -> &'static [&'static str] {
        &["ID", "Task", "Status", "Priority", "Type", "Minutes", "Description", "Created"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.label(),
            self.task_status.to_string(),
            self.task_priority.to_string(),
            self.task_type.to_string(),
            self.time_spent_minutes
                .map(|m| m.to_string())
                .unwrap_or_default(),
            self.task_description.clone(),
            time_cell(&self.created_at),
        ]
    }

    fn arrange(rows: Vec<Self>, sort: Option<TaskSort>) -> Vec<Self> {
        match sort {
            Some(sort) => sort.apply(&rows),
            None => rows,
        }
    }
}

fn task_info_label(task: &TaskInfo) -> String {
    match task.task_type {
        Some(kind) => format!("{}{}", kind.prefix(), task.task_number),
        None => task.task_number.clone(),
    }
}

impl TableRow for Employee {
    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "Name",
            "PIN",
            "Email",
            "Department",
            "Position",
            "Projects",
            "Tasks",
            "Created",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let projects = self
            .projects
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let tasks = self
            .tasks
            .iter()
            .map(task_info_label)
            .collect::<Vec<_>>()
            .join(", ");
        vec![
            id_cell(self.id),
            format!("{} {}", self.first_name, self.last_name),
            self.pin.clone(),
            self.email.clone(),
            self.department_name.clone().unwrap_or_default(),
            self.position_name.clone().unwrap_or_default(),
            projects,
            tasks,
            time_cell(&self.created_at),
        ]
    }
}

/// Position, totals and the range of records shown on the page.
pub fn footer(page: &PageState, shown: usize) -> String {
    let mut line = format!(
        "Page {} of {} | {} records | {} per page",
        page.page_number + 1,
        page.page_count().max(1),
        page.total_records,
        page.page_size
    );
    if shown > 0 {
        let first = page.first_record_index() + 1;
        let last = first + shown as u64 - 1;
        line.push_str(&format!(" | showing {first}-{last}"));
    }
    line
}

/// Column-aligned rows separated by ` | `.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let headers = R::headers();
    let body: Vec<Vec<String>> = rows.iter().map(|row| row.cells()).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &body {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
