//! Tagged field updates for every add/edit form.

use std::str::FromStr;

use chrono::NaiveDate;
use shared::{
    domain::{
        CompanyId, DepartmentId, PositionId, ProjectStatus, TaskPriority, TaskStatus, TaskType,
    },
    protocol::{
        Company, CompanyAdd, Department, DepartmentAdd, Employee, EmployeeAdd, Position,
        PositionAdd, Project, ProjectAdd, TaskAdd, TaskEdit,
    },
};

use crate::binding::{Editable, FieldError};

#[derive(Debug, Clone, PartialEq)]
pub enum CompanyField {
    Name(String),
    Industry(String),
    Address(String),
    Email(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DepartmentField {
    DepartmentName(String),
    Description(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionField {
    PositionName(String),
    YearsOfExperience(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectField {
    Name(String),
    Description(String),
    StartDate(Option<NaiveDate>),
    FinishDate(Option<NaiveDate>),
    Status(ProjectStatus),
    CompanyId(Option<CompanyId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskField {
    Status(TaskStatus),
    Priority(TaskPriority),
    Type(TaskType),
    TimeSpentMinutes(Option<u32>),
    Description(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeField {
    FirstName(String),
    LastName(String),
    Pin(String),
    Address(String),
    Email(String),
    DepartmentId(Option<DepartmentId>),
    PositionId(Option<PositionId>),
}

fn invalid(field: &'static str, value: &str, reason: impl ToString) -> FieldError {
    FieldError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn optional<T>(field: &'static str, value: &str) -> Result<Option<T>, FieldError>
where
    T: FromStr,
    T::Err: ToString,
{
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|err| invalid(field, value, err))
}

fn required<T>(field: &'static str, value: &str) -> Result<T, FieldError>
where
    T: FromStr,
    T::Err: ToString,
{
    optional(field, value)?.ok_or_else(|| invalid(field, value, "value is required"))
}

fn optional_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|err| invalid(field, value, err))
}

impl CompanyField {
    fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        let value = value.to_string();
        match name {
            "name" => Ok(Self::Name(value)),
            "industry" => Ok(Self::Industry(value)),
            "address" => Ok(Self::Address(value)),
            "email" => Ok(Self::Email(value)),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

impl Editable for Company {
    type Field = CompanyField;

    fn apply(&mut self, field: CompanyField) {
        match field {
            CompanyField::Name(v) => self.name = v,
            CompanyField::Industry(v) => self.industry = v,
            CompanyField::Address(v) => self.address = v,
            CompanyField::Email(v) => self.email = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<CompanyField, FieldError> {
        CompanyField::parse(name, value)
    }
}

impl Editable for CompanyAdd {
    type Field = CompanyField;

    fn apply(&mut self, field: CompanyField) {
        match field {
            CompanyField::Name(v) => self.name = v,
            CompanyField::Industry(v) => self.industry = v,
            CompanyField::Address(v) => self.address = v,
            CompanyField::Email(v) => self.email = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<CompanyField, FieldError> {
        CompanyField::parse(name, value)
    }
}

impl DepartmentField {
    fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        match name {
            "departmentName" => Ok(Self::DepartmentName(value.to_string())),
            "description" => Ok(Self::Description(value.to_string())),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

impl Editable for Department {
    type Field = DepartmentField;

    fn apply(&mut self, field: DepartmentField) {
        match field {
            DepartmentField::DepartmentName(v) => self.department_name = v,
            DepartmentField::Description(v) => self.description = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<DepartmentField, FieldError> {
        DepartmentField::parse(name, value)
    }
}

impl Editable for DepartmentAdd {
    type Field = DepartmentField;

    fn apply(&mut self, field: DepartmentField) {
        match field {
            DepartmentField::DepartmentName(v) => self.department_name = v,
            DepartmentField::Description(v) => self.description = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<DepartmentField, FieldError> {
        DepartmentField::parse(name, value)
    }
}

impl PositionField {
    fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        match name {
            "positionName" => Ok(Self::PositionName(value.to_string())),
            "yearsOfExperience" => Ok(Self::YearsOfExperience(required(
                "yearsOfExperience",
                value,
            )?)),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

impl Editable for Position {
    type Field = PositionField;

    fn apply(&mut self, field: PositionField) {
        match field {
            PositionField::PositionName(v) => self.position_name = v,
            PositionField::YearsOfExperience(v) => self.years_of_experience = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<PositionField, FieldError> {
        PositionField::parse(name, value)
    }
}

impl Editable for PositionAdd {
    type Field = PositionField;

    fn apply(&mut self, field: PositionField) {
        match field {
            PositionField::PositionName(v) => self.position_name = v,
            PositionField::YearsOfExperience(v) => self.years_of_experience = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<PositionField, FieldError> {
        PositionField::parse(name, value)
    }
}

impl ProjectField {
    fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        match name {
            "name" => Ok(Self::Name(value.to_string())),
            "description" => Ok(Self::Description(value.to_string())),
            "startDate" => Ok(Self::StartDate(optional_date("startDate", value)?)),
            "finishDate" => Ok(Self::FinishDate(optional_date("finishDate", value)?)),
            "status" => Ok(Self::Status(required("status", value)?)),
            "companyId" => Ok(Self::CompanyId(
                optional::<i64>("companyId", value)?.map(CompanyId),
            )),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

impl Editable for Project {
    type Field = ProjectField;

    fn apply(&mut self, field: ProjectField) {
        match field {
            ProjectField::Name(v) => self.name = v,
            ProjectField::Description(v) => self.description = v,
            ProjectField::StartDate(v) => self.start_date = v,
            ProjectField::FinishDate(v) => self.finish_date = v,
            ProjectField::Status(v) => self.status = v,
            ProjectField::CompanyId(v) => {
                if v != self.company_id {
                    self.company_name = None;
                }
                self.company_id = v;
            }
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<ProjectField, FieldError> {
        ProjectField::parse(name, value)
    }
}

impl Editable for ProjectAdd {
    type Field = ProjectField;

    fn apply(&mut self, field: ProjectField) {
        match field {
            ProjectField::Name(v) => self.name = v,
            ProjectField::Description(v) => self.description = v,
            ProjectField::StartDate(v) => self.start_date = v,
            ProjectField::FinishDate(v) => self.finish_date = v,
            ProjectField::Status(v) => self.status = Some(v),
            ProjectField::CompanyId(v) => self.company_id = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<ProjectField, FieldError> {
        ProjectField::parse(name, value)
    }
}

impl TaskField {
    fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        match name {
            "taskStatus" => Ok(Self::Status(required("taskStatus", value)?)),
            "taskPriority" => Ok(Self::Priority(required("taskPriority", value)?)),
            "taskType" => Ok(Self::Type(required("taskType", value)?)),
            "timeSpentMinutes" => Ok(Self::TimeSpentMinutes(optional(
                "timeSpentMinutes",
                value,
            )?)),
            "taskDescription" => Ok(Self::Description(value.to_string())),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

impl Editable for TaskAdd {
    type Field = TaskField;

    fn apply(&mut self, field: TaskField) {
        match field {
            TaskField::Status(v) => self.task_status = Some(v),
            TaskField::Priority(v) => self.task_priority = Some(v),
            TaskField::Type(v) => self.task_type = Some(v),
            TaskField::TimeSpentMinutes(v) => self.time_spent_minutes = v,
            TaskField::Description(v) => self.task_description = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<TaskField, FieldError> {
        TaskField::parse(name, value)
    }
}

impl Editable for TaskEdit {
    type Field = TaskField;

    fn apply(&mut self, field: TaskField) {
        match field {
            TaskField::Status(v) => self.task_status = v,
            TaskField::Priority(v) => self.task_priority = v,
            TaskField::Type(v) => self.task_type = v,
            TaskField::TimeSpentMinutes(v) => self.time_spent_minutes = v,
            TaskField::Description(v) => self.task_description = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<TaskField, FieldError> {
        TaskField::parse(name, value)
    }
}

impl EmployeeField {
    fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        match name {
            "firstName" => Ok(Self::FirstName(value.to_string())),
            "lastName" => Ok(Self::LastName(value.to_string())),
            "pin" => Ok(Self::Pin(value.to_string())),
            "address" => Ok(Self::Address(value.to_string())),
            "email" => Ok(Self::Email(value.to_string())),
            "departmentId" => Ok(Self::DepartmentId(
                optional::<i64>("departmentId", value)?.map(DepartmentId),
            )),
            "positionId" => Ok(Self::PositionId(
                optional::<i64>("positionId", value)?.map(PositionId),
            )),
            other => Err(FieldError::UnknownField(other.to_string())),
        }
    }
}

impl Editable for Employee {
    type Field = EmployeeField;

    fn apply(&mut self, field: EmployeeField) {
        match field {
            EmployeeField::FirstName(v) => self.first_name = v,
            EmployeeField::LastName(v) => self.last_name = v,
            EmployeeField::Pin(v) => self.pin = v,
            EmployeeField::Address(v) => self.address = v,
            EmployeeField::Email(v) => self.email = v,
            EmployeeField::DepartmentId(v) => {
                if v != self.department_id {
                    self.department_name = None;
                }
                self.department_id = v;
            }
            EmployeeField::PositionId(v) => {
                if v != self.position_id {
                    self.position_name = None;
                }
                self.position_id = v;
            }
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<EmployeeField, FieldError> {
        EmployeeField::parse(name, value)
    }
}

impl Editable for EmployeeAdd {
    type Field = EmployeeField;

    fn apply(&mut self, field: EmployeeField) {
        match field {
            EmployeeField::FirstName(v) => self.first_name = v,
            EmployeeField::LastName(v) => self.last_name = v,
            EmployeeField::Pin(v) => self.pin = v,
            EmployeeField::Address(v) => self.address = v,
            EmployeeField::Email(v) => self.email = v,
            EmployeeField::DepartmentId(v) => self.department_id = v,
            EmployeeField::PositionId(v) => self.position_id = v,
        }
    }

    fn parse_field(name: &str, value: &str) -> Result<EmployeeField, FieldError> {
        EmployeeField::parse(name, value)
    }
}
