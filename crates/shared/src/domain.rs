use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }
    };
}

id_newtype!(CompanyId);
id_newtype!(DepartmentId);
id_newtype!(EmployeeId);
id_newtype!(PositionId);
id_newtype!(ProjectId);
id_newtype!(TaskId);

/// The six collections exposed under `/api/v1/{resource}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Company,
    Department,
    Employee,
    Position,
    Project,
    Task,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Company,
        ResourceKind::Department,
        ResourceKind::Employee,
        ResourceKind::Position,
        ResourceKind::Project,
        ResourceKind::Task,
    ];

    /// Path segment used by the REST API.
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Company => "company",
            ResourceKind::Department => "department",
            ResourceKind::Employee => "employee",
            ResourceKind::Position => "position",
            ResourceKind::Project => "project",
            ResourceKind::Task => "task",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Company => "Companies",
            ResourceKind::Department => "Departments",
            ResourceKind::Employee => "Employees",
            ResourceKind::Position => "Positions",
            ResourceKind::Project => "Projects",
            ResourceKind::Task => "Tasks",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = UnknownVariant;

    /// Accepts the path segment or the plural title, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| {
                kind.path().eq_ignore_ascii_case(wanted)
                    || kind.title().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownVariant {
                kind: "resource",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Feature,
    Bug,
    Refactor,
}

impl TaskType {
    /// Prefix shown in front of a task number in pickers, e.g. `FTR-12`.
    pub fn prefix(self) -> &'static str {
        match self {
            TaskType::Feature => "FTR-",
            TaskType::Refactor => "REF-",
            TaskType::Bug => "FIX-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_name {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_name!(TaskStatus, "task status", {
    Pending => "PENDING",
    Active => "ACTIVE",
    Finished => "FINISHED",
});

wire_name!(TaskPriority, "task priority", {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});

wire_name!(TaskType, "task type", {
    Feature => "FEATURE",
    Bug => "BUG",
    Refactor => "REFACTOR",
});

wire_name!(ProjectStatus, "project status", {
    InProgress => "IN_PROGRESS",
    Finished => "FINISHED",
});
