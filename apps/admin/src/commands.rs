//! Commands accepted by the interactive `browse` loop.

use std::str::FromStr;

use client_core::sort::{SortOrder, TaskSortKey};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Projects,
    Tasks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Next,
    Prev,
    /// One-based page number as shown in the footer.
    Page(u32),
    Size(u32),
    Search(String),
    Clear,
    Refresh,
    Add,
    Edit(i64),
    Set { field: String, value: String },
    Link { target: LinkTarget, ids: Vec<i64> },
    Save,
    Cancel,
    Delete(i64),
    /// Without an order, repeating the current key flips its direction.
    Sort {
        key: TaskSortKey,
        order: Option<SortOrder>,
    },
    Help,
    Quit,
}

impl ViewCommand {
    /// Whether running the command dispatches a page fetch.
    pub fn fetches(&self) -> bool {
        matches!(
            self,
            ViewCommand::Next
                | ViewCommand::Prev
                | ViewCommand::Page(_)
                | ViewCommand::Size(_)
                | ViewCommand::Search(_)
                | ViewCommand::Clear
                | ViewCommand::Refresh
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
}

const SORT_USAGE: &str = "sort status|priority [asc|desc]";

fn number<T: FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.trim()
        .parse()
        .map_err(|_| CommandError::NotANumber(raw.trim().to_string()))
}

impl FromStr for ViewCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        match word.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "next" | "n" => Ok(ViewCommand::Next),
            "prev" | "p" => Ok(ViewCommand::Prev),
            "page" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("page N"));
                }
                match number::<u32>(rest)? {
                    0 => Err(CommandError::Usage("page N (pages start at 1)")),
                    n => Ok(ViewCommand::Page(n)),
                }
            }
            "size" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("size 10|30|50"));
                }
                Ok(ViewCommand::Size(number(rest)?))
            }
            "search" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("search TEXT"));
                }
                Ok(ViewCommand::Search(rest.to_string()))
            }
            "clear" => Ok(ViewCommand::Clear),
            "refresh" | "r" => Ok(ViewCommand::Refresh),
            "add" => Ok(ViewCommand::Add),
            "edit" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("edit ID"));
                }
                Ok(ViewCommand::Edit(number(rest)?))
            }
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(f, v)| (f, v.trim()))
                    .unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err(CommandError::Usage("set FIELD VALUE"));
                }
                Ok(ViewCommand::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                })
            }
            "link" => {
                let mut parts = rest.split_whitespace();
                let target = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("projects") => LinkTarget::Projects,
                    Some("tasks") => LinkTarget::Tasks,
                    _ => return Err(CommandError::Usage("link projects|tasks ID...")),
                };
                let ids = parts.map(number).collect::<Result<Vec<i64>, _>>()?;
                Ok(ViewCommand::Link { target, ids })
            }
            "save" => Ok(ViewCommand::Save),
            "cancel" => Ok(ViewCommand::Cancel),
            "delete" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("delete ID"));
                }
                Ok(ViewCommand::Delete(number(rest)?))
            }
            "sort" => {
                let mut parts = rest.split_whitespace().map(str::to_ascii_lowercase);
                let key = match parts.next().as_deref() {
                    Some("status") => TaskSortKey::Status,
                    Some("priority") => TaskSortKey::Priority,
                    _ => return Err(CommandError::Usage(SORT_USAGE)),
                };
                let order = match parts.next().as_deref() {
                    None => None,
                    Some("asc") => Some(SortOrder::Asc),
                    Some("desc") => Some(SortOrder::Desc),
                    Some(_) => return Err(CommandError::Usage(SORT_USAGE)),
                };
                Ok(ViewCommand::Sort { key, order })
            }
            "help" | "?" => Ok(ViewCommand::Help),
            "quit" | "exit" | "q" => Ok(ViewCommand::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

pub const HELP: &str = "\
next | prev | page N | size 10|30|50
search TEXT | clear | refresh
add | edit ID | set FIELD VALUE | link projects|tasks ID... | save | cancel
delete ID | sort status|priority [asc|desc] | quit";
