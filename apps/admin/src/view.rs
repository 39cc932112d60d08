//! Interactive list view: one controller, its mutation coordinator and the
//! add/edit form bindings for a single resource.

use std::{io::Write, sync::Arc};

use anyhow::{anyhow, bail, Context};
use client_core::{
    reference::EmployeeFormOptions,
    sort::{SortOrder, TaskSort},
    ControllerOptions, DialogFormBinding,
    DialogVisibility, FetchError, FetchOutcome, HttpApi, MutationCoordinator, Resource,
    ResourceApi, ResourceListController,
};
use shared::{
    domain::{ProjectId, TaskId},
    protocol::{Company, Department, Employee, Position, Project, Task},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::{
    commands::{CommandError, LinkTarget, ViewCommand, HELP},
    table::{footer, render_table, TableRow},
};

const NO_FORM: &str = "no form is open, use 'add' or 'edit ID' first";

pub struct Forms<R: Resource> {
    pub add: DialogFormBinding<R::Add>,
    pub edit: DialogFormBinding<R::Edit>,
}

impl<R: Resource> Default for Forms<R> {
    fn default() -> Self {
        Self {
            add: DialogFormBinding::default(),
            edit: DialogFormBinding::default(),
        }
    }
}

/// Relationship editing for resources that carry linked records.
pub trait Linkable: Resource {
    /// Whether linking needs the reference lists loaded first.
    const NEEDS_REFERENCES: bool = false;

    fn link(
        _forms: &mut Forms<Self>,
        _dialogs: DialogVisibility,
        target: LinkTarget,
        _ids: &[i64],
        _options: &EmployeeFormOptions,
    ) -> anyhow::Result<()> {
        let what = match target {
            LinkTarget::Projects => "projects",
            LinkTarget::Tasks => "tasks",
        };
        bail!("{} records have no {what} to link", Self::KIND.path())
    }

    /// Describes ids in `field` that match nothing in the reference lists.
    fn reference_hint(
        _field: &str,
        _ids: &[i64],
        _options: &EmployeeFormOptions,
    ) -> Option<String> {
        None
    }
}

fn unknown_reference_hint(
    field: &str,
    ids: &[i64],
    labels: &[(String, String)],
) -> Option<String> {
    let missing: Vec<String> = ids
        .iter()
        .map(i64::to_string)
        .filter(|id| !labels.iter().any(|(known, _)| known == id))
        .collect();
    if missing.is_empty() {
        return None;
    }
    let known = if labels.is_empty() {
        "none".to_string()
    } else {
        labels
            .iter()
            .map(|(id, label)| format!("{id} {label}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    Some(format!(
        "unknown {field} id {}; known: {known}",
        missing.join(", ")
    ))
}

impl Linkable for Company {}
impl Linkable for Department {}
impl Linkable for Position {}
impl Linkable for Project {}
impl Linkable for Task {}

impl Linkable for Employee {
    const NEEDS_REFERENCES: bool = true;

    fn link(
        forms: &mut Forms<Self>,
        dialogs: DialogVisibility,
        target: LinkTarget,
        ids: &[i64],
        options: &EmployeeFormOptions,
    ) -> anyhow::Result<()> {
        let project_ids: Vec<ProjectId> = ids.iter().copied().map(ProjectId::from).collect();
        let task_ids: Vec<TaskId> = ids.iter().copied().map(TaskId::from).collect();
        match (dialogs.add, dialogs.edit, target) {
            (true, _, LinkTarget::Projects) => forms
                .add
                .set_relation_ids::<Project>(&project_ids, &options.projects)?,
            (true, _, LinkTarget::Tasks) => {
                bail!("tasks can be linked once the employee has been created")
            }
            (false, true, LinkTarget::Projects) => forms
                .edit
                .set_relation_ids::<Project>(&project_ids, &options.projects)?,
            (false, true, LinkTarget::Tasks) => forms
                .edit
                .set_relation_ids::<Task>(&task_ids, &options.tasks)?,
            (false, false, _) => bail!(NO_FORM),
        }
        Ok(())
    }

    fn reference_hint(
        field: &str,
        ids: &[i64],
        options: &EmployeeFormOptions,
    ) -> Option<String> {
        let labels = match field {
            "projects" => options.project_labels(),
            "tasks" => options.task_labels(),
            "departmentId" => options.department_labels(),
            "positionId" => options.position_labels(),
            _ => return None,
        };
        unknown_reference_hint(field, ids, &labels)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ListView<R: TableRow + Linkable> {
    http: HttpApi,
    list: ResourceListController<R>,
    coordinator: MutationCoordinator<R>,
    forms: Forms<R>,
    references: Option<EmployeeFormOptions>,
    sort: Option<TaskSort>,
    notice: Option<String>,
}

impl<R: TableRow + Linkable> ListView<R> {
    pub fn new(http: HttpApi, options: ControllerOptions) -> Self {
        let list = ResourceListController::new(Arc::new(http.clone()), options);
        Self {
            http,
            coordinator: MutationCoordinator::new(list.clone()),
            list,
            forms: Forms::default(),
            references: None,
            sort: None,
            notice: None,
        }
    }

    pub fn controller(&self) -> &ResourceListController<R> {
        &self.list
    }

    pub fn dialogs(&self) -> DialogVisibility {
        self.coordinator.dialogs()
    }

    pub fn forms(&self) -> &Forms<R> {
        &self.forms
    }

    /// Loads the first page. A failure is kept in the list state for display.
    pub async fn open(&self) -> Result<FetchOutcome, FetchError> {
        self.list.initialize().await
    }

    pub async fn close(&self) {
        self.list.close().await;
    }

    pub async fn execute(&mut self, command: ViewCommand) -> anyhow::Result<Flow> {
        self.notice = None;
        debug!(resource = R::KIND.path(), ?command, "view command");
        match command {
            ViewCommand::Next => fetched(self.list.next_page().await)?,
            ViewCommand::Prev => fetched(self.list.previous_page().await)?,
            ViewCommand::Page(number) => {
                let page = self.list.snapshot().await.page;
                let count = page.page_count();
                if count > 0 && number > count {
                    bail!("page {number} is out of range (1-{count})");
                }
                fetched(
                    self.list
                        .fetch_page(number.saturating_sub(1), page.page_size)
                        .await,
                )?
            }
            ViewCommand::Size(size) => fetched(self.list.set_page_size(size).await)?,
            ViewCommand::Search(query) => fetched(self.list.set_query(Some(query)).await)?,
            ViewCommand::Clear => fetched(self.list.set_query(None).await)?,
            ViewCommand::Refresh => fetched(self.list.refetch_current_page().await)?,
            ViewCommand::Add => {
                self.cancel_forms();
                self.forms.add.bind_blank();
                self.coordinator.open_add();
            }
            ViewCommand::Edit(raw) => self.begin_edit(R::Id::from(raw)).await?,
            ViewCommand::Set { field, value } => {
                let dialogs = self.coordinator.dialogs();
                if dialogs.add {
                    self.forms.add.set_field_text(&field, &value)?;
                } else if dialogs.edit {
                    self.forms.edit.set_field_text(&field, &value)?;
                } else {
                    bail!(NO_FORM);
                }
                if R::NEEDS_REFERENCES && matches!(field.as_str(), "departmentId" | "positionId") {
                    if let Ok(id) = value.trim().parse::<i64>() {
                        self.ensure_references().await?;
                        let empty = EmployeeFormOptions::default();
                        let options = self.references.as_ref().unwrap_or(&empty);
                        self.notice = R::reference_hint(&field, &[id], options);
                    }
                }
            }
            ViewCommand::Link { target, ids } => {
                let dialogs = self.coordinator.dialogs();
                if !dialogs.add && !dialogs.edit {
                    bail!(NO_FORM);
                }
                if R::NEEDS_REFERENCES {
                    self.ensure_references().await?;
                }
                let empty = EmployeeFormOptions::default();
                let options = self.references.as_ref().unwrap_or(&empty);
                R::link(&mut self.forms, dialogs, target, &ids, options)?;
                let field = match target {
                    LinkTarget::Projects => "projects",
                    LinkTarget::Tasks => "tasks",
                };
                self.notice = R::reference_hint(field, &ids, options);
            }
            ViewCommand::Save => self.save().await?,
            ViewCommand::Cancel => {
                if self.forms.add.is_dirty() || self.forms.edit.is_dirty() {
                    self.notice = Some("Discarded unsaved changes".to_string());
                }
                self.cancel_forms();
            }
            ViewCommand::Delete(raw) => {
                let id = R::Id::from(raw);
                self.coordinator.remove(id).await?;
                self.notice = Some(format!("Deleted {} {id}", R::KIND.path()));
            }
            ViewCommand::Sort { key, order } => {
                if !R::SORTABLE {
                    bail!("sorting is only available for tasks");
                }
                let order = order.unwrap_or_else(|| match self.sort {
                    Some(current) if current.key == key => current.order.toggled(),
                    _ => SortOrder::Asc,
                });
                self.sort = Some(TaskSort::new(key, order));
            }
            ViewCommand::Help => self.notice = Some(HELP.to_string()),
            ViewCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn ensure_references(&mut self) -> anyhow::Result<()> {
        if self.references.is_none() {
            let loaded = EmployeeFormOptions::load(&self.http, &self.http, &self.http, &self.http)
                .await
                .context("failed to load reference lists")?;
            self.references = Some(loaded);
        }
        Ok(())
    }

    async fn begin_edit(&mut self, id: R::Id) -> anyhow::Result<()> {
        let on_page = self
            .list
            .snapshot()
            .await
            .items
            .into_iter()
            .find(|record| record.id() == Some(id));
        let record = match on_page {
            Some(record) => record,
            None => ResourceApi::<R>::get(&self.http, id)
                .await
                .with_context(|| format!("failed to load {} {id}", R::KIND.path()))?,
        };
        let edit = record
            .to_edit()
            .ok_or_else(|| anyhow!("{} {id} cannot be edited", R::KIND.path()))?;

        self.forms.add.clear();
        self.coordinator.close_add();
        self.forms.edit.bind(&edit);
        self.coordinator.open_edit();
        Ok(())
    }

    async fn save(&mut self) -> anyhow::Result<()> {
        let dialogs = self.coordinator.dialogs();
        if dialogs.add {
            let payload = self.forms.add.commit().ok_or_else(|| anyhow!(NO_FORM))?;
            let created = self.coordinator.create(&payload).await?;
            self.forms.add.clear();
            self.notice = Some(match created.id() {
                Some(id) => format!("Created {} {id}", R::KIND.path()),
                None => format!("Created {}", R::KIND.path()),
            });
        } else if dialogs.edit {
            let payload = self.forms.edit.commit().ok_or_else(|| anyhow!(NO_FORM))?;
            self.coordinator.update(&payload).await?;
            self.forms.edit.clear();
            self.notice = Some(format!("Updated {}", R::KIND.path()));
        } else {
            bail!(NO_FORM);
        }
        Ok(())
    }

    fn cancel_forms(&mut self) {
        self.coordinator.close_add();
        self.coordinator.close_edit();
        self.forms.add.clear();
        self.forms.edit.clear();
    }

    pub async fn render(&self) -> String {
        let snapshot = self.list.snapshot().await;
        let shown = snapshot.items.len();
        let mut out = Vec::new();

        let mut title = R::KIND.title().to_string();
        if let Some(query) = &snapshot.query {
            title.push_str(&format!(" matching \"{query}\""));
        }
        out.push(title);

        if snapshot.is_loading() {
            out.push("Loading...".to_string());
        } else if let Some(message) = snapshot.error() {
            out.push(format!("Error: {message}"));
        } else if snapshot.items.is_empty() {
            out.push("No records".to_string());
        } else {
            out.push(render_table(&R::arrange(snapshot.items, self.sort)));
        }

        out.push(footer(&snapshot.page, shown));

        let dialogs = self.coordinator.dialogs();
        if dialogs.add && self.forms.add.is_bound() {
            out.push(draft_block(
                &format!("New {}", R::KIND.path()),
                self.forms.add.draft(),
            ));
        }
        if dialogs.edit && self.forms.edit.is_bound() {
            let label = match self.forms.edit.draft().and_then(R::edit_id) {
                Some(id) => format!("Editing {} {id}", R::KIND.path()),
                None => format!("Editing {}", R::KIND.path()),
            };
            out.push(draft_block(&label, self.forms.edit.draft()));
        }
        if let Some(notice) = &self.notice {
            out.push(notice.clone());
        }
        out.join("\n")
    }
}

/// Only page-size rejections are reported here; other fetch failures are
/// rendered from the list state.
fn fetched(result: Result<FetchOutcome, FetchError>) -> anyhow::Result<()> {
    match result {
        Err(err @ FetchError::InvalidPageSize(_)) => Err(err.into()),
        Err(FetchError::Api(_)) | Ok(_) => Ok(()),
    }
}

fn draft_block<T: serde::Serialize>(label: &str, draft: Option<&T>) -> String {
    let body = draft
        .and_then(|d| serde_json::to_string_pretty(d).ok())
        .unwrap_or_default();
    format!("{label}:\n{body}")
}

pub async fn run_interactive<R: TableRow + Linkable>(mut view: ListView<R>) -> anyhow::Result<()> {
    println!("Loading...");
    if let Err(err) = view.open().await {
        warn!(resource = R::KIND.path(), error = %err, "initial load failed");
    }
    println!("{}", view.render().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}> ", R::KIND.path());
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match line.parse::<ViewCommand>() {
            Ok(command) => command,
            Err(CommandError::Empty) => continue,
            Err(err) => {
                println!("Error: {err}");
                continue;
            }
        };
        if command.fetches() {
            println!("Loading...");
        }
        match view.execute(command).await {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => println!("Error: {err:#}"),
        }
        println!("{}", view.render().await);
    }

    view.close().await;
    Ok(())
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
