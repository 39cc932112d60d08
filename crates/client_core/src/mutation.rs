use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    api::ResourceApi,
    controller::ResourceListController,
    error::{ApiError, MutationError, MutationKind},
    resource::Resource,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogVisibility {
    pub add: bool,
    pub edit: bool,
}

/// Runs create/update/delete calls and refreshes the list only after the
/// server has accepted the change.
pub struct MutationCoordinator<R: Resource> {
    api: Arc<dyn ResourceApi<R>>,
    list: ResourceListController<R>,
    dialogs: DialogVisibility,
}

impl<R: Resource> MutationCoordinator<R> {
    pub fn new(list: ResourceListController<R>) -> Self {
        Self {
            api: list.api(),
            list,
            dialogs: DialogVisibility::default(),
        }
    }

    pub fn dialogs(&self) -> DialogVisibility {
        self.dialogs
    }

    pub fn open_add(&mut self) {
        self.dialogs.add = true;
    }

    pub fn close_add(&mut self) {
        self.dialogs.add = false;
    }

    pub fn open_edit(&mut self) {
        self.dialogs.edit = true;
    }

    pub fn close_edit(&mut self) {
        self.dialogs.edit = false;
    }

    /// On failure the add dialog stays open.
    pub async fn create(&mut self, payload: &R::Add) -> Result<R, MutationError> {
        match self.api.create(payload).await {
            Ok(created) => {
                info!(resource = R::KIND.path(), id = ?created.id(), "created");
                self.dialogs.add = false;
                self.refresh().await;
                Ok(created)
            }
            Err(source) => Err(self.failed(MutationKind::Create, source)),
        }
    }

    /// On failure the edit dialog stays open.
    pub async fn update(&mut self, payload: &R::Edit) -> Result<(), MutationError> {
        let Some(id) = R::edit_id(payload) else {
            return Err(self.failed(MutationKind::Update, ApiError::MissingId));
        };
        match self.api.update(payload).await {
            Ok(()) => {
                info!(resource = R::KIND.path(), %id, "updated");
                self.dialogs.edit = false;
                self.refresh().await;
                Ok(())
            }
            Err(source) => Err(self.failed(MutationKind::Update, source)),
        }
    }

    /// The list is left untouched on failure; nothing is removed locally.
    pub async fn remove(&mut self, id: R::Id) -> Result<(), MutationError> {
        match self.api.remove(id).await {
            Ok(()) => {
                info!(resource = R::KIND.path(), %id, "deleted");
                self.refresh().await;
                Ok(())
            }
            Err(source) => Err(self.failed(MutationKind::Delete, source)),
        }
    }

    async fn refresh(&self) {
        // A failed refetch is already recorded in the list state.
        if let Err(err) = self.list.refetch_current_page().await {
            warn!(resource = R::KIND.path(), error = %err, "refetch after mutation failed");
        }
    }

    fn failed(&self, kind: MutationKind, source: ApiError) -> MutationError {
        error!(resource = R::KIND.path(), %kind, error = %source, "mutation failed");
        MutationError {
            kind,
            resource: R::KIND.path(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
