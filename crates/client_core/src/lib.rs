//! Generic paginated list, mutation and form-binding core for the TeamSphere
//! admin client.

pub mod api;
pub mod binding;
pub mod controller;
pub mod error;
pub mod fields;
pub mod mutation;
pub mod paging;
pub mod reference;
pub mod resource;
pub mod sort;

pub use api::{HttpApi, ResourceApi};
pub use binding::{DialogFormBinding, Editable, FieldError};
pub use controller::{
    ControllerOptions, FetchOutcome, ListPhase, ListSnapshot, ResourceListController,
};
pub use error::{ApiError, FetchError, MutationError, MutationKind};
pub use mutation::{DialogVisibility, MutationCoordinator};
pub use paging::{PageRequest, PageResult, PageState, ALLOWED_PAGE_SIZES, DEFAULT_PAGE_SIZE};
pub use resource::{Denormalize, HasRelations, Resource};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
