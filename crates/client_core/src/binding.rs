use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::resource::{resolve_relation, Denormalize, HasRelations};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("no record is bound to the form")]
    Unbound,
}

/// A form payload whose fields are edited through tagged updates.
pub trait Editable {
    type Field: Clone + fmt::Debug;

    fn apply(&mut self, field: Self::Field);

    /// Maps a wire field name and raw text onto a typed update.
    fn parse_field(name: &str, value: &str) -> Result<Self::Field, FieldError>;
}

/// Local editable copy of a record while its dialog is open.
#[derive(Debug, Clone)]
pub struct DialogFormBinding<T> {
    source: Option<T>,
    draft: Option<T>,
}

impl<T> Default for DialogFormBinding<T> {
    fn default() -> Self {
        Self {
            source: None,
            draft: None,
        }
    }
}

impl<T> DialogFormBinding<T>
where
    T: Editable + Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-syncs the draft when `source` differs from the last bound record.
    /// Returns `true` when the draft was replaced; unsaved edits are dropped.
    pub fn bind(&mut self, source: &T) -> bool {
        if self.source.as_ref() == Some(source) {
            return false;
        }
        debug!("rebinding form to a different record");
        self.source = Some(source.clone());
        self.draft = Some(source.clone());
        true
    }

    pub fn bind_blank(&mut self)
    where
        T: Default,
    {
        self.source = Some(T::default());
        self.draft = Some(T::default());
    }

    pub fn set_field(&mut self, field: T::Field) -> Result<(), FieldError> {
        let draft = self.draft.as_mut().ok_or(FieldError::Unbound)?;
        draft.apply(field);
        Ok(())
    }

    pub fn set_field_text(&mut self, name: &str, value: &str) -> Result<(), FieldError> {
        let field = T::parse_field(name, value)?;
        self.set_field(field)
    }

    pub fn set_relation_ids<R>(&mut self, ids: &[R::Id], reference: &[R]) -> Result<(), FieldError>
    where
        R: Denormalize,
        T: HasRelations<R>,
    {
        let draft = self.draft.as_mut().ok_or(FieldError::Unbound)?;
        draft.set_relation(resolve_relation(ids, reference));
        Ok(())
    }

    /// The draft as it stands; the binding keeps it until the next `bind`.
    pub fn commit(&self) -> Option<T> {
        self.draft.clone()
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.draft.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.source
    }

    pub fn clear(&mut self) {
        self.source = None;
        self.draft = None;
    }
}

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod tests;
