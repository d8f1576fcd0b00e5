pub mod group;
pub mod noun;
pub mod role;
pub mod user;
pub mod verb;

pub use group::{GroupInput, GroupUpdate, StudyGroup};
pub use noun::{Noun, NounCreate, NounDraft, NounPatch, NounRow, NounUpdate};
pub use role::RoleRecord;
pub use user::{NewUser, User, UserPatch, UserPublic, UserResponse, UserUpdate};
pub use verb::{Verb, VerbCreate, VerbDraft, VerbPatch, VerbRow, VerbUpdate};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::normalize::{NormalizeError, Translations};
use crate::types::EntryKind;

/// A translatable vocabulary record stored by a [`crate::database::store::EntryStore`]
pub trait Entry: Clone + Send + Sync + Serialize + 'static {
    const KIND: EntryKind;

    /// Validated, canonical input for a new record
    type Draft: Send + Sync + 'static;
    /// Partial update; `None` fields are left untouched
    type Patch: Send + Sync + 'static;

    fn id(&self) -> i64;

    fn translations(&self) -> &Translations;

    /// Value of a scalar column, used by stores that evaluate predicates in memory
    fn column(&self, name: &str) -> Option<Value>;

    fn from_draft(id: i64, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}

/// Rejected request input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl InputError {
    pub fn field(&self) -> String {
        match self {
            InputError::Normalize(e) => e.path().to_string(),
            InputError::TooLong { field, .. }
            | InputError::Empty { field }
            | InputError::Invalid { field, .. } => field.to_string(),
        }
    }

    pub fn field_errors(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(self.field(), self.to_string());
        map
    }
}

pub(crate) fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), InputError> {
    if value.chars().count() > max {
        return Err(InputError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn check_required(field: &'static str, value: &str, max: usize) -> Result<(), InputError> {
    if value.trim().is_empty() {
        return Err(InputError::Empty { field });
    }
    check_len(field, value, max)
}
