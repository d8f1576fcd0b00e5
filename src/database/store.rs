//! Storage seams. The query engine and services only see these traits;
//! [`super::postgres::PgStore`] and [`super::memory::MemoryStore`] implement them.

use async_trait::async_trait;
use thiserror::Error;

use super::manager::DatabaseError;
use super::models::{
    Entry, NewUser, Noun, RoleRecord, StudyGroup, User, UserPatch, Verb,
};
use crate::filter::{Predicate, Window};
use crate::normalize::NormalizeError;
use crate::types::EntryKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// A stored structured field could not be parsed
    #[error("Stored record is malformed: {0}")]
    Invalid(#[from] NormalizeError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => {
                    return StoreError::Conflict(
                        db_err
                            .constraint()
                            .map(|c| format!("Duplicate value violates {}", c))
                            .unwrap_or_else(|| "Duplicate value".to_string()),
                    )
                }
                Some("23503") => return StoreError::NotFound("Referenced record".to_string()),
                _ => {}
            }
        }
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Records of one entry kind
#[async_trait]
pub trait EntryStore<E: Entry>: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<E>, StoreError>;

    /// Rows matching every predicate, ordered by `id` ascending, within `window`
    async fn query(&self, predicates: &[Predicate], window: Window) -> Result<Vec<E>, StoreError>;

    async fn count(&self, predicates: &[Predicate]) -> Result<i64, StoreError>;

    /// Fails with `Conflict` when the record's unique key is taken
    async fn insert(&self, draft: E::Draft) -> Result<E, StoreError>;

    /// `Ok(None)` when no record has this id
    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, StoreError>;

    /// Removes the record and its group links; `false` when it did not exist
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

/// Study groups and their member links, keyed by entry kind
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Groups owned by any of `owners`, ordered by id
    async fn list_groups(&self, kind: EntryKind, owners: &[i64]) -> Result<Vec<StudyGroup>, StoreError>;

    async fn get_group(&self, kind: EntryKind, id: i64) -> Result<Option<StudyGroup>, StoreError>;

    async fn create_group(&self, kind: EntryKind, owner: i64, name: &str) -> Result<StudyGroup, StoreError>;

    async fn rename_group(&self, kind: EntryKind, id: i64, name: &str) -> Result<Option<StudyGroup>, StoreError>;

    async fn delete_group(&self, kind: EntryKind, id: i64) -> Result<bool, StoreError>;

    async fn member_ids(&self, kind: EntryKind, group_id: i64) -> Result<Vec<i64>, StoreError>;

    /// `Conflict` if the entry is already a member
    async fn link(&self, kind: EntryKind, group_id: i64, entry_id: i64) -> Result<(), StoreError>;

    async fn unlink(&self, kind: EntryKind, group_id: i64, entry_id: i64) -> Result<bool, StoreError>;
}

/// Users, roles and teacher/student links
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError>;

    /// `Conflict` when the username or email is taken
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, StoreError>;

    /// Also removes the user's groups and teacher/student links
    async fn delete_user(&self, id: i64) -> Result<bool, StoreError>;

    async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError>;

    /// `Conflict` when the pair is already linked
    async fn link_student(&self, student_id: i64, teacher_id: i64) -> Result<(), StoreError>;

    async fn unlink_student(&self, student_id: i64, teacher_id: i64) -> Result<bool, StoreError>;

    async fn is_linked(&self, student_id: i64, teacher_id: i64) -> Result<bool, StoreError>;

    async fn students_of(&self, teacher_id: i64) -> Result<Vec<User>, StoreError>;

    async fn teacher_ids_of(&self, student_id: i64) -> Result<Vec<i64>, StoreError>;
}

/// Everything the application needs from persistence
#[async_trait]
pub trait Store: EntryStore<Noun> + EntryStore<Verb> + GroupStore + UserStore {
    async fn health_check(&self) -> Result<(), StoreError>;
}
