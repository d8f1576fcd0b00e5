use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{check_required, InputError};

/// A user-owned study group. Noun groups and verb groups share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StudyGroup {
    pub id: i64,
    pub name_group: String,
    pub id_user: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInput {
    pub name_group: String,
}

impl GroupInput {
    pub fn validate(&self) -> Result<(), InputError> {
        check_required("name_group", &self.name_group, 100)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupUpdate {
    pub name_group: Option<String>,
}

impl GroupUpdate {
    pub fn validate(&self) -> Result<(), InputError> {
        match &self.name_group {
            Some(name) => check_required("name_group", name, 100),
            None => Ok(()),
        }
    }
}
