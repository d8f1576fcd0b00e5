use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoleRecord {
    pub id: i32,
    pub name: String,
}

impl From<Role> for RoleRecord {
    fn from(role: Role) -> Self {
        Self {
            id: role.id(),
            name: role.name().to_string(),
        }
    }
}
