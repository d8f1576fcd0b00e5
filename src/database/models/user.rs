use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{check_len, check_required, InputError};
use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub language: String,
    pub id_rol: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.id_rol)
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        self.role().map(|r| roles.contains(&r)).unwrap_or(false)
    }

    /// Overwrite the mutable profile fields present in `patch`
    pub fn apply(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(country) = patch.country {
            self.country = Some(country);
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        self.updated_at = now;
    }
}

/// A user ready to be inserted; `password` already holds the stored hash
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub country: Option<String>,
    pub email: String,
    pub username: String,
    pub password: String,
    pub language: String,
    pub id_rol: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub is_active: Option<bool>,
}

/// PUT /api/users/me and /api/users/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub country: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    pub fn into_patch(self) -> Result<UserPatch, InputError> {
        if let Some(name) = &self.name {
            check_required("name", name, 100)?;
        }
        if let Some(country) = &self.country {
            check_len("country", country, 100)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(language) = &self.language {
            check_required("language", language, 10)?;
        }
        Ok(UserPatch {
            name: self.name,
            country: self.country,
            email: self.email,
            language: self.language,
            is_active: self.is_active,
        })
    }
}

pub(crate) fn check_email(email: &str) -> Result<(), InputError> {
    check_required("email", email, 255)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid {
        return Err(InputError::Invalid {
            field: "email",
            message: "not a valid email address".to_string(),
        });
    }
    Ok(())
}

/// User as shown to other users
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    pub email: String,
    pub username: String,
    pub language: String,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&User> for UserPublic {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            country: user.country.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            language: user.language.clone(),
            role: user.role().map(|r| r.name().to_string()),
            created_at: user.created_at,
            is_active: user.is_active,
        }
    }
}

/// User as shown to themselves and to admins
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    #[serde(flatten)]
    pub public: UserPublic,
    pub id_rol: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            public: UserPublic::from(user),
            id_rol: user.id_rol,
            updated_at: user.updated_at,
        }
    }
}
