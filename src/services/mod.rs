pub mod auth_service;
pub mod entry_service;
pub mod error;
pub mod group_service;
pub mod query_engine;
pub mod student_service;
pub mod user_service;

pub use auth_service::{AuthService, LoginRequest, RegisterRequest, TokenResponse};
pub use entry_service::EntryService;
pub use error::ServiceError;
pub use group_service::{GroupDetail, GroupService};
pub use query_engine::{ListCriteria, ListRequest, Page, QueryEngine, QueryError};
pub use student_service::{ProgressCounters, StudentProgress, StudentService};
pub use user_service::UserService;

use crate::database::models::User;
use crate::types::Role;

/// Fails with `Forbidden` unless the actor holds one of `roles`
pub fn require_role(actor: &User, roles: &[Role]) -> Result<(), ServiceError> {
    if actor.has_role(roles) {
        return Ok(());
    }
    let names: Vec<&str> = roles.iter().map(|r| r.name()).collect();
    Err(ServiceError::Forbidden(format!("Requires {} role", names.join(" or "))))
}
