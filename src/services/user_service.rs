use std::sync::Arc;

use super::{require_role, ServiceError};
use crate::database::models::{RoleRecord, User, UserUpdate};
use crate::database::store::{Store, UserStore};
use crate::types::Role;

const MAX_USER_PAGE: i64 = 100;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get(&self, actor: &User, id: i64) -> Result<User, ServiceError> {
        require_role(actor, &[Role::Admin, Role::Teacher])?;
        self.find(id).await
    }

    /// `skip` is floored at 0 and `limit` clamped to 1..=100
    pub async fn list(&self, actor: &User, skip: Option<i64>, limit: Option<i64>) -> Result<Vec<User>, ServiceError> {
        require_role(actor, &[Role::Admin])?;
        let skip = skip.unwrap_or(0).max(0);
        let limit = limit.unwrap_or(MAX_USER_PAGE).clamp(1, MAX_USER_PAGE);
        Ok(self.store.list_users(skip, limit).await?)
    }

    pub async fn update_me(&self, actor: &User, input: UserUpdate) -> Result<User, ServiceError> {
        self.apply(actor.id, input).await
    }

    pub async fn update_by_id(&self, actor: &User, id: i64, input: UserUpdate) -> Result<User, ServiceError> {
        require_role(actor, &[Role::Admin])?;
        self.apply(id, input).await
    }

    pub async fn delete(&self, actor: &User, id: i64) -> Result<(), ServiceError> {
        require_role(actor, &[Role::Admin])?;
        if !self.store.delete_user(id).await? {
            return Err(ServiceError::not_found("User"));
        }
        tracing::info!("User {} deleted user {}", actor.id, id);
        Ok(())
    }

    pub async fn roles(&self) -> Result<Vec<RoleRecord>, ServiceError> {
        Ok(self.store.roles().await?)
    }

    async fn find(&self, id: i64) -> Result<User, ServiceError> {
        self.store
            .user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    async fn apply(&self, id: i64, input: UserUpdate) -> Result<User, ServiceError> {
        let patch = input.into_patch()?;
        if let Some(email) = &patch.email {
            if let Some(owner) = self.store.user_by_email(email).await? {
                if owner.id != id {
                    return Err(ServiceError::Conflict("Email already registered".to_string()));
                }
            }
        }
        self.store
            .update_user(id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::testing::new_user;

    async fn setup() -> (UserService, User, User, User) {
        let store = Arc::new(MemoryStore::new());
        let admin = store.insert_user(new_user("admin", Role::Admin)).await.unwrap();
        let teacher = store.insert_user(new_user("teacher", Role::Teacher)).await.unwrap();
        let student = store.insert_user(new_user("student", Role::Student)).await.unwrap();
        (UserService::new(store), admin, teacher, student)
    }

    #[tokio::test]
    async fn listing_and_deleting_need_admin() {
        let (service, admin, teacher, student) = setup().await;
        assert_eq!(service.list(&admin, None, None).await.unwrap().len(), 3);
        assert_eq!(service.list(&admin, Some(1), Some(1)).await.unwrap()[0].id, teacher.id);
        assert!(matches!(service.list(&teacher, None, None).await, Err(ServiceError::Forbidden(_))));

        assert!(matches!(service.delete(&teacher, student.id).await, Err(ServiceError::Forbidden(_))));
        service.delete(&admin, student.id).await.unwrap();
        assert!(matches!(service.delete(&admin, student.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn teachers_can_read_users_but_students_cannot() {
        let (service, _, teacher, student) = setup().await;
        assert_eq!(service.get(&teacher, student.id).await.unwrap().username, "student");
        assert!(matches!(service.get(&student, teacher.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(service.get(&teacher, 999).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn updates_merge_fields_and_guard_email() {
        let (service, admin, teacher, student) = setup().await;
        let me = service
            .update_me(&student, UserUpdate { country: Some("AR".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(me.country.as_deref(), Some("AR"));
        assert_eq!(me.name, student.name);

        let taken = UserUpdate { email: Some(teacher.email.clone()), ..Default::default() };
        assert!(matches!(service.update_me(&student, taken).await, Err(ServiceError::Conflict(_))));

        let same = UserUpdate { email: Some(student.email.clone()), ..Default::default() };
        assert!(service.update_me(&student, same).await.is_ok());

        let deactivate = UserUpdate { is_active: Some(false), ..Default::default() };
        assert!(matches!(
            service.update_by_id(&teacher, student.id, deactivate.clone()).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(!service.update_by_id(&admin, student.id, deactivate).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn roles_are_fixed() {
        let (service, ..) = setup().await;
        let names: Vec<String> = service.roles().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["admin", "teacher", "student"]);
    }
}
