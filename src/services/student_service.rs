use serde::Serialize;
use std::sync::Arc;

use super::{require_role, ServiceError};
use crate::database::models::User;
use crate::database::store::{Store, UserStore};
use crate::types::Role;

/// Practice counters; nothing records practice yet, so they are always zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressCounters {
    pub verbs_learned: i64,
    pub nouns_learned: i64,
    pub total_practice_sessions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentProgress {
    pub student_id: i64,
    pub progress: ProgressCounters,
}

/// Teacher-side management of linked students
#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn Store>,
}

impl StudentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, teacher: &User) -> Result<Vec<User>, ServiceError> {
        require_role(teacher, &[Role::Teacher])?;
        Ok(self.store.students_of(teacher.id).await?)
    }

    /// Returns the newly linked student
    pub async fn link(&self, teacher: &User, student_id: i64) -> Result<User, ServiceError> {
        require_role(teacher, &[Role::Teacher])?;
        let student = self
            .store
            .user_by_id(student_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Student"))?;
        if student.role() != Some(Role::Student) {
            return Err(ServiceError::BadRequest("User is not a student".to_string()));
        }
        self.store.link_student(student_id, teacher.id).await?;
        tracing::info!("Teacher {} linked student {}", teacher.id, student_id);
        Ok(student)
    }

    pub async fn unlink(&self, teacher: &User, student_id: i64) -> Result<(), ServiceError> {
        require_role(teacher, &[Role::Teacher])?;
        if !self.store.unlink_student(student_id, teacher.id).await? {
            return Err(ServiceError::not_found("Link"));
        }
        Ok(())
    }

    pub async fn progress(&self, teacher: &User, student_id: i64) -> Result<StudentProgress, ServiceError> {
        require_role(teacher, &[Role::Teacher])?;
        if !self.store.is_linked(student_id, teacher.id).await? {
            return Err(ServiceError::NotFound("Student not linked to this teacher".to_string()));
        }
        Ok(StudentProgress {
            student_id,
            progress: ProgressCounters::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, StoreError};
    use crate::testing::new_user;

    async fn setup() -> (StudentService, User, User, User) {
        let store = Arc::new(MemoryStore::new());
        let teacher = store.insert_user(new_user("teacher", Role::Teacher)).await.unwrap();
        let other = store.insert_user(new_user("other", Role::Teacher)).await.unwrap();
        let student = store.insert_user(new_user("student", Role::Student)).await.unwrap();
        (StudentService::new(store), teacher, other, student)
    }

    #[tokio::test]
    async fn link_lifecycle() {
        let (service, teacher, _, student) = setup().await;
        let linked = service.link(&teacher, student.id).await.unwrap();
        assert_eq!(linked.id, student.id);
        assert!(matches!(
            service.link(&teacher, student.id).await,
            Err(ServiceError::Store(StoreError::Conflict(_)))
        ));
        let listed: Vec<i64> = service.list(&teacher).await.unwrap().iter().map(|u| u.id).collect();
        assert_eq!(listed, vec![student.id]);

        let progress = service.progress(&teacher, student.id).await.unwrap();
        assert_eq!(progress.progress, ProgressCounters::default());

        service.unlink(&teacher, student.id).await.unwrap();
        assert!(matches!(service.unlink(&teacher, student.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.progress(&teacher, student.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn only_students_can_be_linked() {
        let (service, teacher, other, _) = setup().await;
        assert!(matches!(service.link(&teacher, other.id).await, Err(ServiceError::BadRequest(_))));
        assert!(matches!(service.link(&teacher, 404).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn endpoints_require_teacher_role() {
        let (service, _, _, student) = setup().await;
        assert!(matches!(service.list(&student).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(service.link(&student, student.id).await, Err(ServiceError::Forbidden(_))));
    }

    #[test]
    fn progress_serializes_nested_counters() {
        let v = serde_json::to_value(StudentProgress { student_id: 3, progress: ProgressCounters::default() }).unwrap();
        assert_eq!(v["progress"]["total_practice_sessions"], 0);
    }
}
