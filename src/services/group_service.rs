use std::sync::Arc;

use super::ServiceError;
use crate::database::models::{Entry, GroupInput, GroupUpdate, StudyGroup, User};
use crate::database::store::{EntryStore, GroupStore, Store, UserStore};
use crate::filter::{Predicate, Window};
use crate::types::{EntryKind, Role};

/// A group together with its member entries
#[derive(Debug, Clone)]
pub struct GroupDetail<E> {
    pub group: StudyGroup,
    pub members: Vec<E>,
}

/// Study groups of nouns or verbs. Students may read only their own groups and
/// those of their teachers; writes are owner-only.
#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn Store>,
}

fn group_label(kind: EntryKind) -> String {
    format!("{} group", kind.label())
}

impl GroupService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// The actor's own groups, followed by those of their teachers if the actor is a student
    pub async fn list(&self, kind: EntryKind, actor: &User) -> Result<Vec<StudyGroup>, ServiceError> {
        let mut groups = self.store.list_groups(kind, &[actor.id]).await?;
        if actor.role() == Some(Role::Student) {
            let teachers = self.store.teacher_ids_of(actor.id).await?;
            if !teachers.is_empty() {
                groups.extend(self.store.list_groups(kind, &teachers).await?);
            }
        }
        Ok(groups)
    }

    pub async fn get<E>(&self, actor: &User, id: i64) -> Result<GroupDetail<E>, ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        let group = self.find(E::KIND, id).await?;
        if actor.role() == Some(Role::Student) && group.id_user != actor.id {
            let teachers = self.store.teacher_ids_of(actor.id).await?;
            if !teachers.contains(&group.id_user) {
                return Err(ServiceError::Forbidden("Not authorized to access this group".to_string()));
            }
        }

        let ids = self.store.member_ids(E::KIND, id).await?;
        let members = if ids.is_empty() {
            Vec::new()
        } else {
            let values = ids.into_iter().map(serde_json::Value::from).collect();
            EntryStore::<E>::query(
                self.store.as_ref(),
                &[Predicate::OneOf { column: "id".to_string(), values }],
                Window::all(),
            )
            .await?
        };
        Ok(GroupDetail { group, members })
    }

    pub async fn create(&self, kind: EntryKind, actor: &User, input: GroupInput) -> Result<StudyGroup, ServiceError> {
        input.validate()?;
        let group = self.store.create_group(kind, actor.id, &input.name_group).await?;
        tracing::info!("User {} created {} {}", actor.id, kind.group_table(), group.id);
        Ok(group)
    }

    pub async fn update(
        &self,
        kind: EntryKind,
        actor: &User,
        id: i64,
        input: GroupUpdate,
    ) -> Result<StudyGroup, ServiceError> {
        input.validate()?;
        let group = self.owned(kind, actor, id, "update").await?;
        match input.name_group {
            Some(name) => self
                .store
                .rename_group(kind, id, &name)
                .await?
                .ok_or_else(|| ServiceError::not_found(&group_label(kind))),
            None => Ok(group),
        }
    }

    pub async fn delete(&self, kind: EntryKind, actor: &User, id: i64) -> Result<(), ServiceError> {
        self.owned(kind, actor, id, "delete").await?;
        self.store.delete_group(kind, id).await?;
        Ok(())
    }

    pub async fn add_member<E>(&self, actor: &User, group_id: i64, entry_id: i64) -> Result<String, ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        self.owned(E::KIND, actor, group_id, "modify").await?;
        if EntryStore::<E>::get(self.store.as_ref(), entry_id).await?.is_none() {
            return Err(ServiceError::not_found(E::KIND.label()));
        }
        self.store.link(E::KIND, group_id, entry_id).await?;
        Ok(format!("{} added to group successfully", E::KIND.label()))
    }

    /// Removing an entry that is not a member is not an error
    pub async fn remove_member(
        &self,
        kind: EntryKind,
        actor: &User,
        group_id: i64,
        entry_id: i64,
    ) -> Result<(), ServiceError> {
        self.owned(kind, actor, group_id, "modify").await?;
        self.store.unlink(kind, group_id, entry_id).await?;
        Ok(())
    }

    async fn find(&self, kind: EntryKind, id: i64) -> Result<StudyGroup, ServiceError> {
        self.store
            .get_group(kind, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(&group_label(kind)))
    }

    async fn owned(&self, kind: EntryKind, actor: &User, id: i64, action: &str) -> Result<StudyGroup, ServiceError> {
        let group = self.find(kind, id).await?;
        if group.id_user != actor.id {
            return Err(ServiceError::Forbidden(format!("Not authorized to {} this group", action)));
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Noun;
    use crate::database::MemoryStore;
    use crate::testing::{new_user, noun_draft};
    use serde_json::json;

    struct Fixture {
        service: GroupService,
        store: Arc<MemoryStore>,
        teacher: User,
        student: User,
        outsider: User,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let teacher = store.insert_user(new_user("teacher", Role::Teacher)).await.unwrap();
        let student = store.insert_user(new_user("student", Role::Student)).await.unwrap();
        let outsider = store.insert_user(new_user("outsider", Role::Student)).await.unwrap();
        store.link_student(student.id, teacher.id).await.unwrap();
        Fixture {
            service: GroupService::new(store.clone()),
            store,
            teacher,
            student,
            outsider,
        }
    }

    fn named(name: &str) -> GroupInput {
        GroupInput { name_group: name.to_string() }
    }

    #[tokio::test]
    async fn students_see_their_teachers_groups() {
        let f = fixture().await;
        f.service.create(EntryKind::Noun, &f.teacher, named("animals")).await.unwrap();
        f.service.create(EntryKind::Noun, &f.student, named("mine")).await.unwrap();

        let names: Vec<String> = f
            .service
            .list(EntryKind::Noun, &f.student)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name_group)
            .collect();
        assert_eq!(names, vec!["mine", "animals"]);

        assert!(f.service.list(EntryKind::Noun, &f.outsider).await.unwrap().is_empty());
        assert!(f.service.list(EntryKind::Verb, &f.student).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_access_follows_teacher_links() {
        let f = fixture().await;
        let group = f.service.create(EntryKind::Noun, &f.teacher, named("animals")).await.unwrap();

        assert!(f.service.get::<Noun>(&f.student, group.id).await.is_ok());
        assert!(matches!(
            f.service.get::<Noun>(&f.outsider, group.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.get::<Noun>(&f.teacher, 99).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn membership_is_owner_only_and_unique() {
        let f = fixture().await;
        let group = f.service.create(EntryKind::Noun, &f.teacher, named("animals")).await.unwrap();
        let noun = EntryStore::<Noun>::insert(f.store.as_ref(), noun_draft("кот", json!([{"es": ["gato"]}])))
            .await
            .unwrap();

        let msg = f.service.add_member::<Noun>(&f.teacher, group.id, noun.id).await.unwrap();
        assert_eq!(msg, "Noun added to group successfully");
        assert!(matches!(
            f.service.add_member::<Noun>(&f.teacher, group.id, noun.id).await,
            Err(ServiceError::Store(crate::database::StoreError::Conflict(_)))
        ));
        assert!(matches!(
            f.service.add_member::<Noun>(&f.student, group.id, noun.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(matches!(
            f.service.add_member::<Noun>(&f.teacher, group.id, 77).await,
            Err(ServiceError::NotFound(_))
        ));

        let detail = f.service.get::<Noun>(&f.teacher, group.id).await.unwrap();
        assert_eq!(detail.members.iter().map(|n| n.id).collect::<Vec<_>>(), vec![noun.id]);

        f.service.remove_member(EntryKind::Noun, &f.teacher, group.id, noun.id).await.unwrap();
        f.service.remove_member(EntryKind::Noun, &f.teacher, group.id, noun.id).await.unwrap();
        assert!(f.service.get::<Noun>(&f.teacher, group.id).await.unwrap().members.is_empty());
    }

    #[tokio::test]
    async fn deleting_an_entry_or_group_drops_its_links() {
        let f = fixture().await;
        let group = f.service.create(EntryKind::Noun, &f.teacher, named("g")).await.unwrap();
        let noun = EntryStore::<Noun>::insert(f.store.as_ref(), noun_draft("кот", json!([])))
            .await
            .unwrap();
        f.service.add_member::<Noun>(&f.teacher, group.id, noun.id).await.unwrap();

        EntryStore::<Noun>::delete(f.store.as_ref(), noun.id).await.unwrap();
        assert!(f.store.member_ids(EntryKind::Noun, group.id).await.unwrap().is_empty());

        let renamed = f
            .service
            .update(EntryKind::Noun, &f.teacher, group.id, GroupUpdate { name_group: Some("h".into()) })
            .await
            .unwrap();
        assert_eq!(renamed.name_group, "h");
        assert!(matches!(
            f.service.delete(EntryKind::Noun, &f.student, group.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        f.service.delete(EntryKind::Noun, &f.teacher, group.id).await.unwrap();
        assert!(f.store.get_group(EntryKind::Noun, group.id).await.unwrap().is_none());
    }
}
