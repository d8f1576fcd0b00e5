use std::sync::Arc;

use super::query_engine::{ListRequest, Page, QueryEngine};
use super::{require_role, ServiceError};
use crate::config::ApiConfig;
use crate::database::models::{Entry, Noun, NounCreate, NounUpdate, User, Verb, VerbCreate, VerbUpdate};
use crate::database::store::{EntryStore, Store};
use crate::filter::{Predicate, Window};
use crate::types::Role;

const EDITORS: [Role; 2] = [Role::Admin, Role::Teacher];

/// CRUD and listing for nouns and verbs
#[derive(Clone)]
pub struct EntryService {
    store: Arc<dyn Store>,
    engine: QueryEngine,
    api: ApiConfig,
}

impl EntryService {
    pub fn new(store: Arc<dyn Store>, engine: QueryEngine, api: ApiConfig) -> Self {
        Self { store, engine, api }
    }

    pub async fn list<E>(&self, request: ListRequest) -> Result<Page<E>, ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        let criteria = request.into_criteria(E::KIND, &self.api)?;
        Ok(self.engine.list(self.store.as_ref(), &criteria).await?)
    }

    pub async fn get<E>(&self, id: i64) -> Result<E, ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        EntryStore::<E>::get(self.store.as_ref(), id)
            .await?
            .ok_or_else(|| ServiceError::not_found(E::KIND.label()))
    }

    pub async fn verb_by_pair(&self, pair_id: &str) -> Result<Verb, ServiceError> {
        self.find_by_name::<Verb>(pair_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Verb pair"))
    }

    pub async fn create_noun(&self, actor: &User, input: NounCreate) -> Result<Noun, ServiceError> {
        require_role(actor, &EDITORS)?;
        let draft = input.into_draft()?;
        self.ensure_unique::<Noun>(&draft.noun, None).await?;
        let noun = EntryStore::<Noun>::insert(self.store.as_ref(), draft).await?;
        tracing::info!("Created noun {} ({})", noun.id, noun.noun);
        Ok(noun)
    }

    pub async fn update_noun(&self, actor: &User, id: i64, input: NounUpdate) -> Result<Noun, ServiceError> {
        require_role(actor, &EDITORS)?;
        let patch = input.into_patch()?;
        let current: Noun = self.get(id).await?;
        if let Some(noun) = &patch.noun {
            if noun != &current.noun {
                self.ensure_unique::<Noun>(noun, Some(id)).await?;
            }
        }
        EntryStore::<Noun>::update(self.store.as_ref(), id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Noun"))
    }

    pub async fn create_verb(&self, actor: &User, input: VerbCreate) -> Result<Verb, ServiceError> {
        require_role(actor, &EDITORS)?;
        let draft = input.into_draft()?;
        self.ensure_unique::<Verb>(&draft.verb_pair_id, None).await?;
        let verb = EntryStore::<Verb>::insert(self.store.as_ref(), draft).await?;
        tracing::info!("Created verb {} ({})", verb.id, verb.verb_pair_id);
        Ok(verb)
    }

    pub async fn update_verb(&self, actor: &User, id: i64, input: VerbUpdate) -> Result<Verb, ServiceError> {
        require_role(actor, &EDITORS)?;
        let patch = input.into_patch()?;
        let current: Verb = self.get(id).await?;
        if let Some(pair) = &patch.verb_pair_id {
            if pair != &current.verb_pair_id {
                self.ensure_unique::<Verb>(pair, Some(id)).await?;
            }
        }
        EntryStore::<Verb>::update(self.store.as_ref(), id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("Verb"))
    }

    pub async fn delete<E>(&self, actor: &User, id: i64) -> Result<(), ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        require_role(actor, &EDITORS)?;
        if !EntryStore::<E>::delete(self.store.as_ref(), id).await? {
            return Err(ServiceError::not_found(E::KIND.label()));
        }
        tracing::info!("Deleted {} {}", E::KIND.label().to_lowercase(), id);
        Ok(())
    }

    async fn find_by_name<E>(&self, name: &str) -> Result<Option<E>, ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        let rows = EntryStore::<E>::query(
            self.store.as_ref(),
            &[Predicate::equals(E::KIND.name_column(), name)],
            Window::page(0, 1),
        )
        .await?;
        Ok(rows.into_iter().next())
    }

    async fn ensure_unique<E>(&self, name: &str, except: Option<i64>) -> Result<(), ServiceError>
    where
        E: Entry,
        dyn Store: EntryStore<E>,
    {
        match self.find_by_name::<E>(name).await? {
            Some(existing) if Some(existing.id()) != except => Err(ServiceError::Conflict(format!(
                "{} '{}' already exists",
                E::KIND.label(),
                name
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::store::UserStore;
    use crate::database::MemoryStore;
    use crate::testing::{new_user, noun_create, verb_create};
    use serde_json::json;

    async fn setup() -> (EntryService, User, User) {
        let store = Arc::new(MemoryStore::new());
        let teacher = store.insert_user(new_user("teacher", Role::Teacher)).await.unwrap();
        let student = store.insert_user(new_user("student", Role::Student)).await.unwrap();
        let config = AppConfig::development();
        let service = EntryService::new(store, QueryEngine::new(config.filter), config.api);
        (service, teacher, student)
    }

    #[tokio::test]
    async fn students_cannot_write() {
        let (service, _, student) = setup().await;
        let err = service
            .create_noun(&student, noun_create("дом", "masculine", json!([])))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let (service, teacher, _) = setup().await;
        service.create_noun(&teacher, noun_create("дом", "masculine", json!([]))).await.unwrap();
        let err = service
            .create_noun(&teacher, noun_create("дом", "masculine", json!([])))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        service.create_verb(&teacher, verb_create("a_b", 1, json!([]))).await.unwrap();
        let other = service.create_verb(&teacher, verb_create("c_d", 2, json!([]))).await.unwrap();
        let err = service
            .update_verb(
                &teacher,
                other.id,
                VerbUpdate { verb_pair_id: Some("a_b".to_string()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_keeps_unchanged_unique_key_and_normalizes() {
        let (service, teacher, _) = setup().await;
        let noun = service.create_noun(&teacher, noun_create("дом", "masculine", json!([]))).await.unwrap();
        let updated = service
            .update_noun(
                &teacher,
                noun.id,
                NounUpdate {
                    noun: Some("дом".to_string()),
                    translations: Some(json!({"language": "es", "translation": "casa"})),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.translations.to_value(), json!([{"es": ["casa"]}]));
        assert!(updated.updated_at >= noun.updated_at);
    }

    #[tokio::test]
    async fn lookups_and_deletes_report_missing_records() {
        let (service, teacher, _) = setup().await;
        assert!(matches!(service.get::<Noun>(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.verb_by_pair("x_y").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete::<Verb>(&teacher, 42).await, Err(ServiceError::NotFound(_))));

        let verb = service.create_verb(&teacher, verb_create("x_y", 1, json!([]))).await.unwrap();
        assert_eq!(service.verb_by_pair("x_y").await.unwrap().id, verb.id);
        service.delete::<Verb>(&teacher, verb.id).await.unwrap();
        assert!(service.get::<Verb>(verb.id).await.is_err());
    }
}
