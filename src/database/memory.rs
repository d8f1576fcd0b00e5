use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::models::{
    Entry, NewUser, Noun, RoleRecord, StudyGroup, User, UserPatch, Verb,
};
use super::store::{EntryStore, GroupStore, Store, StoreError, UserStore};
use crate::filter::{Predicate, Window};
use crate::types::{EntryKind, Role};

/// In-process store with the same observable behaviour as [`super::postgres::PgStore`].
/// Used by tests and by `ruso-api` when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), last_id: 0 }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct MemoryState {
    nouns: Table<Noun>,
    verbs: Table<Verb>,
    noun_groups: Table<StudyGroup>,
    verb_groups: Table<StudyGroup>,
    // (group, entry)
    noun_links: BTreeSet<(i64, i64)>,
    verb_links: BTreeSet<(i64, i64)>,
    users: Table<User>,
    // (student, teacher)
    student_links: BTreeSet<(i64, i64)>,
}

impl MemoryState {
    fn groups(&self, kind: EntryKind) -> &Table<StudyGroup> {
        match kind {
            EntryKind::Noun => &self.noun_groups,
            EntryKind::Verb => &self.verb_groups,
        }
    }

    fn groups_mut(&mut self, kind: EntryKind) -> &mut Table<StudyGroup> {
        match kind {
            EntryKind::Noun => &mut self.noun_groups,
            EntryKind::Verb => &mut self.verb_groups,
        }
    }

    fn links(&self, kind: EntryKind) -> &BTreeSet<(i64, i64)> {
        match kind {
            EntryKind::Noun => &self.noun_links,
            EntryKind::Verb => &self.verb_links,
        }
    }

    fn links_mut(&mut self, kind: EntryKind) -> &mut BTreeSet<(i64, i64)> {
        match kind {
            EntryKind::Noun => &mut self.noun_links,
            EntryKind::Verb => &mut self.verb_links,
        }
    }

    fn drop_group(&mut self, kind: EntryKind, id: i64) -> bool {
        let existed = self.groups_mut(kind).rows.remove(&id).is_some();
        self.links_mut(kind).retain(|(group, _)| *group != id);
        existed
    }
}

/// Per-kind access to the in-memory tables
pub trait MemoryEntry: Entry {
    fn table(state: &MemoryState) -> &Table<Self>;
    fn table_mut(state: &mut MemoryState) -> &mut Table<Self>;
    /// Value of the unique column
    fn unique_key(&self) -> &str;
}

impl MemoryEntry for Noun {
    fn table(state: &MemoryState) -> &Table<Self> {
        &state.nouns
    }
    fn table_mut(state: &mut MemoryState) -> &mut Table<Self> {
        &mut state.nouns
    }
    fn unique_key(&self) -> &str {
        &self.noun
    }
}

impl MemoryEntry for Verb {
    fn table(state: &MemoryState) -> &Table<Self> {
        &state.verbs
    }
    fn table_mut(state: &mut MemoryState) -> &mut Table<Self> {
        &mut state.verbs
    }
    fn unique_key(&self) -> &str {
        &self.verb_pair_id
    }
}

fn matches_all<E: Entry>(entry: &E, predicates: &[Predicate]) -> bool {
    predicates
        .iter()
        .all(|p| p.matches(entry.column(p.column()).as_ref()))
}

fn key_taken<E: MemoryEntry>(state: &MemoryState, key: &str, except: i64) -> bool {
    E::table(state)
        .rows
        .values()
        .any(|e| e.id() != except && e.unique_key() == key)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<E: MemoryEntry> EntryStore<E> for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<E>, StoreError> {
        let state = self.state.read().await;
        Ok(E::table(&state).rows.get(&id).cloned())
    }

    async fn query(&self, predicates: &[Predicate], window: Window) -> Result<Vec<E>, StoreError> {
        let state = self.state.read().await;
        // BTreeMap iteration is id-ascending
        let matching: Vec<E> = E::table(&state)
            .rows
            .values()
            .filter(|e| matches_all(*e, predicates))
            .cloned()
            .collect();
        Ok(window.slice(&matching))
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        let n = E::table(&state)
            .rows
            .values()
            .filter(|e| matches_all(*e, predicates))
            .count();
        Ok(n as i64)
    }

    async fn insert(&self, draft: E::Draft) -> Result<E, StoreError> {
        let mut state = self.state.write().await;
        let id = E::table(&state).last_id + 1;
        let entry = E::from_draft(id, draft, Utc::now());
        if key_taken::<E>(&state, entry.unique_key(), id) {
            return Err(StoreError::Conflict(format!(
                "{} '{}' already exists",
                E::KIND.label(),
                entry.unique_key()
            )));
        }
        let table = E::table_mut(&mut state);
        table.last_id = id;
        table.rows.insert(id, entry.clone());
        Ok(entry)
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, StoreError> {
        let mut state = self.state.write().await;
        let mut entry = match E::table(&state).rows.get(&id) {
            Some(e) => e.clone(),
            None => return Ok(None),
        };
        entry.apply(patch, Utc::now());
        if key_taken::<E>(&state, entry.unique_key(), id) {
            return Err(StoreError::Conflict(format!(
                "{} '{}' already exists",
                E::KIND.label(),
                entry.unique_key()
            )));
        }
        E::table_mut(&mut state).rows.insert(id, entry.clone());
        Ok(Some(entry))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let existed = E::table_mut(&mut state).rows.remove(&id).is_some();
        state.links_mut(E::KIND).retain(|(_, entry)| *entry != id);
        Ok(existed)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn list_groups(&self, kind: EntryKind, owners: &[i64]) -> Result<Vec<StudyGroup>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .groups(kind)
            .rows
            .values()
            .filter(|g| owners.contains(&g.id_user))
            .cloned()
            .collect())
    }

    async fn get_group(&self, kind: EntryKind, id: i64) -> Result<Option<StudyGroup>, StoreError> {
        let state = self.state.read().await;
        Ok(state.groups(kind).rows.get(&id).cloned())
    }

    async fn create_group(&self, kind: EntryKind, owner: i64, name: &str) -> Result<StudyGroup, StoreError> {
        let mut state = self.state.write().await;
        if !state.users.rows.contains_key(&owner) {
            return Err(StoreError::NotFound("User".to_string()));
        }
        let table = state.groups_mut(kind);
        let id = table.next_id();
        let now = Utc::now();
        let group = StudyGroup {
            id,
            name_group: name.to_string(),
            id_user: owner,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, group.clone());
        Ok(group)
    }

    async fn rename_group(&self, kind: EntryKind, id: i64, name: &str) -> Result<Option<StudyGroup>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.groups_mut(kind).rows.get_mut(&id).map(|g| {
            g.name_group = name.to_string();
            g.updated_at = Utc::now();
            g.clone()
        }))
    }

    async fn delete_group(&self, kind: EntryKind, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.drop_group(kind, id))
    }

    async fn member_ids(&self, kind: EntryKind, group_id: i64) -> Result<Vec<i64>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .links(kind)
            .iter()
            .filter(|(group, _)| *group == group_id)
            .map(|(_, entry)| *entry)
            .collect())
    }

    async fn link(&self, kind: EntryKind, group_id: i64, entry_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let entry_exists = match kind {
            EntryKind::Noun => state.nouns.rows.contains_key(&entry_id),
            EntryKind::Verb => state.verbs.rows.contains_key(&entry_id),
        };
        if !entry_exists || !state.groups(kind).rows.contains_key(&group_id) {
            return Err(StoreError::NotFound("Referenced record".to_string()));
        }
        if !state.links_mut(kind).insert((group_id, entry_id)) {
            return Err(StoreError::Conflict(format!("{} already in group", kind.label())));
        }
        Ok(())
    }

    async fn unlink(&self, kind: EntryKind, group_id: i64, entry_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.links_mut(kind).remove(&(group_id, entry_id)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.rows.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let all: Vec<User> = state.users.rows.values().cloned().collect();
        Ok(Window::page(skip, limit).slice(&all))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if Role::from_id(user.id_rol).is_none() {
            return Err(StoreError::NotFound("Role".to_string()));
        }
        let taken = state
            .users
            .rows
            .values()
            .any(|u| u.username == user.username || u.email == user.email);
        if taken {
            return Err(StoreError::Conflict("Username or email already registered".to_string()));
        }
        let id = state.users.next_id();
        let now = Utc::now();
        let record = User {
            id,
            name: user.name,
            country: user.country,
            email: user.email,
            username: user.username,
            password: user.password,
            language: user.language,
            id_rol: user.id_rol,
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        state.users.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;
        if let Some(email) = &patch.email {
            if state.users.rows.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Conflict("Email already registered".to_string()));
            }
        }
        Ok(state.users.rows.get_mut(&id).map(|u| {
            u.apply(patch, Utc::now());
            u.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let existed = state.users.rows.remove(&id).is_some();
        for kind in [EntryKind::Noun, EntryKind::Verb] {
            let owned: Vec<i64> = state
                .groups(kind)
                .rows
                .values()
                .filter(|g| g.id_user == id)
                .map(|g| g.id)
                .collect();
            for group in owned {
                state.drop_group(kind, group);
            }
        }
        state
            .student_links
            .retain(|(student, teacher)| *student != id && *teacher != id);
        Ok(existed)
    }

    async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        Ok(Role::ALL.into_iter().map(RoleRecord::from).collect())
    }

    async fn link_student(&self, student_id: i64, teacher_id: i64) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if !state.users.rows.contains_key(&student_id) || !state.users.rows.contains_key(&teacher_id) {
            return Err(StoreError::NotFound("User".to_string()));
        }
        if !state.student_links.insert((student_id, teacher_id)) {
            return Err(StoreError::Conflict("Student already linked to this teacher".to_string()));
        }
        Ok(())
    }

    async fn unlink_student(&self, student_id: i64, teacher_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.student_links.remove(&(student_id, teacher_id)))
    }

    async fn is_linked(&self, student_id: i64, teacher_id: i64) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state.student_links.contains(&(student_id, teacher_id)))
    }

    async fn students_of(&self, teacher_id: i64) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        let mut students: Vec<User> = state
            .student_links
            .iter()
            .filter(|(_, teacher)| *teacher == teacher_id)
            .filter_map(|(student, _)| state.users.rows.get(student).cloned())
            .collect();
        students.sort_by_key(|u| u.id);
        Ok(students)
    }

    async fn teacher_ids_of(&self, student_id: i64) -> Result<Vec<i64>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .student_links
            .iter()
            .filter(|(student, _)| *student == student_id)
            .map(|(_, teacher)| *teacher)
            .collect())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
