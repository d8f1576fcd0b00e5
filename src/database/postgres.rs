use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow, PgPool};

use super::manager::DatabaseManager;
use super::models::{
    Entry, NewUser, Noun, NounRow, RoleRecord, StudyGroup, User, UserPatch, Verb, VerbRow,
};
use super::query_builder::{bind_value_as, QueryBuilder};
use super::store::{EntryStore, GroupStore, Store, StoreError, UserStore};
use crate::filter::{Predicate, Window};
use crate::normalize::NormalizeError;
use crate::types::EntryKind;

/// How an entry maps onto its table
pub trait PgEntry: Entry {
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin;

    fn from_row(row: Self::Row) -> Result<Self, NormalizeError>;

    /// Writable columns in canonical form; timestamps are set by SQL
    fn write_values(&self) -> Vec<(&'static str, Value)>;
}

impl PgEntry for Noun {
    type Row = NounRow;

    fn from_row(row: NounRow) -> Result<Self, NormalizeError> {
        Noun::try_from(row)
    }

    fn write_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("noun", Value::from(self.noun.as_str())),
            ("gender", Value::from(self.gender.as_str())),
            ("translations", self.translations.to_value()),
            ("declension", self.declension.to_value()),
        ]
    }
}

impl PgEntry for Verb {
    type Row = VerbRow;

    fn from_row(row: VerbRow) -> Result<Self, NormalizeError> {
        Verb::try_from(row)
    }

    fn write_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("verb_pair_id", Value::from(self.verb_pair_id.as_str())),
            ("translations", self.translations.to_value()),
            ("conjugation_type", Value::from(self.conjugation_type)),
            ("root", Value::from(self.root.as_str())),
            (
                "stress_pattern",
                self.stress_pattern.as_deref().map(Value::from).unwrap_or(Value::Null),
            ),
            ("imperfective", self.imperfective.to_value()),
            ("perfective", self.perfective.to_value()),
        ]
    }
}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(db: &DatabaseManager) -> Self {
        Self { pool: db.pool().clone() }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
        table,
        columns.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>().join(", "),
        placeholders.join(", ")
    )
}

fn update_sql(table: &str, columns: &[&str]) -> String {
    let sets: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("\"{}\" = ${}", c, i + 1))
        .collect();
    format!(
        "UPDATE \"{}\" SET {}, \"updated_at\" = NOW() WHERE \"id\" = ${} RETURNING *",
        table,
        sets.join(", "),
        columns.len() + 1
    )
}

#[async_trait]
impl<E: PgEntry> EntryStore<E> for PgStore {
    async fn get(&self, id: i64) -> Result<Option<E>, StoreError> {
        let rows = QueryBuilder::<E::Row>::new(E::KIND.table())?
            .predicates(&[Predicate::equals("id", id)])
            .fetch(&self.pool)
            .await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(E::from_row(row)?)),
            None => Ok(None),
        }
    }

    async fn query(&self, predicates: &[Predicate], window: Window) -> Result<Vec<E>, StoreError> {
        let rows = QueryBuilder::<E::Row>::new(E::KIND.table())?
            .predicates(predicates)
            .window(window)?
            .fetch(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| E::from_row(row).map_err(StoreError::from))
            .collect()
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<i64, StoreError> {
        Ok(QueryBuilder::<E::Row>::new(E::KIND.table())?
            .predicates(predicates)
            .count(&self.pool)
            .await?)
    }

    async fn insert(&self, draft: E::Draft) -> Result<E, StoreError> {
        let prototype = E::from_draft(0, draft, chrono::Utc::now());
        let values = prototype.write_values();
        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let sql = insert_sql(E::KIND.table(), &columns);

        let mut q = sqlx::query_as::<_, E::Row>(&sql);
        for (_, v) in values.iter() {
            q = bind_value_as(q, v);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(E::from_row(row)?)
    }

    async fn update(&self, id: i64, patch: E::Patch) -> Result<Option<E>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1 FOR UPDATE", E::KIND.table());
        let current = sqlx::query_as::<_, E::Row>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let mut entry = match current {
            Some(row) => E::from_row(row)?,
            None => return Ok(None),
        };
        entry.apply(patch, chrono::Utc::now());

        let values = entry.write_values();
        let columns: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let sql = update_sql(E::KIND.table(), &columns);
        let mut q = sqlx::query_as::<_, E::Row>(&sql);
        for (_, v) in values.iter() {
            q = bind_value_as(q, v);
        }
        let row = q.bind(id).fetch_one(&mut *tx).await?;
        tx.commit().await?;

        Ok(Some(E::from_row(row)?))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", E::KIND.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn list_groups(&self, kind: EntryKind, owners: &[i64]) -> Result<Vec<StudyGroup>, StoreError> {
        let sql = format!(
            "SELECT * FROM \"{}\" WHERE \"id_user\" = ANY($1) ORDER BY \"id\" ASC",
            kind.group_table()
        );
        Ok(sqlx::query_as::<_, StudyGroup>(&sql)
            .bind(owners.to_vec())
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_group(&self, kind: EntryKind, id: i64) -> Result<Option<StudyGroup>, StoreError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE \"id\" = $1", kind.group_table());
        Ok(sqlx::query_as::<_, StudyGroup>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_group(&self, kind: EntryKind, owner: i64, name: &str) -> Result<StudyGroup, StoreError> {
        let sql = format!(
            "INSERT INTO \"{}\" (\"name_group\", \"id_user\") VALUES ($1, $2) RETURNING *",
            kind.group_table()
        );
        Ok(sqlx::query_as::<_, StudyGroup>(&sql)
            .bind(name)
            .bind(owner)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn rename_group(&self, kind: EntryKind, id: i64, name: &str) -> Result<Option<StudyGroup>, StoreError> {
        let sql = format!(
            "UPDATE \"{}\" SET \"name_group\" = $1, \"updated_at\" = NOW() WHERE \"id\" = $2 RETURNING *",
            kind.group_table()
        );
        Ok(sqlx::query_as::<_, StudyGroup>(&sql)
            .bind(name)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_group(&self, kind: EntryKind, id: i64) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", kind.group_table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn member_ids(&self, kind: EntryKind, group_id: i64) -> Result<Vec<i64>, StoreError> {
        let (table, column) = kind.link_table();
        let sql = format!(
            "SELECT \"{col}\" FROM \"{table}\" WHERE \"id_group\" = $1 ORDER BY \"{col}\" ASC",
            col = column,
            table = table
        );
        Ok(sqlx::query_scalar::<_, i64>(&sql)
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn link(&self, kind: EntryKind, group_id: i64, entry_id: i64) -> Result<(), StoreError> {
        let (table, column) = kind.link_table();
        let sql = format!(
            "INSERT INTO \"{}\" (\"id_group\", \"{}\") VALUES ($1, $2)",
            table, column
        );
        match sqlx::query(&sql).bind(group_id).bind(entry_id).execute(&self.pool).await {
            Ok(_) => Ok(()),
            Err(err) => match StoreError::from(err) {
                StoreError::Conflict(_) => Err(StoreError::Conflict(format!(
                    "{} already in group",
                    kind.label()
                ))),
                other => Err(other),
            },
        }
    }

    async fn unlink(&self, kind: EntryKind, group_id: i64, entry_id: i64) -> Result<bool, StoreError> {
        let (table, column) = kind.link_table();
        let sql = format!(
            "DELETE FROM \"{}\" WHERE \"id_group\" = $1 AND \"{}\" = $2",
            table, column
        );
        let result = sqlx::query(&sql).bind(group_id).bind(entry_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self, skip: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id ASC OFFSET $1 LIMIT $2")
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, country, email, username, password, language, id_rol) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.country)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.language)
        .bind(user.id_rol)
        .fetch_one(&self.pool)
        .await;
        match result {
            Ok(user) => Ok(user),
            Err(err) => match StoreError::from(err) {
                StoreError::Conflict(_) => {
                    Err(StoreError::Conflict("Username or email already registered".to_string()))
                }
                other => Err(other),
            },
        }
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, StoreError> {
        let result = sqlx::query_as::<_, User>(
            "UPDATE users SET \
                name = COALESCE($1, name), \
                country = COALESCE($2, country), \
                email = COALESCE($3, email), \
                language = COALESCE($4, language), \
                is_active = COALESCE($5, is_active), \
                updated_at = NOW() \
             WHERE id = $6 RETURNING *",
        )
        .bind(patch.name)
        .bind(patch.country)
        .bind(patch.email)
        .bind(patch.language)
        .bind(patch.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        match result {
            Ok(user) => Ok(user),
            Err(err) => match StoreError::from(err) {
                StoreError::Conflict(_) => Err(StoreError::Conflict("Email already registered".to_string())),
                other => Err(other),
            },
        }
    }

    async fn delete_user(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn roles(&self) -> Result<Vec<RoleRecord>, StoreError> {
        Ok(sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn link_student(&self, student_id: i64, teacher_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("INSERT INTO link_student_teacher (id_student, id_teacher) VALUES ($1, $2)")
            .bind(student_id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(err) => match StoreError::from(err) {
                StoreError::Conflict(_) => Err(StoreError::Conflict(
                    "Student already linked to this teacher".to_string(),
                )),
                other => Err(other),
            },
        }
    }

    async fn unlink_student(&self, student_id: i64, teacher_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM link_student_teacher WHERE id_student = $1 AND id_teacher = $2")
            .bind(student_id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn is_linked(&self, student_id: i64, teacher_id: i64) -> Result<bool, StoreError> {
        let mut q = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM link_student_teacher WHERE id_student = $1 AND id_teacher = $2)",
        );
        q = q.bind(student_id).bind(teacher_id);
        Ok(q.fetch_one(&self.pool).await?)
    }

    async fn students_of(&self, teacher_id: i64) -> Result<Vec<User>, StoreError> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN link_student_teacher l ON l.id_student = u.id \
             WHERE l.id_teacher = $1 ORDER BY u.id ASC",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn teacher_ids_of(&self, student_id: i64) -> Result<Vec<i64>, StoreError> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT id_teacher FROM link_student_teacher WHERE id_student = $1 ORDER BY id_teacher ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_update_sql_number_params_in_column_order() {
        assert_eq!(
            insert_sql("nouns", &["noun", "gender"]),
            "INSERT INTO \"nouns\" (\"noun\", \"gender\") VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(
            update_sql("nouns", &["noun", "gender"]),
            "UPDATE \"nouns\" SET \"noun\" = $1, \"gender\" = $2, \"updated_at\" = NOW() WHERE \"id\" = $3 RETURNING *"
        );
    }
}
