//! Idempotent DDL for the application tables.

use sqlx::PgPool;
use tracing::info;

use super::manager::DatabaseError;
use crate::types::Role;

pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "roles",
        r#"CREATE TABLE IF NOT EXISTS roles (
            id INTEGER PRIMARY KEY,
            name VARCHAR(50) NOT NULL UNIQUE
        )"#,
    ),
    (
        "users",
        r#"CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            country VARCHAR(100),
            email VARCHAR(255) NOT NULL UNIQUE,
            username VARCHAR(50) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL,
            language VARCHAR(10) NOT NULL DEFAULT 'es',
            id_rol INTEGER NOT NULL REFERENCES roles(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            is_active BOOLEAN NOT NULL DEFAULT TRUE
        )"#,
    ),
    (
        "link_student_teacher",
        r#"CREATE TABLE IF NOT EXISTS link_student_teacher (
            id BIGSERIAL PRIMARY KEY,
            id_student BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            id_teacher BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (id_student, id_teacher)
        )"#,
    ),
    (
        "nouns",
        r#"CREATE TABLE IF NOT EXISTS nouns (
            id BIGSERIAL PRIMARY KEY,
            noun VARCHAR(100) NOT NULL UNIQUE,
            gender VARCHAR(10) NOT NULL,
            translations JSONB NOT NULL DEFAULT '[]'::jsonb,
            declension JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "idx_noun_gender",
        "CREATE INDEX IF NOT EXISTS idx_noun_gender ON nouns (gender)",
    ),
    (
        "verbs",
        r#"CREATE TABLE IF NOT EXISTS verbs (
            id BIGSERIAL PRIMARY KEY,
            verb_pair_id VARCHAR(200) NOT NULL UNIQUE,
            translations JSONB NOT NULL DEFAULT '[]'::jsonb,
            conjugation_type INTEGER NOT NULL,
            root VARCHAR(100) NOT NULL,
            stress_pattern VARCHAR(50),
            imperfective JSONB NOT NULL DEFAULT '{}'::jsonb,
            perfective JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "idx_verb_conjugation_type",
        "CREATE INDEX IF NOT EXISTS idx_verb_conjugation_type ON verbs (conjugation_type)",
    ),
    (
        "noun_groups",
        r#"CREATE TABLE IF NOT EXISTS noun_groups (
            id BIGSERIAL PRIMARY KEY,
            name_group VARCHAR(100) NOT NULL,
            id_user BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "verb_groups",
        r#"CREATE TABLE IF NOT EXISTS verb_groups (
            id BIGSERIAL PRIMARY KEY,
            name_group VARCHAR(100) NOT NULL,
            id_user BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "noun_group_nouns",
        r#"CREATE TABLE IF NOT EXISTS noun_group_nouns (
            id_group BIGINT NOT NULL REFERENCES noun_groups(id) ON DELETE CASCADE,
            id_noun BIGINT NOT NULL REFERENCES nouns(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (id_group, id_noun)
        )"#,
    ),
    (
        "verb_group_verbs",
        r#"CREATE TABLE IF NOT EXISTS verb_group_verbs (
            id_group BIGINT NOT NULL REFERENCES verb_groups(id) ON DELETE CASCADE,
            id_verb BIGINT NOT NULL REFERENCES verbs(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (id_group, id_verb)
        )"#,
    ),
];

/// Create every table and index that does not exist yet. Safe to run repeatedly.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    let mut tx = pool.begin().await?;
    for (name, ddl) in MIGRATIONS {
        sqlx::query(ddl).execute(&mut *tx).await?;
        tracing::debug!("Applied migration: {}", name);
    }
    tx.commit().await?;
    info!("Schema up to date ({} statements)", MIGRATIONS.len());
    Ok(())
}

/// Insert the fixed roles, leaving existing rows untouched
pub async fn seed_roles(pool: &PgPool) -> Result<(), DatabaseError> {
    for role in Role::ALL {
        sqlx::query("INSERT INTO roles (id, name) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING")
            .bind(role.id())
            .bind(role.name())
            .execute(pool)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_is_created_idempotently() {
        for (_, ddl) in MIGRATIONS {
            assert!(ddl.contains("IF NOT EXISTS"), "{}", ddl);
        }
        let tables: Vec<_> = MIGRATIONS.iter().map(|(n, _)| *n).filter(|n| !n.starts_with("idx_")).collect();
        assert_eq!(tables.len(), 9);
    }

    #[test]
    fn links_cascade_on_delete() {
        for (name, ddl) in MIGRATIONS.iter().filter(|(n, _)| n.contains("group_")) {
            assert_eq!(ddl.matches("ON DELETE CASCADE").count(), 2, "{}", name);
        }
    }
}
