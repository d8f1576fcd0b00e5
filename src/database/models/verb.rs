use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{check_len, check_required, Entry, InputError};
use crate::normalize::{Aspect, AspectKind, NormalizeError, Translations};
use crate::types::EntryKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verb {
    pub id: i64,
    pub verb_pair_id: String,
    pub translations: Translations,
    #[serde(rename = "conjugationType")]
    pub conjugation_type: i32,
    pub root: String,
    pub stress_pattern: Option<String>,
    pub imperfective: Aspect,
    pub perfective: Aspect,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct VerbRow {
    pub id: i64,
    pub verb_pair_id: String,
    pub translations: Value,
    pub conjugation_type: i32,
    pub root: String,
    pub stress_pattern: Option<String>,
    pub imperfective: Value,
    pub perfective: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VerbRow> for Verb {
    type Error = NormalizeError;

    fn try_from(row: VerbRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            verb_pair_id: row.verb_pair_id,
            translations: Translations::from_value(&row.translations),
            conjugation_type: row.conjugation_type,
            root: row.root,
            stress_pattern: row.stress_pattern,
            imperfective: Aspect::parse(&row.imperfective, AspectKind::Imperfective)?,
            perfective: Aspect::parse(&row.perfective, AspectKind::Perfective)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VerbDraft {
    pub verb_pair_id: String,
    pub translations: Translations,
    pub conjugation_type: i32,
    pub root: String,
    pub stress_pattern: Option<String>,
    pub imperfective: Aspect,
    pub perfective: Aspect,
}

#[derive(Debug, Clone, Default)]
pub struct VerbPatch {
    pub verb_pair_id: Option<String>,
    pub translations: Option<Translations>,
    pub conjugation_type: Option<i32>,
    pub root: Option<String>,
    pub stress_pattern: Option<String>,
    pub imperfective: Option<Aspect>,
    pub perfective: Option<Aspect>,
}

/// POST /api/verbs body
#[derive(Debug, Clone, Deserialize)]
pub struct VerbCreate {
    pub verb_pair_id: String,
    #[serde(default)]
    pub translations: Value,
    #[serde(alias = "conjugationType")]
    pub conjugation_type: i32,
    pub root: String,
    #[serde(default)]
    pub stress_pattern: Option<String>,
    pub imperfective: Value,
    pub perfective: Value,
}

fn check_conjugation_type(value: i32) -> Result<(), InputError> {
    if !(1..=2).contains(&value) {
        return Err(InputError::Invalid {
            field: "conjugationType",
            message: format!("must be 1 or 2, got {}", value),
        });
    }
    Ok(())
}

impl VerbCreate {
    pub fn into_draft(self) -> Result<VerbDraft, InputError> {
        check_required("verb_pair_id", &self.verb_pair_id, 200)?;
        check_required("root", &self.root, 100)?;
        check_conjugation_type(self.conjugation_type)?;
        if let Some(stress) = &self.stress_pattern {
            check_len("stress_pattern", stress, 50)?;
        }

        let imperfective = Aspect::parse(&self.imperfective, AspectKind::Imperfective)?;
        imperfective.require_complete(AspectKind::Imperfective)?;
        let perfective = Aspect::parse(&self.perfective, AspectKind::Perfective)?;
        perfective.require_complete(AspectKind::Perfective)?;

        Ok(VerbDraft {
            verb_pair_id: self.verb_pair_id,
            translations: Translations::from_value(&self.translations),
            conjugation_type: self.conjugation_type,
            root: self.root,
            stress_pattern: self.stress_pattern,
            imperfective,
            perfective,
        })
    }
}

/// PUT /api/verbs/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerbUpdate {
    pub verb_pair_id: Option<String>,
    pub translations: Option<Value>,
    #[serde(alias = "conjugationType")]
    pub conjugation_type: Option<i32>,
    pub root: Option<String>,
    pub stress_pattern: Option<String>,
    pub imperfective: Option<Value>,
    pub perfective: Option<Value>,
}

impl VerbUpdate {
    pub fn into_patch(self) -> Result<VerbPatch, InputError> {
        if let Some(pair) = &self.verb_pair_id {
            check_required("verb_pair_id", pair, 200)?;
        }
        if let Some(root) = &self.root {
            check_required("root", root, 100)?;
        }
        if let Some(ct) = self.conjugation_type {
            check_conjugation_type(ct)?;
        }
        if let Some(stress) = &self.stress_pattern {
            check_len("stress_pattern", stress, 50)?;
        }

        Ok(VerbPatch {
            verb_pair_id: self.verb_pair_id,
            translations: self.translations.as_ref().map(Translations::from_value),
            conjugation_type: self.conjugation_type,
            root: self.root,
            stress_pattern: self.stress_pattern,
            imperfective: self
                .imperfective
                .as_ref()
                .map(|v| Aspect::parse(v, AspectKind::Imperfective))
                .transpose()?,
            perfective: self
                .perfective
                .as_ref()
                .map(|v| Aspect::parse(v, AspectKind::Perfective))
                .transpose()?,
        })
    }
}

impl Entry for Verb {
    const KIND: EntryKind = EntryKind::Verb;
    type Draft = VerbDraft;
    type Patch = VerbPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn translations(&self) -> &Translations {
        &self.translations
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "verb_pair_id" => Some(Value::from(self.verb_pair_id.as_str())),
            "conjugation_type" => Some(Value::from(self.conjugation_type)),
            "root" => Some(Value::from(self.root.as_str())),
            _ => None,
        }
    }

    fn from_draft(id: i64, draft: VerbDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            verb_pair_id: draft.verb_pair_id,
            translations: draft.translations,
            conjugation_type: draft.conjugation_type,
            root: draft.root,
            stress_pattern: draft.stress_pattern,
            imperfective: draft.imperfective,
            perfective: draft.perfective,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: VerbPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.verb_pair_id {
            self.verb_pair_id = v;
        }
        if let Some(v) = patch.translations {
            self.translations = v;
        }
        if let Some(v) = patch.conjugation_type {
            self.conjugation_type = v;
        }
        if let Some(v) = patch.root {
            self.root = v;
        }
        if let Some(v) = patch.stress_pattern {
            self.stress_pattern = Some(v);
        }
        if let Some(v) = patch.imperfective {
            self.imperfective = v;
        }
        if let Some(v) = patch.perfective {
            self.perfective = v;
        }
        self.updated_at = now;
    }
}
