use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{check_len, check_required, Entry, InputError};
use crate::normalize::{Declension, NormalizeError, Translations};
use crate::types::EntryKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Noun {
    pub id: i64,
    pub noun: String,
    pub gender: String,
    pub translations: Translations,
    pub declension: Declension,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row as stored in `nouns`; JSON columns are parsed into canonical form on conversion
#[derive(Debug, Clone, FromRow)]
pub struct NounRow {
    pub id: i64,
    pub noun: String,
    pub gender: String,
    pub translations: Value,
    pub declension: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NounRow> for Noun {
    type Error = NormalizeError;

    fn try_from(row: NounRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            noun: row.noun,
            gender: row.gender,
            translations: Translations::from_value(&row.translations),
            declension: Declension::parse(&row.declension)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NounDraft {
    pub noun: String,
    pub gender: String,
    pub translations: Translations,
    pub declension: Declension,
}

#[derive(Debug, Clone, Default)]
pub struct NounPatch {
    pub noun: Option<String>,
    pub gender: Option<String>,
    pub translations: Option<Translations>,
    pub declension: Option<Declension>,
}

/// POST /api/nouns body
#[derive(Debug, Clone, Deserialize)]
pub struct NounCreate {
    pub noun: String,
    pub gender: String,
    #[serde(default)]
    pub translations: Value,
    pub declension: Value,
}

impl NounCreate {
    pub fn into_draft(self) -> Result<NounDraft, InputError> {
        check_required("noun", &self.noun, 100)?;
        check_required("gender", &self.gender, 10)?;
        let declension = Declension::parse(&self.declension)?;
        declension.require_complete()?;
        Ok(NounDraft {
            noun: self.noun,
            gender: self.gender,
            translations: Translations::from_value(&self.translations),
            declension,
        })
    }
}

/// PUT /api/nouns/:id body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NounUpdate {
    pub noun: Option<String>,
    pub gender: Option<String>,
    pub translations: Option<Value>,
    pub declension: Option<Value>,
}

impl NounUpdate {
    pub fn into_patch(self) -> Result<NounPatch, InputError> {
        if let Some(noun) = &self.noun {
            check_required("noun", noun, 100)?;
        }
        if let Some(gender) = &self.gender {
            check_len("gender", gender, 10)?;
        }
        Ok(NounPatch {
            noun: self.noun,
            gender: self.gender,
            translations: self.translations.as_ref().map(Translations::from_value),
            declension: self.declension.as_ref().map(Declension::parse).transpose()?,
        })
    }
}

impl Entry for Noun {
    const KIND: EntryKind = EntryKind::Noun;
    type Draft = NounDraft;
    type Patch = NounPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn translations(&self) -> &Translations {
        &self.translations
    }

    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "noun" => Some(Value::from(self.noun.as_str())),
            "gender" => Some(Value::from(self.gender.as_str())),
            _ => None,
        }
    }

    fn from_draft(id: i64, draft: NounDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            noun: draft.noun,
            gender: draft.gender,
            translations: draft.translations,
            declension: draft.declension,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: NounPatch, now: DateTime<Utc>) {
        if let Some(noun) = patch.noun {
            self.noun = noun;
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(translations) = patch.translations {
            self.translations = translations;
        }
        if let Some(declension) = patch.declension {
            self.declension = declension;
        }
        self.updated_at = now;
    }
}
