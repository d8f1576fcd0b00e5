//! Reconciles the historical shapes of translations, declensions and
//! conjugations into one canonical form.
//!
//! Raw JSON is classified once into [`TranslationShape`] / [`WordFormShape`]
//! when it enters the system (request bodies and store rows); everything past
//! that point works on canonical values only.

pub mod error;
pub mod grammar;
pub mod translation;
pub mod word_form;

pub use error::NormalizeError;
pub use grammar::{Aspect, AspectKind, Declension};
pub use translation::{TranslationBlock, TranslationShape, Translations};
pub use word_form::{WordForm, WordFormShape};

use serde_json::Value;

use crate::types::EntryKind;

/// Normalize a raw entry record (as a JSON object) into its canonical shape.
///
/// Structured fields of the given kind are rewritten; every other field is
/// copied unchanged. Normalizing a canonical record returns it as-is.
pub fn normalize_entry(kind: EntryKind, raw: &Value) -> Result<Value, NormalizeError> {
    let obj = raw.as_object().ok_or_else(|| NormalizeError::InvalidContainer {
        path: kind.table().to_string(),
    })?;

    let mut out = obj.clone();
    if let Some(t) = obj.get("translations") {
        out.insert("translations".to_string(), Translations::from_value(t).to_value());
    }

    match kind {
        EntryKind::Noun => {
            if let Some(d) = obj.get("declension") {
                out.insert("declension".to_string(), Declension::parse(d)?.to_value());
            }
        }
        EntryKind::Verb => {
            for aspect in [AspectKind::Imperfective, AspectKind::Perfective] {
                if let Some(a) = obj.get(aspect.field()) {
                    out.insert(aspect.field().to_string(), Aspect::parse(a, aspect)?.to_value());
                }
            }
        }
    }

    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_verb() -> Value {
        json!({
            "id": 7,
            "verb_pair_id": "говорить_сказать",
            "conjugationType": 2,
            "translations": {"language": "es", "translation": "hablar"},
            "imperfective": {
                "infinitive": "говорить",
                "present_tense": {"ya": "говорю", "ty": {"word": "говоришь", "accent": "говори́шь"}},
                "past_tense": {"masculine": "говорил"}
            },
            "perfective": {"infinitive": {"word": "сказать"}, "future_simple": {"ya": "скажу"}}
        })
    }

    #[test]
    fn legacy_verb_becomes_canonical() {
        let v = normalize_entry(EntryKind::Verb, &legacy_verb()).unwrap();
        assert_eq!(v["translations"], json!([{"es": ["hablar"]}]));
        assert_eq!(v["imperfective"]["present_tense"]["ty"]["accent"], "говори́шь");
        assert_eq!(v["imperfective"]["present_tense"]["ya"]["phonetics"], "");
        assert_eq!(v["perfective"]["infinitive"]["word"]["word"], "сказать");
        assert_eq!(v["verb_pair_id"], "говорить_сказать");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_entry(EntryKind::Verb, &legacy_verb()).unwrap();
        let twice = normalize_entry(EntryKind::Verb, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn legacy_pair_and_block_records_are_equivalent() {
        let a = normalize_entry(
            EntryKind::Noun,
            &json!({"translations": {"language": "es", "translation": "amar"}}),
        )
        .unwrap();
        let b = normalize_entry(EntryKind::Noun, &json!({"translations": {"es": ["amar"]}})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_object_record_is_rejected() {
        assert!(normalize_entry(EntryKind::Noun, &json!([1])).is_err());
    }
}
