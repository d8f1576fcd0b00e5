use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::{json_type, NormalizeError};

/// A single inflected form with its stressed spelling and pronunciation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordForm {
    pub word: String,
    pub accent: String,
    pub phonetics: String,
}

impl WordForm {
    pub fn to_value(&self) -> Value {
        json!({
            "word": self.word,
            "accent": self.accent,
            "phonetics": self.phonetics,
        })
    }
}

/// Raw leaf shapes accepted for a word form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordFormShape {
    /// `"говорить"`
    Scalar(String),
    /// `{"word": ..., "accent"?: ..., "phonetics"?: ...}`
    Structured {
        word: String,
        accent: Option<String>,
        phonetics: Option<String>,
    },
}

impl WordFormShape {
    /// Classify a leaf value. `null` is an absent optional form and yields `None`.
    pub fn classify(value: &Value, path: &str) -> Result<Option<Self>, NormalizeError> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(WordFormShape::Scalar(s.clone()))),
            Value::Object(obj) => {
                let word = match obj.get("word") {
                    Some(Value::String(w)) => w.clone(),
                    Some(Value::Null) | None => {
                        return Err(NormalizeError::MissingWord { path: path.to_string() })
                    }
                    Some(other) => {
                        return Err(NormalizeError::InvalidLeaf {
                            path: format!("{}.word", path),
                            found: json_type(other),
                        })
                    }
                };
                Ok(Some(WordFormShape::Structured {
                    word,
                    accent: optional_string(obj.get("accent"), path, "accent")?,
                    phonetics: optional_string(obj.get("phonetics"), path, "phonetics")?,
                }))
            }
            other => Err(NormalizeError::InvalidLeaf {
                path: path.to_string(),
                found: json_type(other),
            }),
        }
    }

    pub fn into_word_form(self, path: &str) -> Result<WordForm, NormalizeError> {
        let form = match self {
            WordFormShape::Scalar(word) => WordForm {
                accent: word.clone(),
                word,
                phonetics: String::new(),
            },
            WordFormShape::Structured { word, accent, phonetics } => WordForm {
                accent: accent.unwrap_or_else(|| word.clone()),
                word,
                phonetics: phonetics.unwrap_or_default(),
            },
        };

        if form.word.trim().is_empty() {
            return Err(NormalizeError::EmptyWord { path: path.to_string() });
        }
        Ok(form)
    }
}

fn optional_string(value: Option<&Value>, path: &str, key: &str) -> Result<Option<String>, NormalizeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(NormalizeError::InvalidLeaf {
            path: format!("{}.{}", path, key),
            found: json_type(other),
        }),
    }
}

/// Normalize one leaf in place of its raw JSON value; `null` passes through.
pub fn normalize_leaf(value: &Value, path: &str) -> Result<Value, NormalizeError> {
    match WordFormShape::classify(value, path)? {
        Some(shape) => Ok(shape.into_word_form(path)?.to_value()),
        None => Ok(Value::Null),
    }
}

/// Read a leaf that is already known to be canonical
pub(crate) fn read_leaf(value: Option<&Value>) -> Option<WordForm> {
    serde_json::from_value(value?.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_leaf_expands() {
        let v = normalize_leaf(&json!("говорить"), "infinitive.word").unwrap();
        assert_eq!(
            v,
            json!({"word": "говорить", "accent": "говорить", "phonetics": ""})
        );
    }

    #[test]
    fn missing_accent_defaults_to_word() {
        let v = normalize_leaf(&json!({"word": "дом", "phonetics": "dom"}), "x").unwrap();
        assert_eq!(v, json!({"word": "дом", "accent": "дом", "phonetics": "dom"}));
    }

    #[test]
    fn explicit_accent_is_kept() {
        let v = normalize_leaf(&json!({"word": "дома", "accent": "дома́"}), "x").unwrap();
        assert_eq!(v["accent"], "дома́");
        assert_eq!(v["phonetics"], "");
    }

    #[test]
    fn empty_word_is_rejected() {
        let err = normalize_leaf(&json!(""), "declension.singular.dative").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::EmptyWord { path: "declension.singular.dative".to_string() }
        );
        assert!(normalize_leaf(&json!({"word": "  "}), "x").is_err());
    }

    #[test]
    fn structured_leaf_without_word_is_rejected() {
        let err = normalize_leaf(&json!({"accent": "а́"}), "p").unwrap_err();
        assert!(matches!(err, NormalizeError::MissingWord { .. }));
    }

    #[test]
    fn non_string_leaf_is_rejected() {
        let err = normalize_leaf(&json!(12), "p").unwrap_err();
        assert_eq!(err, NormalizeError::InvalidLeaf { path: "p".to_string(), found: "number" });
    }

    #[test]
    fn null_leaf_passes_through() {
        assert_eq!(normalize_leaf(&Value::Null, "p").unwrap(), Value::Null);
    }
}
