use serde::Serialize;
use serde_json::{Map, Value};

use super::error::NormalizeError;
use super::word_form::{normalize_leaf, read_leaf, WordForm};

pub const NUMBERS: [&str; 2] = ["singular", "plural"];
pub const CASES: [&str; 6] = [
    "nominative",
    "genitive",
    "dative",
    "accusative",
    "instrumental",
    "prepositional",
];
pub const PERSONS: [&str; 6] = ["ya", "ty", "on_ona", "my", "vy", "oni"];
pub const PAST_FORMS: [&str; 4] = ["masculine", "feminine", "neuter", "plural"];

/// Canonical noun declension: `{singular: {case: WordForm}, plural: {...}}`.
/// Keys outside the known numbers/cases are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Declension(Map<String, Value>);

impl Declension {
    pub fn parse(value: &Value) -> Result<Self, NormalizeError> {
        let path = "declension";
        let raw = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(obj) => obj,
            _ => return Err(NormalizeError::InvalidContainer { path: path.to_string() }),
        };

        let mut out = Map::new();
        for (key, inner) in raw {
            let normalized = if NUMBERS.contains(&key.as_str()) {
                normalize_table(inner, &format!("{}.{}", path, key), &CASES)?
            } else {
                inner.clone()
            };
            out.insert(key.clone(), normalized);
        }
        Ok(Self(out))
    }

    /// Every case must be present in both numbers.
    pub fn require_complete(&self) -> Result<(), NormalizeError> {
        for number in NUMBERS {
            for case in CASES {
                if self.form(number, case).is_none() {
                    return Err(NormalizeError::MissingForm {
                        path: format!("declension.{}.{}", number, case),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn form(&self, number: &str, case: &str) -> Option<WordForm> {
        read_leaf(self.0.get(number)?.get(case))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Which verb aspect a conjugation table belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectKind {
    Imperfective,
    Perfective,
}

impl AspectKind {
    pub fn field(self) -> &'static str {
        match self {
            AspectKind::Imperfective => "imperfective",
            AspectKind::Perfective => "perfective",
        }
    }

    /// Tense tables that must exist for this aspect
    fn required_tenses(self) -> &'static [&'static str] {
        match self {
            AspectKind::Imperfective => &["present_tense", "past_tense"],
            AspectKind::Perfective => &["future_simple"],
        }
    }
}

/// Canonical conjugation table for one aspect of a verb.
///
/// `infinitive` is `{word: WordForm}`, `present_tense` and `future_simple` are
/// keyed by person, `past_tense` by gender/number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Aspect(Map<String, Value>);

impl Aspect {
    pub fn parse(value: &Value, kind: AspectKind) -> Result<Self, NormalizeError> {
        let path = kind.field();
        let raw = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(obj) => obj,
            _ => return Err(NormalizeError::InvalidContainer { path: path.to_string() }),
        };

        let mut out = Map::new();
        for (key, inner) in raw {
            let inner_path = format!("{}.{}", path, key);
            let normalized = match key.as_str() {
                "infinitive" => normalize_infinitive(inner, &inner_path)?,
                "present_tense" | "future_simple" => normalize_table(inner, &inner_path, &PERSONS)?,
                "past_tense" => normalize_table(inner, &inner_path, &PAST_FORMS)?,
                _ => inner.clone(),
            };
            out.insert(key.clone(), normalized);
        }
        Ok(Self(out))
    }

    pub fn require_complete(&self, kind: AspectKind) -> Result<(), NormalizeError> {
        if self.infinitive().is_none() {
            return Err(NormalizeError::MissingForm {
                path: format!("{}.infinitive", kind.field()),
            });
        }
        for tense in kind.required_tenses() {
            if !self.0.get(*tense).map(Value::is_object).unwrap_or(false) {
                return Err(NormalizeError::MissingForm {
                    path: format!("{}.{}", kind.field(), tense),
                });
            }
        }
        Ok(())
    }

    pub fn infinitive(&self) -> Option<WordForm> {
        read_leaf(self.0.get("infinitive")?.get("word"))
    }

    pub fn form(&self, tense: &str, person: &str) -> Option<WordForm> {
        read_leaf(self.0.get(tense)?.get(person))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

fn normalize_table(value: &Value, path: &str, known: &[&str]) -> Result<Value, NormalizeError> {
    let raw = match value {
        Value::Null => return Ok(Value::Null),
        Value::Object(obj) => obj,
        _ => return Err(NormalizeError::InvalidContainer { path: path.to_string() }),
    };

    let mut out = Map::new();
    for (key, leaf) in raw {
        let normalized = if known.contains(&key.as_str()) {
            normalize_leaf(leaf, &format!("{}.{}", path, key))?
        } else {
            leaf.clone()
        };
        out.insert(key.clone(), normalized);
    }
    Ok(Value::Object(out))
}

/// `infinitive` wraps its word form under `word`. A bare string, or a word form
/// given directly (`{"word": "...", "accent": "..."}`), is wrapped here.
fn normalize_infinitive(value: &Value, path: &str) -> Result<Value, NormalizeError> {
    let leaf_path = format!("{}.word", path);
    match value {
        Value::Null => Ok(Value::Null),
        Value::String(_) => Ok(wrap_word(normalize_leaf(value, &leaf_path)?)),
        Value::Object(obj) => match obj.get("word") {
            Some(Value::String(_)) => Ok(wrap_word(normalize_leaf(value, &leaf_path)?)),
            Some(inner) => {
                let mut out = obj.clone();
                out.insert("word".to_string(), normalize_leaf(inner, &leaf_path)?);
                Ok(Value::Object(out))
            }
            None => Err(NormalizeError::MissingWord { path: leaf_path }),
        },
        _ => Err(NormalizeError::InvalidContainer { path: path.to_string() }),
    }
}

fn wrap_word(leaf: Value) -> Value {
    let mut out = Map::new();
    out.insert("word".to_string(), leaf);
    Value::Object(out)
}
