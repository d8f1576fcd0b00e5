use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One canonical translation block: language code -> target words
pub type TranslationBlock = BTreeMap<String, Vec<String>>;

/// Ordered translation blocks in canonical `[{lang: [word, ...]}, ...]` form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Translations(Vec<TranslationBlock>);

/// A single stored translation element, classified once when it enters the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationShape {
    /// `{"language": "es", "translation": "amar"}`
    LegacyPair { language: String, words: Vec<String> },
    /// `{"es": ["amar", "querer"]}`, also `{"es": "amar"}` and null-valued languages
    Block(TranslationBlock),
}

impl TranslationShape {
    /// Returns `None` for elements that carry no translation at all.
    pub fn classify(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        if let (Some(Value::String(language)), Some(translation)) =
            (obj.get("language"), obj.get("translation"))
        {
            let words = word_list(translation)?;
            return Some(TranslationShape::LegacyPair {
                language: language.clone(),
                words,
            });
        }

        let block: TranslationBlock = obj
            .iter()
            .filter_map(|(lang, words)| word_list(words).map(|w| (lang.clone(), w)))
            .collect();

        if block.is_empty() {
            None
        } else {
            Some(TranslationShape::Block(block))
        }
    }

    pub fn into_block(self) -> TranslationBlock {
        match self {
            TranslationShape::LegacyPair { language, words } => {
                let mut block = TranslationBlock::new();
                block.insert(language, words);
                block
            }
            TranslationShape::Block(block) => block,
        }
    }
}

fn word_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

impl Translations {
    pub fn new(blocks: Vec<TranslationBlock>) -> Self {
        Self(blocks)
    }

    /// Parse any historical shape of a `translations` value.
    ///
    /// A single mapping is treated as a one-element list and anything that is
    /// neither a list nor a mapping becomes an empty list.
    pub fn from_value(value: &Value) -> Self {
        let blocks = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(TranslationShape::classify)
                .map(TranslationShape::into_block)
                .collect(),
            Value::Object(_) => TranslationShape::classify(value)
                .map(|shape| vec![shape.into_block()])
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        Self(blocks)
    }

    pub fn blocks(&self) -> &[TranslationBlock] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any block lists a word under `lang` that contains `text`,
    /// compared case-insensitively.
    pub fn matches(&self, lang: &str, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.0.iter().any(|block| {
            block
                .get(lang)
                .map(|words| words.iter().any(|w| w.to_lowercase().contains(&needle)))
                .unwrap_or(false)
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or_else(|_| Value::Array(vec![]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_pair_equals_canonical_block() {
        let legacy = Translations::from_value(&json!([{"language": "es", "translation": "amar"}]));
        let canonical = Translations::from_value(&json!([{"es": ["amar"]}]));
        assert_eq!(legacy, canonical);
    }

    #[test]
    fn single_mapping_is_wrapped() {
        let t = Translations::from_value(&json!({"es": ["amar"], "en": ["love"]}));
        assert_eq!(t.blocks().len(), 1);
        assert_eq!(t.blocks()[0]["en"], vec!["love".to_string()]);
    }

    #[test]
    fn non_sequence_becomes_empty() {
        assert!(Translations::from_value(&json!("amar")).is_empty());
        assert!(Translations::from_value(&json!(42)).is_empty());
        assert!(Translations::from_value(&Value::Null).is_empty());
    }

    #[test]
    fn bare_string_and_null_language_values() {
        let t = Translations::from_value(&json!([{"es": "amar", "en": null, "pt": null}]));
        assert_eq!(t.to_value(), json!([{"es": ["amar"]}]));
    }

    #[test]
    fn canonical_value_is_unchanged() {
        let raw = json!([{"es": ["amar", "querer"]}, {"en": ["love"]}]);
        let once = Translations::from_value(&raw);
        assert_eq!(once.to_value(), raw);
        assert_eq!(Translations::from_value(&once.to_value()), once);
    }

    #[test]
    fn match_is_case_insensitive_substring_on_language() {
        let t = Translations::from_value(&json!([{"es": ["Amar"]}, {"en": ["love"]}]));
        assert!(t.matches("es", "am"));
        assert!(t.matches("es", "MAR"));
        assert!(!t.matches("en", "am"));
        assert!(!t.matches("pt", "am"));
    }
}
