use crate::normalize::Translations;

/// `(language, text)` filter over the `translations` column.
///
/// The store cannot evaluate this, so the query engine applies it to fetched rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFilter {
    pub lang: String,
    pub text: String,
}

impl TranslationFilter {
    /// Both halves are required; a filter missing either one is ignored.
    pub fn from_parts(lang: Option<&str>, text: Option<&str>) -> Option<Self> {
        match (lang.map(str::trim), text) {
            (Some(lang), Some(text)) if !lang.is_empty() && !text.is_empty() => Some(Self {
                lang: lang.to_string(),
                text: text.to_string(),
            }),
            _ => None,
        }
    }

    pub fn matches(&self, translations: &Translations) -> bool {
        translations.matches(&self.lang, &self.text)
    }
}
