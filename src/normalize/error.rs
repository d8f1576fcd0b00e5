use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Word form at '{path}' has an empty word")]
    EmptyWord { path: String },

    #[error("Word form at '{path}' is missing 'word'")]
    MissingWord { path: String },

    #[error("Word form at '{path}' must be a string or an object, got {found}")]
    InvalidLeaf { path: String, found: &'static str },

    #[error("Field '{path}' must be an object")]
    InvalidContainer { path: String },

    #[error("Required form '{path}' is missing")]
    MissingForm { path: String },
}

impl NormalizeError {
    /// Dotted path of the offending field
    pub fn path(&self) -> &str {
        match self {
            NormalizeError::EmptyWord { path }
            | NormalizeError::MissingWord { path }
            | NormalizeError::InvalidLeaf { path, .. }
            | NormalizeError::InvalidContainer { path }
            | NormalizeError::MissingForm { path } => path,
        }
    }
}

pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
