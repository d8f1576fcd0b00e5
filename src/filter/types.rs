use serde_json::Value;

/// A predicate over a scalar column, evaluated by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-sensitive substring match (`LIKE %value%`)
    Contains { column: String, value: String },
    Equals { column: String, value: Value },
    OneOf { column: String, values: Vec<Value> },
}

impl Predicate {
    pub fn contains(column: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Contains { column: column.into(), value: value.into() }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equals { column: column.into(), value: value.into() }
    }

    pub fn column(&self) -> &str {
        match self {
            Predicate::Contains { column, .. }
            | Predicate::Equals { column, .. }
            | Predicate::OneOf { column, .. } => column,
        }
    }

    /// Evaluate against a column value read from an in-memory record
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        let actual = match actual {
            Some(v) => v,
            None => return false,
        };
        match self {
            Predicate::Contains { value, .. } => actual
                .as_str()
                .map(|s| s.contains(value.as_str()))
                .unwrap_or(false),
            Predicate::Equals { value, .. } => same_value(actual, value),
            Predicate::OneOf { values, .. } => values.iter().any(|v| same_value(actual, v)),
        }
    }
}

// Integers compare by value regardless of how serde_json stored them
fn same_value(a: &Value, b: &Value) -> bool {
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Row window: `offset` rows skipped, at most `limit` returned (`None` = all)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: Option<i64>,
}

impl Window {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn page(offset: i64, limit: i64) -> Self {
        Self { offset, limit: Some(limit) }
    }

    /// Apply the window to an already ordered sequence
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset).unwrap_or(0).min(items.len());
        let end = match self.limit {
            Some(limit) => start.saturating_add(usize::try_from(limit).unwrap_or(0)).min(items.len()),
            None => items.len(),
        };
        items[start..end].to_vec()
    }
}

/// One ascending ORDER BY column
#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn window_slices_past_the_end_to_empty() {
        let items = vec![1, 2, 3];
        assert_eq!(Window::page(2, 5).slice(&items), vec![3]);
        assert!(Window::page(10, 5).slice(&items).is_empty());
        assert_eq!(Window::all().slice(&items), items);
    }

    #[test]
    fn predicates_match_in_memory_values() {
        assert!(Predicate::contains("noun", "ом").matches(Some(&json!("дом"))));
        assert!(!Predicate::contains("noun", "ОМ").matches(Some(&json!("дом"))));
        assert!(Predicate::equals("conjugation_type", 2).matches(Some(&json!(2i64))));
        assert!(!Predicate::equals("gender", "feminine").matches(None));
        let one_of = Predicate::OneOf { column: "id".into(), values: vec![json!(1), json!(3)] };
        assert!(one_of.matches(Some(&json!(3))));
        assert!(!one_of.matches(Some(&json!(2))));
    }
}
