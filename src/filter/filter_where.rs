use serde_json::Value;

use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::Predicate;

/// Renders predicates into a parameterized WHERE clause (`$1`, `$2`, ...)
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(
        predicates: &[Predicate],
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(starting_param_index);
        let mut conditions = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            conditions.push(filter_where.build_sql_condition(predicate)?);
        }
        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };
        Ok((where_clause, filter_where.param_values))
    }

    fn build_sql_condition(&mut self, predicate: &Predicate) -> Result<String, FilterError> {
        validate_identifier(predicate.column()).map_err(FilterError::InvalidColumn)?;
        let quoted_column = format!("\"{}\"", predicate.column());

        match predicate {
            Predicate::Contains { value, .. } => {
                let pattern = format!("%{}%", escape_like(value));
                Ok(format!("{} LIKE {}", quoted_column, self.param(Value::String(pattern))))
            }
            Predicate::Equals { value, .. } => match value {
                Value::Null => Ok(format!("{} IS NULL", quoted_column)),
                Value::Array(_) | Value::Object(_) => Err(FilterError::InvalidOperatorData(format!(
                    "equality on {} requires a scalar",
                    predicate.column()
                ))),
                _ => Ok(format!("{} = {}", quoted_column, self.param(value.clone()))),
            },
            Predicate::OneOf { values, .. } => {
                if values.is_empty() {
                    return Ok("1=0".to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v.clone())).collect();
                Ok(format!("{} IN ({})", quoted_column, params.join(", ")))
            }
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape LIKE wildcards so user text matches literally
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
