use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, Predicate, SqlResult, Window};

/// SELECT / COUNT builder for one table
pub struct Filter {
    table_name: String,
    predicates: Vec<Predicate>,
    order_data: Vec<FilterOrderInfo>,
    window: Window,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            predicates: vec![],
            order_data: FilterOrder::by_id(),
            window: Window::all(),
        })
    }

    pub fn where_predicates(&mut self, predicates: &[Predicate]) -> &mut Self {
        self.predicates = predicates.to_vec();
        self
    }

    pub fn window(&mut self, window: Window) -> Result<&mut Self, FilterError> {
        if window.offset < 0 {
            return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
        }
        if let Some(limit) = window.limit {
            if limit < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        self.window = window;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.predicates, 0)?;
        let order_clause = FilterOrder::generate(&self.order_data)?;
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = FilterWhere::generate(&self.predicates, 0)?;
        let query = format!(
            "SELECT COUNT(*) as count FROM \"{}\" WHERE {}",
            self.table_name, where_clause
        );
        Ok(SqlResult { query, params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.window.limit, self.window.offset) {
            (Some(l), 0) => format!("LIMIT {}", l),
            (Some(l), o) => format!("LIMIT {} OFFSET {}", l, o),
            (None, 0) => String::new(),
            (None, o) => format!("OFFSET {}", o),
        }
    }
}

/// Identifiers are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` passes
pub(crate) fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(format!("Invalid identifier: {:?}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_query_orders_by_id_and_windows() {
        let mut filter = Filter::new("nouns").unwrap();
        filter
            .where_predicates(&[Predicate::equals("gender", "feminine")])
            .window(Window::page(40, 20))
            .unwrap();
        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"nouns\" WHERE \"gender\" = $1 ORDER BY \"id\" ASC LIMIT 20 OFFSET 40"
        );
        assert_eq!(sql.params, vec![json!("feminine")]);
    }

    #[test]
    fn full_fetch_has_no_limit() {
        let filter = Filter::new("verbs").unwrap();
        assert_eq!(
            filter.to_sql().unwrap().query,
            "SELECT * FROM \"verbs\" WHERE 1=1 ORDER BY \"id\" ASC"
        );
    }

    #[test]
    fn count_shares_the_where_clause() {
        let mut filter = Filter::new("nouns").unwrap();
        filter.where_predicates(&[Predicate::contains("noun", "д")]);
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) as count FROM \"nouns\" WHERE \"noun\" LIKE $1");
        assert_eq!(sql.params, vec![json!("%д%")]);
    }

    #[test]
    fn invalid_names_and_windows_are_rejected() {
        assert!(Filter::new("nouns; --").is_err());
        assert!(Filter::new("").is_err());
        let mut filter = Filter::new("nouns").unwrap();
        assert!(filter.window(Window { offset: -1, limit: None }).is_err());
    }
}
