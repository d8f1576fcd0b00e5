use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, PgPool, Postgres, Row};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterError, Predicate, SqlResult, Window};

/// Binds a JSON value as the closest Postgres scalar; arrays and objects go in as JSONB
macro_rules! bind_json {
    ($q:expr, $v:expr) => {
        match $v {
            Value::Null => $q.bind(None::<String>),
            Value::Bool(b) => $q.bind(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => $q.bind(i),
                None => $q.bind(n.as_f64()),
            },
            Value::String(s) => $q.bind(s.as_str()),
            Value::Array(_) | Value::Object(_) => $q.bind($v.clone()),
        }
    };
}

pub(crate) fn bind_value<'q>(q: Query<'q, Postgres, PgArguments>, v: &'q Value) -> Query<'q, Postgres, PgArguments> {
    bind_json!(q, v)
}

pub(crate) fn bind_value_as<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q Value,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    bind_json!(q, v)
}

fn compile_failed(e: FilterError) -> DatabaseError {
    DatabaseError::QueryError(e.to_string())
}

/// Typed SELECT / COUNT over one entry table, driven by [`Filter`]
pub struct QueryBuilder<T> {
    filter: Filter,
    _row: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: impl Into<String>) -> Result<Self, DatabaseError> {
        Ok(Self {
            filter: Filter::new(table).map_err(compile_failed)?,
            _row: std::marker::PhantomData,
        })
    }

    pub fn predicates(mut self, predicates: &[Predicate]) -> Self {
        self.filter.where_predicates(predicates);
        self
    }

    pub fn window(mut self, window: Window) -> Result<Self, DatabaseError> {
        self.filter.window(window).map_err(compile_failed)?;
        Ok(self)
    }

    pub async fn fetch(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let SqlResult { query, params } = self.filter.to_sql().map_err(compile_failed)?;
        tracing::trace!("select: {}", query);
        let q = params
            .iter()
            .fold(sqlx::query_as::<_, T>(&query), |q, p| bind_value_as(q, p));
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn count(self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let SqlResult { query, params } = self.filter.to_count_sql().map_err(compile_failed)?;
        tracing::trace!("count: {}", query);
        let q = params.iter().fold(sqlx::query(&query), |q, p| bind_value(q, p));
        let row = q.fetch_one(pool).await?;
        Ok(row.try_get("count")?)
    }
}
