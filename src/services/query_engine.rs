//! Paginated listing of nouns and verbs with an optional translation filter.
//!
//! Name and enum filters are pushed to the store. The translation filter
//! cannot be, because `translations` is free-form JSON, so it runs over
//! fetched rows:
//!
//! 1. count the rows matching the pushed predicates
//! 2. fetch the requested page under those predicates
//! 3. without a translation filter, that page and count are the answer
//! 4. with one, filter the page; if nothing on it matches the result is an
//!    empty page with `total == 0`, otherwise re-fetch every row matching
//!    the pushed predicates, filter them all, and slice the requested
//!    window out of the filtered list
//!
//! Step 4 deliberately reports nothing when the requested page has no
//! matches even if later pages would; `early_empty_page_reports_no_results`
//! pins that behaviour.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ApiConfig, FilterConfig};
use crate::database::models::Entry;
use crate::database::store::{EntryStore, StoreError};
use crate::filter::{Predicate, TranslationFilter, Window};
use crate::types::EntryKind;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QueryError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        QueryError::Validation { field, message: message.into() }
    }
}

/// Query-string parameters of `GET /api/nouns` and `GET /api/verbs`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRequest {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(alias = "noun", alias = "verb_pair_id")]
    pub name_filter: Option<String>,
    #[serde(alias = "gender", alias = "conjugationType", alias = "conjugation_type")]
    pub enum_filter: Option<String>,
    pub translation_lang: Option<String>,
    pub translation_text: Option<String>,
}

/// A validated list request
#[derive(Debug, Clone, PartialEq)]
pub struct ListCriteria {
    pub page: i64,
    pub per_page: i64,
    pub predicates: Vec<Predicate>,
    pub translation: Option<TranslationFilter>,
}

impl ListCriteria {
    /// `None` when the offset does not fit in an i64, which is past the end of any table
    pub fn window(&self) -> Option<Window> {
        let offset = (self.page - 1).checked_mul(self.per_page)?;
        Some(Window::page(offset, self.per_page))
    }
}

impl ListRequest {
    pub fn into_criteria(self, kind: EntryKind, api: &ApiConfig) -> Result<ListCriteria, QueryError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(QueryError::validation("page", "must be at least 1"));
        }
        let max = i64::from(api.max_per_page);
        let per_page = self.per_page.unwrap_or_else(|| i64::from(api.default_per_page));
        if per_page < 1 || per_page > max {
            return Err(QueryError::validation(
                "per_page",
                format!("must be between 1 and {}", max),
            ));
        }

        let mut predicates = Vec::new();
        if let Some(name) = self.name_filter.filter(|s| !s.is_empty()) {
            predicates.push(Predicate::contains(kind.name_column(), name));
        }
        if let Some(raw) = self.enum_filter.filter(|s| !s.trim().is_empty()) {
            if let Some(p) = enum_predicate(kind, raw.trim())? {
                predicates.push(p);
            }
        }

        Ok(ListCriteria {
            page,
            per_page,
            predicates,
            translation: TranslationFilter::from_parts(
                self.translation_lang.as_deref(),
                self.translation_text.as_deref(),
            ),
        })
    }
}

fn enum_predicate(kind: EntryKind, raw: &str) -> Result<Option<Predicate>, QueryError> {
    match kind {
        EntryKind::Noun => Ok(Some(Predicate::equals(kind.enum_column(), raw))),
        EntryKind::Verb => {
            let value: i64 = raw
                .parse()
                .map_err(|_| QueryError::validation("conjugationType", "must be an integer"))?;
            // 0 means "any"
            if value == 0 {
                Ok(None)
            } else {
                Ok(Some(Predicate::equals(kind.enum_column(), value)))
            }
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<E> {
    pub items: Vec<E>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl<E> Page<E> {
    fn new(items: Vec<E>, total: i64, criteria: &ListCriteria) -> Self {
        let total_pages = if total > 0 {
            (total + criteria.per_page - 1) / criteria.per_page
        } else {
            0
        };
        Self {
            items,
            total,
            page: criteria.page,
            per_page: criteria.per_page,
            total_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    config: FilterConfig,
}

impl QueryEngine {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub async fn list<E, S>(&self, store: &S, criteria: &ListCriteria) -> Result<Page<E>, QueryError>
    where
        E: Entry,
        S: EntryStore<E> + ?Sized,
    {
        let kind = E::KIND;
        if self.config.debug_logging {
            debug!(
                "list {}: page={} per_page={} predicates={:?} translation={:?}",
                kind.table(),
                criteria.page,
                criteria.per_page,
                criteria.predicates,
                criteria.translation
            );
        }

        let total_sql = store.count(&criteria.predicates).await?;
        let window = match criteria.window() {
            Some(window) => window,
            None => {
                // Nothing can be fetched, so a translation filter sees an empty page
                let total = if criteria.translation.is_some() { 0 } else { total_sql };
                return Ok(Page::new(Vec::new(), total, criteria));
            }
        };
        let fetched = store.query(&criteria.predicates, window).await?;

        let filter = match &criteria.translation {
            None => return Ok(Page::new(fetched, total_sql, criteria)),
            Some(filter) => filter,
        };

        let on_page: Vec<E> = fetched
            .into_iter()
            .filter(|e| filter.matches(e.translations()))
            .collect();
        if on_page.is_empty() {
            if self.config.debug_logging {
                debug!("list {}: no translation matches on page {}", kind.table(), criteria.page);
            }
            return Ok(Page::new(Vec::new(), 0, criteria));
        }

        let all = store.query(&criteria.predicates, Window::all()).await?;
        if all.len() > self.config.refetch_warn_threshold {
            warn!(
                "Translation filter re-fetched {} {} rows (threshold {})",
                all.len(),
                kind.table(),
                self.config.refetch_warn_threshold
            );
        }
        let matching: Vec<E> = all
            .into_iter()
            .filter(|e| filter.matches(e.translations()))
            .collect();
        let total = matching.len() as i64;

        Ok(Page::new(window.slice(&matching), total, criteria))
    }
}
