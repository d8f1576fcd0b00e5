use super::error::FilterError;
use super::filter::validate_identifier;
use super::types::FilterOrderInfo;

pub struct FilterOrder;

impl FilterOrder {
    /// Stable ordering shared by page queries and full re-fetches
    pub fn by_id() -> Vec<FilterOrderInfo> {
        vec![FilterOrderInfo { column: "id".to_string() }]
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> Result<String, FilterError> {
        if infos.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(infos.len());
        for info in infos {
            validate_identifier(&info.column).map_err(FilterError::InvalidColumn)?;
            parts.push(format!("\"{}\" ASC", info.column));
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }
}
