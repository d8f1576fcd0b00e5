//! Predicates the store can evaluate itself, their SQL rendering, and the
//! translation filter that has to run in memory.

pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod translation;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use translation::TranslationFilter;
pub use types::*;
