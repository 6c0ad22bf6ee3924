//! Query construction from HTTP parameters.
//!
//! Turns raw request parameters into a store-independent [`Filter`] and a
//! result limit. All parameter validation happens here so that a malformed
//! value is rejected before any store is touched.

mod filter;
mod params;

pub use filter::{Condition, DateRange, FieldCondition, Filter, TextPattern};
pub use params::{
    company_filter, parse_date_bound, parse_flag, parse_limit, ArticleQuery, Bound,
    CompanyParams, StockParams, DEFAULT_LIMIT, MAX_LIMIT,
};

/// Errors raised while validating query parameters.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid {field}: '{value}' is not an ISO 8601 date")]
    InvalidDate { field: &'static str, value: String },
    #[error("start_date ({start}) is after end_date ({end})")]
    InvertedRange { start: String, end: String },
    #[error("Invalid limit: '{value}' (expected a positive integer, at most {max})")]
    InvalidLimit { value: String, max: u32 },
    #[error("Invalid {field}: '{value}' (expected true or false)")]
    InvalidFlag { field: &'static str, value: String },
    #[error("Invalid search text: {0}")]
    Pattern(#[from] regex::Error),
}
