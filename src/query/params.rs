//! Request parameters and their translation into filters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::filter::{Condition, DateRange, FieldCondition, Filter, TextPattern};
use super::QueryError;
use crate::models::{fields, parse_timestamp};

/// Result count when the caller gives no `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound applied to any requested `limit`.
pub const MAX_LIMIT: u32 = 1000;

/// A validated find request.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleQuery {
    pub filter: Filter,
    pub limit: u32,
}

/// Query parameters for `GET /stocks/{symbol}`.
#[derive(Debug, Default, Deserialize)]
pub struct StockParams {
    pub limit: Option<String>,
    /// Exact match against the stored `date` string.
    pub date: Option<String>,
}

impl StockParams {
    pub fn to_query(&self, symbol: &str, max_limit: u32) -> Result<ArticleQuery, QueryError> {
        let limit = parse_limit(non_empty(&self.limit), max_limit)?;

        let symbol = Condition::Equals(symbol.to_uppercase());
        let mut filter = Filter::new().and(fields::SYMBOL, symbol);
        if let Some(date) = self.date.as_deref().filter(|d| !d.trim().is_empty()) {
            filter = filter.and(fields::DATE, Condition::Equals(date.to_string()));
        }

        Ok(ArticleQuery { filter, limit })
    }
}

/// Query parameters for `GET /articles/{source_name}/{company}`.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyParams {
    pub limit: Option<String>,
    /// Only articles published at or after this instant.
    pub start_date: Option<String>,
    /// Only articles published at or before this instant.
    pub end_date: Option<String>,
    pub publisher: Option<String>,
    pub author: Option<String>,
    /// Invert the `publisher` match.
    pub exclude_publisher: Option<String>,
    /// Invert the `author` match.
    pub exclude_author: Option<String>,
}

impl CompanyParams {
    pub fn to_query(&self, company: &str, max_limit: u32) -> Result<ArticleQuery, QueryError> {
        let limit = parse_limit(non_empty(&self.limit), max_limit)?;
        let mut filter = company_filter(company)?;

        let range = self.date_range()?;
        if !range.is_unbounded() {
            filter = filter.and(fields::TIMESTAMP, Condition::Within(range));
        }

        if let Some(publisher) = non_empty(&self.publisher) {
            let exclude = parse_flag("exclude_publisher", self.exclude_publisher.as_deref())?;
            filter = filter.and(fields::PUBLISHER, text_condition(publisher, exclude)?);
        }

        if let Some(author) = non_empty(&self.author) {
            let exclude = parse_flag("exclude_author", self.exclude_author.as_deref())?;
            filter = filter.and(fields::AUTHOR, text_condition(author, exclude)?);
        }

        Ok(ArticleQuery { filter, limit })
    }

    /// Both bounds are parsed before the range is attached to any filter.
    fn date_range(&self) -> Result<DateRange, QueryError> {
        let start = non_empty(&self.start_date)
            .map(|raw| parse_date_bound("start_date", raw, Bound::Start))
            .transpose()?;
        let end = non_empty(&self.end_date)
            .map(|raw| parse_date_bound("end_date", raw, Bound::End))
            .transpose()?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(QueryError::InvertedRange {
                    start: s.to_rfc3339(),
                    end: e.to_rfc3339(),
                });
            }
        }

        Ok(DateRange::new(start, end))
    }
}

/// Filter matching `company` anywhere in an article's title or description.
pub fn company_filter(company: &str) -> Result<Filter, QueryError> {
    let pattern = TextPattern::new(company)?;
    Ok(Filter::new().any_of(vec![
        FieldCondition::new(fields::TITLE, Condition::Contains(pattern.clone())),
        FieldCondition::new(fields::DESCRIPTION, Condition::Contains(pattern)),
    ]))
}

fn text_condition(needle: &str, exclude: bool) -> Result<Condition, QueryError> {
    let pattern = TextPattern::new(needle)?;
    Ok(if exclude {
        Condition::Excludes(pattern)
    } else {
        Condition::Contains(pattern)
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `limit` parameter, defaulting to [`DEFAULT_LIMIT`] and capping at `max`.
pub fn parse_limit(raw: Option<&str>, max: u32) -> Result<u32, QueryError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIMIT.min(max));
    };

    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(QueryError::InvalidLimit {
            value: raw.to_string(),
            max,
        }),
        Ok(limit) => Ok(limit.min(max)),
    }
}

/// Parse a boolean flag. A missing or empty flag is false.
pub fn parse_flag(field: &'static str, raw: Option<&str>) -> Result<bool, QueryError> {
    let value = raw.map(str::trim).unwrap_or_default();
    match value.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "off" => Ok(false),
        "true" | "1" | "yes" | "on" => Ok(true),
        _ => Err(QueryError::InvalidFlag {
            field,
            value: value.to_string(),
        }),
    }
}

/// Which end of a range a date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse an ISO 8601 date or datetime.
///
/// Offsets are honoured; naive values are taken as UTC. A bare date covers
/// the whole day, so as an end bound it resolves to the last instant of
/// that day.
pub fn parse_date_bound(
    field: &'static str,
    raw: &str,
    bound: Bound,
) -> Result<DateTime<Utc>, QueryError> {
    let raw = raw.trim();

    if let Some(at) = parse_timestamp(raw) {
        return Ok(at);
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = match bound {
            Bound::Start => date.and_hms_opt(0, 0, 0),
            Bound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
        };
        if let Some(naive) = naive {
            return Ok(naive.and_utc());
        }
    }

    Err(QueryError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_limit_defaults_and_caps() {
        assert_eq!(parse_limit(None, MAX_LIMIT).unwrap(), 10);
        assert_eq!(parse_limit(Some("3"), MAX_LIMIT).unwrap(), 3);
        assert_eq!(parse_limit(Some("5000"), MAX_LIMIT).unwrap(), MAX_LIMIT);
        assert_eq!(parse_limit(None, 5).unwrap(), 5);
    }

    #[test]
    fn test_limit_rejects_garbage() {
        assert!(matches!(
            parse_limit(Some("ten"), MAX_LIMIT),
            Err(QueryError::InvalidLimit { .. })
        ));
        assert!(parse_limit(Some("0"), MAX_LIMIT).is_err());
        assert!(parse_limit(Some("-2"), MAX_LIMIT).is_err());
    }

    #[test]
    fn test_flags() {
        assert!(!parse_flag("f", None).unwrap());
        assert!(!parse_flag("f", Some("")).unwrap());
        assert!(!parse_flag("f", Some("False")).unwrap());
        assert!(parse_flag("f", Some("true")).unwrap());
        assert!(parse_flag("f", Some("1")).unwrap());
        assert!(matches!(
            parse_flag("exclude_author", Some("maybe")),
            Err(QueryError::InvalidFlag { field: "exclude_author", .. })
        ));
    }

    #[test]
    fn test_date_bounds() {
        assert_eq!(
            parse_date_bound("start_date", "2025-03-07", Bound::Start).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 7, 0, 0, 0).unwrap()
        );

        let end = parse_date_bound("end_date", "2025-03-09", Bound::End).unwrap();
        assert!(end > Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap());

        assert_eq!(
            parse_date_bound("start_date", "2025-03-07T10:30:00", Bound::Start).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 7, 10, 30, 0).unwrap()
        );
        assert_eq!(
            parse_date_bound("start_date", "2025-03-07T10:30:00+02:00", Bound::Start).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 7, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let err = parse_date_bound("start_date", "07/03/2025", Bound::Start).unwrap_err();
        assert!(matches!(
            err,
            QueryError::InvalidDate { field: "start_date", .. }
        ));
        assert!(err.to_string().contains("07/03/2025"));
    }

    #[test]
    fn test_stock_query_uppercases_symbol() {
        let params = StockParams {
            date: Some("2025-03-07".to_string()),
            ..Default::default()
        };
        let query = params.to_query("aapl", MAX_LIMIT).unwrap();

        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(
            query.filter.condition(fields::SYMBOL),
            Some(&Condition::Equals("AAPL".to_string()))
        );
        assert_eq!(
            query.filter.condition(fields::DATE),
            Some(&Condition::Equals("2025-03-07".to_string()))
        );
    }

    #[test]
    fn test_stock_date_is_matched_verbatim() {
        let padded = StockParams {
            date: Some(" 2025-03-07".to_string()),
            ..Default::default()
        };
        let query = padded.to_query("AAPL", MAX_LIMIT).unwrap();
        assert_eq!(
            query.filter.condition(fields::DATE),
            Some(&Condition::Equals(" 2025-03-07".to_string()))
        );

        let blank = StockParams {
            date: Some("  ".to_string()),
            ..Default::default()
        };
        let query = blank.to_query("AAPL", MAX_LIMIT).unwrap();
        assert!(query.filter.condition(fields::DATE).is_none());
    }

    #[test]
    fn test_company_query_combines_both_date_bounds() {
        let params = CompanyParams {
            start_date: Some("2025-03-07".to_string()),
            end_date: Some("2025-03-09".to_string()),
            ..Default::default()
        };
        let query = params.to_query("Tesla", MAX_LIMIT).unwrap();

        match query.filter.condition(fields::TIMESTAMP) {
            Some(Condition::Within(range)) => {
                assert_eq!(
                    range.start,
                    Some(Utc.with_ymd_and_hms(2025, 3, 7, 0, 0, 0).unwrap())
                );
                assert!(range.end.is_some());
            }
            other => panic!("expected a range condition, got {:?}", other),
        }
        assert_eq!(query.filter.alternatives().len(), 2);
    }

    #[test]
    fn test_company_query_rejects_inverted_range() {
        let params = CompanyParams {
            start_date: Some("2025-03-09".to_string()),
            end_date: Some("2025-03-07".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            params.to_query("Tesla", MAX_LIMIT),
            Err(QueryError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_company_query_publisher_exclusion() {
        let params = CompanyParams {
            publisher: Some("Reuters".to_string()),
            exclude_publisher: Some("true".to_string()),
            author: Some("Smith".to_string()),
            ..Default::default()
        };
        let query = params.to_query("Tesla", MAX_LIMIT).unwrap();

        assert!(matches!(
            query.filter.condition(fields::PUBLISHER),
            Some(Condition::Excludes(p)) if p.needle() == "Reuters"
        ));
        assert!(matches!(
            query.filter.condition(fields::AUTHOR),
            Some(Condition::Contains(p)) if p.needle() == "Smith"
        ));
    }

    #[test]
    fn test_exclude_flag_without_value_is_ignored() {
        let params = CompanyParams {
            exclude_publisher: Some("true".to_string()),
            ..Default::default()
        };
        let query = params.to_query("Tesla", MAX_LIMIT).unwrap();
        assert!(query.filter.condition(fields::PUBLISHER).is_none());
    }
}
