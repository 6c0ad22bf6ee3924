//! Article records as stored by the ingestion side.
//!
//! Only the fields the API filters on are typed. Everything else the
//! ingestion pipeline wrote is carried through `extra` untouched so that
//! responses reflect the stored document. A typed field holding a value of
//! an unexpected shape is treated as unknown and passed through the same way.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dotted field paths understood by the store.
pub mod fields {
    pub const ID: &str = "_id";
    pub const SYMBOL: &str = "symbol";
    pub const DATE: &str = "date";
    pub const TITLE: &str = "attribute.title";
    pub const DESCRIPTION: &str = "attribute.description";
    pub const PUBLISHER: &str = "attribute.publisher";
    pub const AUTHOR: &str = "attribute.author";
    pub const TIMESTAMP: &str = "time_object.timestamp";
}

/// Naive datetime layouts accepted besides RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 datetime. Offsets are honoured; naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// A financial news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Article {
    /// Ticker symbol the article was ingested under (uppercase).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Publication date as written by the ingester (e.g. `2025-03-07`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "ArticleAttributes::is_empty")]
    pub attribute: ArticleAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_object: Option<TimeObject>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<Map<String, Value>> for Article {
    fn from(mut map: Map<String, Value>) -> Self {
        let symbol = take_text(&mut map, "symbol");
        let date = take_text(&mut map, "date");

        let attribute = match map.remove("attribute") {
            Some(Value::Object(attribute)) => ArticleAttributes::from(attribute),
            Some(other) => {
                map.insert("attribute".to_string(), other);
                ArticleAttributes::default()
            }
            None => ArticleAttributes::default(),
        };

        let time_object = match map.remove("time_object") {
            Some(raw) => match TimeObject::from_stored(&raw) {
                Some(time_object) => Some(time_object),
                None => {
                    map.insert("time_object".to_string(), raw);
                    None
                }
            },
            None => None,
        };

        Self {
            symbol,
            date,
            attribute,
            time_object,
            extra: map.into_iter().collect(),
        }
    }
}

/// Descriptive fields of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ArticleAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Either a single ticker string or a list, depending on the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickers: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ArticleAttributes {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.publisher.is_none()
            && self.author.is_none()
            && self.tickers.is_none()
            && self.extra.is_empty()
    }
}

impl From<Map<String, Value>> for ArticleAttributes {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            title: take_text(&mut map, "title"),
            description: take_text(&mut map, "description"),
            publisher: take_text(&mut map, "publisher"),
            author: take_text(&mut map, "author"),
            tickers: map.remove("tickers"),
            extra: map.into_iter().collect(),
        }
    }
}

/// When an article was published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeObject {
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl TimeObject {
    pub fn utc(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            timezone: default_timezone(),
            extra: BTreeMap::new(),
        }
    }

    /// Read a stored `time_object`. `None` unless it is an object whose
    /// `timestamp` is a recognisable datetime string.
    pub fn from_stored(raw: &Value) -> Option<Self> {
        let mut map = raw.as_object()?.clone();
        let timestamp = map
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(parse_timestamp)?;
        map.remove("timestamp");
        let timezone = take_text(&mut map, "timezone").unwrap_or_else(default_timezone);

        Some(Self {
            timestamp,
            timezone,
            extra: map.into_iter().collect(),
        })
    }
}

/// Remove `key` if it holds a string. Other values stay in the map.
fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(text) => Some(text),
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

impl Article {
    /// Text value stored at a dotted field path, if the path names a text field.
    pub fn text_at(&self, path: &str) -> Option<&str> {
        match path {
            fields::SYMBOL => self.symbol.as_deref(),
            fields::DATE => self.date.as_deref(),
            fields::TITLE => self.attribute.title.as_deref(),
            fields::DESCRIPTION => self.attribute.description.as_deref(),
            fields::PUBLISHER => self.attribute.publisher.as_deref(),
            fields::AUTHOR => self.attribute.author.as_deref(),
            _ => None,
        }
    }

    /// Publication timestamp, if recorded.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time_object.as_ref().map(|t| t.timestamp)
    }

    /// Drop the store's internal identifier, if the decoder picked one up.
    pub fn strip_internal_id(mut self) -> Self {
        self.extra.remove(fields::ID);
        self
    }
}
