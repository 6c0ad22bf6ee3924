//! MongoDB-backed article store.
//!
//! Filters are rendered into MongoDB query documents. Stored documents are
//! converted to JSON before decoding so that BSON dates surface as RFC 3339
//! strings in responses.

use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, Bson, DateTime as BsonDateTime, Document, Regex};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use super::{ArticleStore, StoreError, StoreResult, TimestampSpan};
use crate::models::{fields, parse_timestamp, Article};
use crate::query::{Condition, DateRange, FieldCondition, Filter, TextPattern};

/// Connection settings for [`MongoStore`].
#[derive(Debug, Clone)]
pub struct MongoStoreOptions {
    pub uri: String,
    pub database: String,
    /// Bounds both socket connect and server selection.
    pub connect_timeout: Duration,
}

/// Article store over one MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    pub async fn connect(options: &MongoStoreOptions) -> StoreResult<Self> {
        let mut client_options = ClientOptions::parse(&options.uri)
            .await
            .map_err(|e| StoreError::Unavailable(format!("invalid connection string: {}", e)))?;
        client_options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        client_options.connect_timeout = Some(options.connect_timeout);
        client_options.server_selection_timeout = Some(options.connect_timeout);

        let client = Client::with_options(client_options)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self {
            db: client.database(&options.database),
        };
        store.ping().await?;
        Ok(store)
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}

#[async_trait]
impl ArticleStore for MongoStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: u32,
    ) -> StoreResult<Vec<Article>> {
        let query = filter_document(filter);
        tracing::debug!("find in {}: {} (limit {})", collection, query, limit);

        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(query)
            .projection(doc! { "_id": 0 })
            .limit(i64::from(limit))
            .await
            .map_err(store_error)?;
        let documents: Vec<Document> = cursor.try_collect().await.map_err(store_error)?;

        documents
            .into_iter()
            .map(|d| decode_article(collection, d))
            .collect()
    }

    async fn timestamp_span(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> StoreResult<Option<TimestampSpan>> {
        let pipeline = span_pipeline(filter);
        tracing::debug!("aggregate in {}: {:?}", collection, pipeline);

        let mut cursor = self
            .db
            .collection::<Document>(collection)
            .aggregate(pipeline)
            .await
            .map_err(store_error)?;

        let Some(group) = cursor.try_next().await.map_err(store_error)? else {
            return Ok(None);
        };

        let newest = group.get("newest").and_then(bson_timestamp);
        let oldest = group.get("oldest").and_then(bson_timestamp);
        Ok(newest
            .zip(oldest)
            .map(|(newest, oldest)| TimestampSpan { newest, oldest }))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

fn store_error(e: mongodb::error::Error) -> StoreError {
    match e.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Unavailable(e.to_string()),
        _ => StoreError::Query(e.to_string()),
    }
}

/// Aggregation computing the newest/oldest timestamp, optionally over a subset.
fn span_pipeline(filter: Option<&Filter>) -> Vec<Document> {
    let mut pipeline = Vec::with_capacity(2);
    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        pipeline.push(doc! { "$match": filter_document(filter) });
    }

    let timestamp = format!("${}", fields::TIMESTAMP);
    pipeline.push(doc! {
        "$group": {
            "_id": Bson::Null,
            "newest": { "$max": timestamp.as_str() },
            "oldest": { "$min": timestamp.as_str() },
        }
    });
    pipeline
}

/// Render a filter as a MongoDB query document.
fn filter_document(filter: &Filter) -> Document {
    let mut document = Document::new();
    for condition in filter.required() {
        document.insert(condition.path.as_str(), condition_bson(&condition.condition));
    }

    if !filter.alternatives().is_empty() {
        let alternatives: Vec<Bson> = filter
            .alternatives()
            .iter()
            .map(|c| Bson::Document(field_document(c)))
            .collect();
        document.insert("$or", alternatives);
    }
    document
}

fn field_document(condition: &FieldCondition) -> Document {
    let mut document = Document::new();
    document.insert(condition.path.as_str(), condition_bson(&condition.condition));
    document
}

fn condition_bson(condition: &Condition) -> Bson {
    match condition {
        Condition::Equals(value) => Bson::String(value.clone()),
        Condition::Contains(pattern) => Bson::Document(doc! {
            "$regex": pattern.as_regex(),
            "$options": "i",
        }),
        Condition::Excludes(pattern) => Bson::Document(doc! { "$not": regex(pattern) }),
        Condition::Within(range) => Bson::Document(range_document(range)),
    }
}

fn regex(pattern: &TextPattern) -> Bson {
    Bson::RegularExpression(Regex {
        pattern: pattern.as_regex().to_string(),
        options: "i".to_string(),
    })
}

fn range_document(range: &DateRange) -> Document {
    let mut document = Document::new();
    if let Some(start) = range.start {
        document.insert("$gte", BsonDateTime::from_chrono(start));
    }
    if let Some(end) = range.end {
        document.insert("$lte", BsonDateTime::from_chrono(end));
    }
    document
}

fn bson_timestamp(value: &Bson) -> Option<DateTime<Utc>> {
    match value {
        Bson::DateTime(dt) => Some(dt.to_chrono()),
        Bson::String(s) => parse_timestamp(s),
        _ => None,
    }
}

fn decode_article(collection: &str, mut document: Document) -> StoreResult<Article> {
    document.remove(fields::ID);
    serde_json::from_value(bson_to_json(Bson::Document(document))).map_err(|e| {
        StoreError::Decode {
            collection: collection.to_string(),
            message: e.to_string(),
        }
    })
}

fn bson_to_json(value: Bson) -> serde_json::Value {
    match value {
        Bson::Document(document) => serde_json::Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(bson_to_json).collect())
        }
        Bson::DateTime(dt) => serde_json::Value::String(
            dt.to_chrono()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
        Bson::ObjectId(id) => serde_json::Value::String(id.to_hex()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{company_filter, CompanyParams, MAX_LIMIT};
    use chrono::TimeZone;

    #[test]
    fn test_range_renders_both_bounds_under_one_key() {
        let params = CompanyParams {
            start_date: Some("2025-03-07".to_string()),
            end_date: Some("2025-03-09".to_string()),
            ..Default::default()
        };
        let query = params.to_query("Tesla", MAX_LIMIT).unwrap();
        let document = filter_document(&query.filter);

        let range = document.get_document(fields::TIMESTAMP).unwrap();
        assert_eq!(
            range.get_datetime("$gte").unwrap().to_chrono(),
            Utc.with_ymd_and_hms(2025, 3, 7, 0, 0, 0).unwrap()
        );
        assert!(range.get_datetime("$lte").is_ok());
        assert_eq!(document.get_array("$or").unwrap().len(), 2);
    }

    #[test]
    fn test_company_match_is_escaped_and_case_insensitive() {
        let document = filter_document(&company_filter("AT&T (US)").unwrap());
        let alternatives = document.get_array("$or").unwrap();
        let title = alternatives[0]
            .as_document()
            .unwrap()
            .get_document(fields::TITLE)
            .unwrap();

        assert_eq!(title.get_str("$options").unwrap(), "i");
        assert!(title.get_str("$regex").unwrap().contains(r"\(US\)"));
    }

    #[test]
    fn test_exclusion_negates_the_substring_match() {
        let params = CompanyParams {
            publisher: Some("Reuters".to_string()),
            exclude_publisher: Some("true".to_string()),
            ..Default::default()
        };
        let query = params.to_query("Tesla", MAX_LIMIT).unwrap();
        let document = filter_document(&query.filter);

        let publisher = document.get_document(fields::PUBLISHER).unwrap();
        match publisher.get("$not") {
            Some(Bson::RegularExpression(re)) => {
                assert_eq!(re.pattern, "Reuters");
                assert_eq!(re.options, "i");
            }
            other => panic!("expected $not regex, got {:?}", other),
        }
    }

    #[test]
    fn test_span_pipeline_keeps_match_stage() {
        let filter = company_filter("Tesla").unwrap();
        let pipeline = span_pipeline(Some(&filter));

        assert_eq!(pipeline.len(), 2);
        assert!(pipeline[0].contains_key("$match"));
        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(
            group.get_document("newest").unwrap().get_str("$max").unwrap(),
            "$time_object.timestamp"
        );

        assert_eq!(span_pipeline(None).len(), 1);
    }

    #[test]
    fn test_decode_strips_id_and_converts_dates() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap();
        let document = doc! {
            "_id": bson::oid::ObjectId::new(),
            "symbol": "AAPL",
            "date": "2025-03-07",
            "attribute": { "title": "Apple", "tickers": "AAPL" },
            "time_object": {
                "timestamp": BsonDateTime::from_chrono(timestamp),
                "timezone": "UTC",
            },
        };

        let article = decode_article("news_articles", document).unwrap();
        assert_eq!(article.timestamp(), Some(timestamp));
        assert!(!article.extra.contains_key(fields::ID));

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["time_object"]["timestamp"], "2025-03-07T14:30:00Z");
    }

    #[test]
    fn test_decode_keeps_records_of_unexpected_shape() {
        let document = doc! {
            "symbol": "AAPL",
            "attribute": { "title": 42, "author": ["A", "B"] },
            "time_object": { "timestamp": "last tuesday" },
        };
        let article = decode_article("news_api", document).unwrap();
        assert_eq!(article.timestamp(), None);

        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["attribute"]["title"], 42);
        assert_eq!(json["attribute"]["author"], serde_json::json!(["A", "B"]));
        assert_eq!(json["time_object"]["timestamp"], "last tuesday");
    }

    #[test]
    fn test_decode_reads_naive_string_timestamps() {
        let document = doc! {
            "symbol": "AAPL",
            "time_object": { "timestamp": "2025-03-07 14:30:00" },
        };
        let article = decode_article("news_articles", document).unwrap();
        assert_eq!(
            article.timestamp(),
            Some(Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap())
        );
        assert_eq!(
            bson_timestamp(&Bson::String("2025-03-07 14:30:00".to_string())),
            article.timestamp()
        );
    }
}
