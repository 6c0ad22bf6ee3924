//! In-memory article store.
//!
//! Evaluates filters directly against [`Article`] values. Collections keep
//! insertion order, which stands in for a database's natural order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ArticleStore, StoreResult, TimestampSpan};
use crate::models::Article;
use crate::query::Filter;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Article>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an article to `collection`.
    pub async fn insert(&self, collection: &str, article: Article) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(article);
    }

    pub async fn insert_many(&self, collection: &str, articles: impl IntoIterator<Item = Article>) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(articles);
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ArticleStore for InMemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: u32,
    ) -> StoreResult<Vec<Article>> {
        let collections = self.collections.read().await;
        let Some(articles) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(articles
            .iter()
            .filter(|a| filter.matches(a))
            .take(limit as usize)
            .cloned()
            .map(Article::strip_internal_id)
            .collect())
    }

    async fn timestamp_span(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> StoreResult<Option<TimestampSpan>> {
        let collections = self.collections.read().await;
        let Some(articles) = collections.get(collection) else {
            return Ok(None);
        };

        let mut timestamps = articles
            .iter()
            .filter(|a| filter.map_or(true, |f| f.matches(a)))
            .filter_map(Article::timestamp);

        let Some(first) = timestamps.next() else {
            return Ok(None);
        };
        let span = timestamps.fold(
            TimestampSpan {
                newest: first,
                oldest: first,
            },
            |span, at| TimestampSpan {
                newest: span.newest.max(at),
                oldest: span.oldest.min(at),
            },
        );
        Ok(Some(span))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fields, ArticleAttributes, TimeObject};
    use crate::query::{company_filter, Condition};
    use chrono::{TimeZone, Utc};

    fn article(symbol: &str, title: &str, day: u32) -> Article {
        Article {
            symbol: Some(symbol.to_string()),
            date: Some(format!("2025-03-{:02}", day)),
            attribute: ArticleAttributes {
                title: Some(title.to_string()),
                ..Default::default()
            },
            time_object: Some(TimeObject::utc(
                Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
            )),
            ..Default::default()
        }
    }

    async fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .insert_many(
                "news_articles",
                vec![
                    article("AAPL", "Apple earnings beat", 7),
                    article("TSLA", "Tesla deliveries fall", 8),
                    article("AAPL", "Apple unveils new chip", 10),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_find_respects_filter_and_limit() {
        let store = seeded().await;
        let filter = Filter::new().and(fields::SYMBOL, Condition::Equals("AAPL".to_string()));

        let all = store.find("news_articles", &filter, 10).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|a| a.symbol.as_deref() == Some("AAPL")));

        let one = store.find("news_articles", &filter, 1).await.unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].date.as_deref(), Some("2025-03-07"));
    }

    #[tokio::test]
    async fn test_find_unknown_collection_is_empty() {
        let store = seeded().await;
        let found = store.find("news_api", &Filter::new(), 10).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(store.len("news_articles").await, 3);
    }

    #[tokio::test]
    async fn test_timestamp_span() {
        let store = seeded().await;

        let span = store
            .timestamp_span("news_articles", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(span.oldest, Utc.with_ymd_and_hms(2025, 3, 7, 9, 0, 0).unwrap());
        assert_eq!(span.newest, Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());

        let tesla = company_filter("tesla").unwrap();
        let span = store
            .timestamp_span("news_articles", Some(&tesla))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(span.newest, span.oldest);

        let nobody = company_filter("Nobody Inc").unwrap();
        assert!(store
            .timestamp_span("news_articles", Some(&nobody))
            .await
            .unwrap()
            .is_none());
    }
}
