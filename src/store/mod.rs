//! Read-only article storage.
//!
//! Handlers talk to an [`ArticleStore`] trait object so the backing
//! database can be swapped:
//! - MongoDB (production)
//! - In-memory (tests, demos)

mod memory;
mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::Article;
use crate::query::Filter;

pub use memory::InMemoryStore;
pub use mongo::{MongoStore, MongoStoreOptions};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")]
    Unavailable(String),
    #[error("Query failed: {0}")]
    Query(String),
    #[error("Malformed record in '{collection}': {message}")]
    Decode { collection: String, message: String },
}

/// Newest and oldest publication timestamps of a set of articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampSpan {
    pub newest: DateTime<Utc>,
    pub oldest: DateTime<Utc>,
}

/// A read-only collection of article records.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Up to `limit` articles of `collection` matching `filter`, in store order.
    async fn find(&self, collection: &str, filter: &Filter, limit: u32)
        -> StoreResult<Vec<Article>>;

    /// Newest and oldest timestamps among matching articles, `None` if nothing matched.
    async fn timestamp_span(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> StoreResult<Option<TimestampSpan>>;

    /// Check the store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
