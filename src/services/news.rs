//! Article lookups shared by the HTTP handlers and the CLI.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::envelope::Envelope;
use crate::models::Article;
use crate::query::{company_filter, CompanyParams, QueryError, StockParams, MAX_LIMIT};
use crate::sources::SourceRegistry;
use crate::store::{ArticleStore, StoreError, TimestampSpan};

/// Errors from news lookups.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("No news found for {0}")]
    NotFound(String),
    #[error(transparent)]
    BadInput(#[from] QueryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Query service over an injected article store.
#[derive(Clone)]
pub struct NewsService {
    store: Arc<dyn ArticleStore>,
    sources: Arc<SourceRegistry>,
    max_limit: u32,
}

impl NewsService {
    pub fn new(store: Arc<dyn ArticleStore>, sources: SourceRegistry) -> Self {
        Self {
            store,
            sources: Arc::new(sources),
            max_limit: MAX_LIMIT,
        }
    }

    /// Cap applied to every requested `limit`.
    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit.max(1);
        self
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn store(&self) -> &dyn ArticleStore {
        self.store.as_ref()
    }

    /// Articles filed under a ticker symbol, from the default collection.
    pub async fn stock_news(
        &self,
        symbol: &str,
        params: &StockParams,
    ) -> Result<Vec<Article>, NewsError> {
        let query = params.to_query(symbol, self.max_limit)?;
        let collection = self.sources.default_collection();
        tracing::debug!(
            "Stock lookup for {} in {} (limit {})",
            symbol,
            collection,
            query.limit
        );

        let articles = self
            .store
            .find(collection, &query.filter, query.limit)
            .await?;
        if articles.is_empty() {
            return Err(NewsError::NotFound(symbol.to_string()));
        }
        Ok(articles)
    }

    /// Articles mentioning `company` from the collection backing `source_name`,
    /// wrapped in that source's dataset envelope.
    pub async fn company_news(
        &self,
        source_name: &str,
        company: &str,
        params: &CompanyParams,
        now: DateTime<Utc>,
    ) -> Result<Envelope, NewsError> {
        let profile = self.sources.resolve(source_name);
        let query = params.to_query(company, self.max_limit)?;
        tracing::debug!(
            "Company lookup for '{}' in {} (source {}, limit {})",
            company,
            profile.collection,
            source_name,
            query.limit
        );

        let articles = self
            .store
            .find(&profile.collection, &query.filter, query.limit)
            .await?;
        if articles.is_empty() {
            return Err(NewsError::NotFound(company.to_string()));
        }
        Ok(Envelope::build(articles, now, &profile))
    }

    /// Newest and oldest article timestamps for a source, optionally limited to
    /// articles mentioning `company`.
    pub async fn newest_oldest(
        &self,
        source_name: &str,
        company: Option<&str>,
    ) -> Result<Option<TimestampSpan>, NewsError> {
        let profile = self.sources.resolve(source_name);
        let filter = company
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(company_filter)
            .transpose()?;

        Ok(self
            .store
            .timestamp_span(&profile.collection, filter.as_ref())
            .await?)
    }
}
