//! News lookup endpoints.

use axum::{extract::State, Json};
use chrono::Utc;

use super::super::AppState;
use super::extract::{ApiPath, ApiQuery};
use crate::envelope::Envelope;
use crate::models::Article;
use crate::query::{CompanyParams, StockParams};
use crate::services::NewsError;

/// `GET /stocks/{symbol}`: articles filed under a ticker symbol.
pub async fn stock_news(
    State(state): State<AppState>,
    ApiPath(symbol): ApiPath<String>,
    ApiQuery(params): ApiQuery<StockParams>,
) -> Result<Json<Vec<Article>>, NewsError> {
    let articles = state.news.stock_news(&symbol, &params).await?;
    Ok(Json(articles))
}

/// `GET /articles/{source_name}/{company}`: articles mentioning a company,
/// wrapped in the source's dataset envelope.
pub async fn company_news(
    State(state): State<AppState>,
    ApiPath((source_name, company)): ApiPath<(String, String)>,
    ApiQuery(params): ApiQuery<CompanyParams>,
) -> Result<Json<Envelope>, NewsError> {
    let envelope = state
        .news
        .company_news(&source_name, &company, &params, Utc::now())
        .await?;
    Ok(Json(envelope))
}
