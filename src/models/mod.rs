//! Data models for stored news articles.

mod article;

pub use article::{fields, parse_timestamp, Article, ArticleAttributes, TimeObject};
