//! HTTP request handlers for the web server.

mod api;
pub mod api_types;
mod extract;
mod news_api;

// Re-export handlers for use by the router
pub use api::health;
pub use news_api::{company_news, stock_news};
