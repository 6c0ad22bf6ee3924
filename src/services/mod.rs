//! Service layer for news lookups.
//!
//! Domain logic separated from transport concerns, usable by the web
//! server and the CLI alike.

pub mod news;

pub use news::{NewsError, NewsService};
