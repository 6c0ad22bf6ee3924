//! quantnews - read-only HTTP API over a financial news article database.
//!
//! Core library exposing the query, store and server modules used by the
//! `quantnews` binary.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod models;
pub mod query;
pub mod server;
pub mod services;
pub mod sources;
pub mod store;
