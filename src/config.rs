//! Runtime configuration.
//!
//! Values come from command-line flags with environment fallbacks (a `.env`
//! file is loaded first by the binary). The connection string is mandatory:
//! startup fails before any socket is opened when it is missing.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::query::MAX_LIMIT;
use crate::sources::{SourceConfigError, SourceRegistry, DEFAULT_COLLECTION};

/// Database queried when none is configured.
pub const DEFAULT_DATABASE: &str = "quant_data";
/// Seconds allowed for connecting and selecting a server.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

const MONGO_SCHEMES: &[&str] = &["mongodb://", "mongodb+srv://"];

/// Errors in the supplied configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MONGO_URI is not set (expected e.g. mongodb://localhost:27017)")]
    MissingMongoUri,
    #[error("MONGO_URI must start with mongodb:// or mongodb+srv://, got '{0}'")]
    InvalidMongoUri(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Configuration flags shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI", global = true, hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// Database holding the article collections
    #[arg(long, env = "MONGO_DATABASE", global = true, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Collection used for ticker lookups and unregistered sources
    #[arg(long, env = "MONGO_COLLECTION", global = true, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Seconds to wait for the database before giving up
    #[arg(
        long,
        env = "MONGO_CONNECT_TIMEOUT",
        global = true,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS
    )]
    pub connect_timeout: u64,

    /// Upper bound for the `limit` query parameter
    #[arg(long, env = "QUANTNEWS_MAX_LIMIT", global = true, default_value_t = MAX_LIMIT)]
    pub max_limit: u32,

    /// TOML file registering additional sources
    #[arg(long, env = "QUANTNEWS_SOURCES", global = true)]
    pub sources: Option<PathBuf>,
}

impl ConfigArgs {
    /// Validate flags into [`Settings`].
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let mongo_uri = self
            .mongo_uri
            .map(|uri| uri.trim().to_string())
            .filter(|uri| !uri.is_empty())
            .ok_or(ConfigError::MissingMongoUri)?;
        if !MONGO_SCHEMES.iter().any(|scheme| mongo_uri.starts_with(scheme)) {
            return Err(ConfigError::InvalidMongoUri(redact_uri(&mongo_uri)));
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::Empty("database"));
        }
        if self.collection.trim().is_empty() {
            return Err(ConfigError::Empty("collection"));
        }
        if self.connect_timeout == 0 {
            return Err(ConfigError::Zero("connect_timeout"));
        }
        if self.max_limit == 0 {
            return Err(ConfigError::Zero("max_limit"));
        }

        Ok(Settings {
            mongo_uri,
            database: self.database,
            collection: self.collection,
            connect_timeout: Duration::from_secs(self.connect_timeout),
            max_limit: self.max_limit,
            sources_file: self.sources,
        })
    }
}

/// Validated application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mongo_uri: String,
    pub database: String,
    /// Default article collection.
    pub collection: String,
    pub connect_timeout: Duration,
    pub max_limit: u32,
    pub sources_file: Option<PathBuf>,
}

impl Settings {
    /// Settings with defaults for everything but the connection string.
    pub fn new(mongo_uri: impl Into<String>) -> Self {
        Self {
            mongo_uri: mongo_uri.into(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_limit: MAX_LIMIT,
            sources_file: None,
        }
    }

    /// Connection string safe for logs.
    pub fn redacted_mongo_uri(&self) -> String {
        redact_uri(&self.mongo_uri)
    }

    /// Built-in source profiles plus any from the configured sources file.
    pub fn source_registry(&self) -> Result<SourceRegistry, SourceConfigError> {
        let mut registry = SourceRegistry::with_builtin(self.collection.clone());
        if let Some(ref path) = self.sources_file {
            registry.load_file(path)?;
        }
        Ok(registry)
    }
}

/// Mask the password of a connection string.
fn redact_uri(uri: &str) -> String {
    if let Ok(mut url) = Url::parse(uri) {
        if url.password().is_some() && url.set_password(Some("***")).is_ok() {
            return url.to_string();
        }
        if url.password().is_none() {
            return uri.to_string();
        }
    }

    // Seed lists (host1,host2) don't parse as URLs
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end + 3 => {
            let credentials = &uri[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &uri[..scheme_end + 3], user, &uri[at..]),
                None => uri.to_string(),
            }
        }
        _ => uri.to_string(),
    }
}
