//! Source profiles: which collection backs a source and how its data is
//! described in the output envelope.
//!
//! Known providers have dedicated profiles. Any other source name resolves
//! to a generic profile over the default collection.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Collection queried for unknown sources and for ticker lookups.
pub const DEFAULT_COLLECTION: &str = "news_articles";
/// Dataset type reported when a profile does not name one.
pub const DEFAULT_DATASET_TYPE: &str = "News data";
/// Dataset id reported for sources without a registered profile.
pub const GENERIC_DATASET_ID: &str = "0";

/// NewsAPI.org articles live in their own collection.
pub const NEWS_API_ORG: &str = "news_api_org";

/// Errors loading source profiles from disk.
#[derive(Debug, thiserror::Error)]
pub enum SourceConfigError {
    #[error("Failed to read sources file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid sources file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Dataset metadata and backing collection for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Source name as it appears in request paths.
    pub name: String,
    pub collection: String,
    #[serde(default = "default_dataset_type")]
    pub dataset_type: String,
    pub dataset_id: String,
}

fn default_dataset_type() -> String {
    DEFAULT_DATASET_TYPE.to_string()
}

impl SourceProfile {
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        dataset_type: impl Into<String>,
        dataset_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            dataset_type: dataset_type.into(),
            dataset_id: dataset_id.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourcesFile {
    #[serde(default, rename = "source")]
    sources: Vec<SourceProfile>,
}

/// Lookup table from source name to profile.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    default_collection: String,
    profiles: HashMap<String, SourceProfile>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_builtin(DEFAULT_COLLECTION)
    }
}

impl SourceRegistry {
    /// Registry with no known sources; everything resolves generically.
    pub fn empty(default_collection: impl Into<String>) -> Self {
        Self {
            default_collection: default_collection.into(),
            profiles: HashMap::new(),
        }
    }

    /// Registry with the built-in provider profiles.
    pub fn with_builtin(default_collection: impl Into<String>) -> Self {
        let mut registry = Self::empty(default_collection);
        registry.register(SourceProfile::new(
            NEWS_API_ORG,
            "news_api",
            DEFAULT_DATASET_TYPE,
            "1",
        ));
        registry
    }

    /// Add or replace a profile.
    pub fn register(&mut self, profile: SourceProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Register every `[[source]]` entry of a TOML file.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, SourceConfigError> {
        let content = fs::read_to_string(path).map_err(|source| SourceConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: SourcesFile =
            toml::from_str(&content).map_err(|source| SourceConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let count = file.sources.len();
        for profile in file.sources {
            tracing::info!(
                "Registered source '{}' -> collection '{}'",
                profile.name,
                profile.collection
            );
            self.register(profile);
        }
        Ok(count)
    }

    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// Whether `name` has a dedicated profile.
    pub fn is_known(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile for `name`, falling back to a generic one over the default collection.
    pub fn resolve(&self, name: &str) -> SourceProfile {
        self.profiles.get(name).cloned().unwrap_or_else(|| {
            SourceProfile::new(
                name,
                self.default_collection.clone(),
                DEFAULT_DATASET_TYPE,
                GENERIC_DATASET_ID,
            )
        })
    }

    /// Known source names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
