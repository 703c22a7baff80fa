use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::text::Language;

/// Default cap on vocabulary size.
pub const DEFAULT_MAX_FEATURES: usize = 5000;
/// Number of fitted corpora kept by a service.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;
/// Phrase the rewriting model answers with when it refuses a description.
pub const DEFAULT_REFUSAL_MARKER: &str = "essa pergunta foge do contexto no qual fui programada";

/// Parameters of the text pipeline and the vector space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Maximum number of vocabulary terms kept at fit time
    pub max_features: usize,
    /// Inclusive n-gram range (1, 2) = unigrams and bigrams
    pub ngram_range: (usize, usize),
    /// Tokens shorter than this many characters are dropped
    pub min_token_chars: usize,
    pub language: Language,
    pub extra_stop_words: Vec<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            ngram_range: (1, 2),
            min_token_chars: 3,
            language: Language::Portuguese,
            extra_stop_words: Vec::new(),
        }
    }
}

impl IndexerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(MatchError::Config("max_features must be at least 1".into()));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(MatchError::Config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

/// Configuration of a [`RecommendationService`](crate::RecommendationService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub indexer: IndexerConfig,
    /// How many fitted corpora stay cached; least recently used is evicted
    pub cache_capacity: usize,
    pub refusal_marker: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            indexer: IndexerConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            refusal_marker: DEFAULT_REFUSAL_MARKER.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with `RECOMMENDER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| MatchError::source_io(path, e))?;
        let config: ServiceConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.indexer.validate()?;
        if self.cache_capacity == 0 {
            return Err(MatchError::Config("cache_capacity must be at least 1".into()));
        }
        Ok(())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();
        if let Some(v) = parse_var(&lookup, "RECOMMENDER_MAX_FEATURES")? {
            config.indexer.max_features = v;
        }
        if let Some(v) = parse_var(&lookup, "RECOMMENDER_MIN_TOKEN_CHARS")? {
            config.indexer.min_token_chars = v;
        }
        if let Some(v) = parse_var(&lookup, "RECOMMENDER_CACHE_CAPACITY")? {
            config.cache_capacity = v;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| MatchError::Config(format!("{key} must be a non-negative integer, got '{raw}'"))),
    }
}
