use serde::{Deserialize, Serialize};
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::IndexerConfig;
use crate::text::stopwords::{Language, StopWords};

/// Deterministic text -> token pipeline.
///
/// Steps, in order:
/// 1. lowercase
/// 2. drop decimal digits
/// 3. drop every character that is neither alphanumeric nor whitespace
/// 4. split on Unicode word boundaries
/// 5. drop stop words
/// 6. drop tokens shorter than `min_token_chars` characters
///
/// Token order is preserved and duplicates are kept, so the output can be fed
/// straight into n-gram counting.
///
/// # Examples
/// ```
/// use tfidf_recommender::TextNormalizer;
///
/// let normalizer = TextNormalizer::default();
/// let tokens = normalizer.normalize("Experiência de 5 anos com Python, SQL e AWS!");
/// assert_eq!(tokens, vec!["experiência", "anos", "python", "sql", "aws"]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "NormalizerSettings", into = "NormalizerSettings")]
pub struct TextNormalizer {
    settings: NormalizerSettings,
    stop_words: StopWords,
}

/// Serializable description of a normalizer; the stop-word set is rebuilt from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NormalizerSettings {
    language: Language,
    extra_stop_words: Vec<String>,
    min_token_chars: usize,
}

impl From<NormalizerSettings> for TextNormalizer {
    fn from(settings: NormalizerSettings) -> Self {
        let stop_words = StopWords::for_language(settings.language, &settings.extra_stop_words);
        Self { settings, stop_words }
    }
}

impl From<TextNormalizer> for NormalizerSettings {
    fn from(normalizer: TextNormalizer) -> Self {
        normalizer.settings
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::from_config(&IndexerConfig::default())
    }
}

impl TextNormalizer {
    pub fn new(language: Language, extra_stop_words: Vec<String>, min_token_chars: usize) -> Self {
        NormalizerSettings { language, extra_stop_words, min_token_chars }.into()
    }

    pub fn from_config(config: &IndexerConfig) -> Self {
        Self::new(config.language, config.extra_stop_words.clone(), config.min_token_chars)
    }

    /// Normalize `text` into tokens. Text with no surviving token yields an empty vector.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let cleaned: String = text
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_ascii_digit())
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect();

        cleaned
            .unicode_words()
            .filter(|w| !self.stop_words.contains(w))
            .filter(|w| w.chars().count() >= self.settings.min_token_chars)
            .map(str::to_owned)
            .collect()
    }

    /// Tokens rejoined with single spaces.
    pub fn normalize_joined(&self, text: &str) -> String {
        self.normalize(text).join(" ")
    }

    /// Missing text normalizes to nothing.
    pub fn normalize_opt(&self, text: Option<&str>) -> Vec<String> {
        self.normalize(text.unwrap_or_default())
    }

    /// Normalize a loosely typed value: `null` is empty, strings are used as is and
    /// anything else is normalized through its JSON text form.
    pub fn normalize_value(&self, value: &Value) -> Vec<String> {
        match value {
            Value::Null => Vec::new(),
            Value::String(s) => self.normalize(s),
            other => self.normalize(&other.to_string()),
        }
    }

    /// True when this normalizer is the one `config` describes.
    pub fn matches_config(&self, config: &IndexerConfig) -> bool {
        self.settings.language == config.language
            && self.settings.min_token_chars == config.min_token_chars
            && self.settings.extra_stop_words == config.extra_stop_words
    }

    pub fn min_token_chars(&self) -> usize {
        self.settings.min_token_chars
    }

    pub fn language(&self) -> Language {
        self.settings.language
    }
}
