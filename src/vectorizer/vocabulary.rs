use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::vectorizer::token::TokenFrequency;

/// Terms retained at fit time. A term's position is its vector dimension.
///
/// Selection keeps the `max_features` terms with the highest total count over the
/// corpus, ties broken by lexicographic order; retained terms are then laid out
/// lexicographically so that identical corpora always give identical dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<String>,
}

impl Vocabulary {
    pub fn select(documents: &[TokenFrequency], max_features: usize) -> Self {
        let mut corpus = TokenFrequency::new();
        for doc in documents {
            corpus.merge(doc);
        }

        let mut ranked = corpus.sorted_frequency_vector();
        if ranked.len() > max_features {
            tracing::debug!(
                candidates = ranked.len(),
                kept = max_features,
                "vocabulary truncated to max_features"
            );
            ranked.truncate(max_features);
        }

        let mut kept: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();
        Self { terms: kept.into_iter().collect() }
    }

    #[inline]
    pub fn index_of(&self, term: &str) -> Option<u32> {
        self.terms.get_index_of(term).map(|i| i as u32)
    }

    #[inline]
    pub fn term(&self, index: u32) -> Option<&str> {
        self.terms.get_index(index as usize).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}
