use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Term occurrence counts of a single document.
///
/// Terms are kept in first-seen order. A term is either a single token or an
/// n-gram of consecutive tokens joined by one space.
///
/// # Examples
/// ```
/// use tfidf_recommender::vectorizer::token::TokenFrequency;
///
/// let tokens = ["dev", "python", "pandas"];
/// let freq = TokenFrequency::from_ngrams(&tokens, (1, 2));
/// assert_eq!(freq.token_count("python pandas"), 1);
/// assert_eq!(freq.token_sum(), 5);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    token_count: IndexMap<String, u32>,
    total_token_count: u64,
}

/// Token addition
impl TokenFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_token(&mut self, token: &str) -> &mut Self {
        // avoid allocating for terms already seen
        if let Some(count) = self.token_count.get_mut(token) {
            *count += 1;
        } else {
            self.token_count.insert(token.to_string(), 1);
        }
        self.total_token_count += 1;
        self
    }

    #[inline]
    pub fn add_tokens<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for token in tokens {
            self.add_token(token.as_ref());
        }
        self
    }

    /// Count every n-gram of `tokens` for n in the inclusive `ngram_range`.
    /// Unigrams come first, then bigrams, and so on.
    pub fn add_ngrams<T>(&mut self, tokens: &[T], ngram_range: (usize, usize)) -> &mut Self
    where
        T: AsRef<str>,
    {
        let (min_n, max_n) = ngram_range;
        for n in min_n.max(1)..=max_n {
            if n == 1 {
                self.add_tokens(tokens);
                continue;
            }
            for window in tokens.windows(n) {
                let term = window
                    .iter()
                    .map(|t| t.as_ref())
                    .collect::<Vec<&str>>()
                    .join(" ");
                self.add_token(&term);
            }
        }
        self
    }

    /// Add every count of `other` to this one.
    pub fn merge(&mut self, other: &TokenFrequency) -> &mut Self {
        for (token, count) in other.iter() {
            if let Some(c) = self.token_count.get_mut(token) {
                *c = c.saturating_add(count);
            } else {
                self.token_count.insert(token.to_string(), count);
            }
        }
        self.total_token_count += other.total_token_count;
        self
    }

    pub fn from_ngrams<T>(tokens: &[T], ngram_range: (usize, usize)) -> Self
    where
        T: AsRef<str>,
    {
        let mut freq = Self::new();
        freq.add_ngrams(tokens, ngram_range);
        freq
    }
}

/// Lookups
impl TokenFrequency {
    #[inline]
    pub fn token_count(&self, token: &str) -> u32 {
        self.token_count.get(token).copied().unwrap_or(0)
    }

    /// Sum of all counts
    #[inline]
    pub fn token_sum(&self) -> u64 {
        self.total_token_count
    }

    /// Number of distinct terms
    #[inline]
    pub fn token_num(&self) -> usize {
        self.token_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.token_count.is_empty()
    }

    /// `(term, count)` in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.token_count.iter().map(|(t, &c)| (t.as_str(), c))
    }

    /// Terms sorted by descending count, ties in lexicographic order
    pub fn sorted_frequency_vector(&self) -> Vec<(String, u32)> {
        let mut token_list: Vec<(String, u32)> = self
            .token_count
            .iter()
            .map(|(token, &count)| (token.clone(), count))
            .collect();
        token_list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        token_list
    }
}
