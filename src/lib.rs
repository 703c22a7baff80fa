/// This crate is a candidate-to-job matching engine built on a TF-IDF vector space.
pub mod config;
pub mod error;
pub mod recommend;
pub mod text;
pub mod utils;
pub mod vectorizer;

/// Recommendation Service
/// The top-level struct of this crate. It ranks the candidates of a corpus
/// against a free-text job description.
///
/// Internally, it holds:
/// - The service configuration
/// - A `VectorSpaceIndexer` used to fit corpora
/// - A bounded cache of fitted spaces keyed by corpus fingerprint
///
/// Construct it once and share it; it is `Send + Sync`.
/// A corpus is fitted the first time it is queried and reused afterwards.
///
/// # Errors
/// - `EmptyCorpus` when the corpus has no candidates
/// - `InvalidInput` when the description is blank
pub use recommend::RecommendationService;

/// Ranked Result
/// One entry of a ranking: a reference to the candidate record and its cosine
/// similarity in [0, 1].
pub use recommend::RankedResult;

/// Candidate and Corpus
/// `Candidate` is one résumé record (id, name, optional seniority, résumé text,
/// and any extra columns passed through untouched).
/// `Corpus` is the ordered set of candidates indexed together, carrying its
/// content `Fingerprint`.
///
/// Corpus order is the tie-break order of every ranking.
pub use recommend::corpus::{Candidate, Corpus, Fingerprint};

/// Description Enhancer
/// Hook for an external service that rewrites a job description before ranking.
/// Closures `Fn(&str) -> Result<String>` implement it.
/// Failures, blank answers and refusals fall back to the original description.
pub use recommend::enhance::{DescriptionEnhancer, PassThrough};

/// Dataset Loaders
/// Read candidates from the template layout or the keyed applicants dataset, and
/// job postings from the keyed postings dataset.
pub use recommend::source::{
    load_applicants, load_candidates, load_job_postings, parse_applicants, parse_candidates,
    parse_job_postings, JobPosting,
};

/// Vector Space Indexer
/// Fits a TF-IDF space (unigrams and bigrams, capped vocabulary) over document
/// texts and projects new text into it.
///
/// `VectorSpaceIndexer<E>` has the following generic parameter:
/// - `E`: TF-IDF calculation engine type (e.g., DefaultTFIDFEngine)
///
/// # Serialization
/// `FittedSpace` is serializable; `SpaceSnapshot` tags it with the corpus
/// fingerprint and encodes it as CBOR.
pub use vectorizer::{FittedSpace, VectorSpaceIndexer};

/// Snapshot of a fitted space
pub use vectorizer::serde::SpaceSnapshot;

/// Vocabulary
/// The bounded, lexicographically laid out set of terms kept at fit time.
pub use vectorizer::vocabulary::Vocabulary;

/// Token Frequency structure
/// Counts of the n-grams of one document, in first-seen order.
/// Used as base data for TF (Term Frequency) calculation.
pub use vectorizer::token::TokenFrequency;

/// TF IDF Calculation Engine Trait
/// A trait that defines how term frequency and inverse document frequency are
/// computed.
///
/// By implementing this trait, you can plug different weighting strategies into
/// `VectorSpaceIndexer<E>`.
/// A default implementation, `DefaultTFIDFEngine`, uses raw counts and smoothed
/// IDF: `ln((1 + n) / (1 + df)) + 1`.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Similarity Ranker and Hit Entry
/// `SimilarityRanker` scores a query vector against corpus vectors by cosine
/// similarity and returns the best `top_n` as `HitEntry` (index, score), ties in
/// corpus order.
pub use vectorizer::evaluate::{HitEntry, SimilarityRanker};

/// Sparse Term Vector
/// Sorted `(index, weight)` pairs over the vocabulary.
pub use utils::math::TermVector;

/// Text Normalizer
/// Lowercases, strips digits and punctuation, tokenizes, and drops stop words and
/// short tokens.
pub use text::{Language, StopWords, TextNormalizer};

/// Configuration
pub use config::{IndexerConfig, ServiceConfig};

/// Errors
pub use error::{ErrorKind, MatchError, Result};
