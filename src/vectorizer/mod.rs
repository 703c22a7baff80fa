pub mod evaluate;
pub mod serde;
pub mod tfidf;
pub mod token;
pub mod vocabulary;

use std::marker::PhantomData;
use std::time::Instant;

use ::serde::{Deserialize, Serialize};
use rayon::prelude::*;

use crate::config::IndexerConfig;
use crate::error::{MatchError, Result};
use crate::text::TextNormalizer;
use crate::utils::math::TermVector;
use crate::vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};
use crate::vectorizer::token::TokenFrequency;
use crate::vectorizer::vocabulary::Vocabulary;

/// IDF weight per vocabulary dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IDFVector {
    pub idf_vec: Vec<f64>,
    /// number of documents the weights were computed from
    pub doc_num: u64,
}

/// Vocabulary, IDF weights and document vectors produced by one fit.
///
/// Read-only once built. Share it behind an `Arc` between threads; `transform`
/// only reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct FittedSpace<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    normalizer: TextNormalizer,
    ngram_range: (usize, usize),
    vocabulary: Vocabulary,
    idf: IDFVector,
    documents: Vec<TermVector>,
    #[serde(skip)]
    _marker: PhantomData<E>,
}

impl<E> FittedSpace<E>
where
    E: TFIDFEngine,
{
    /// Project `text` into the fitted vocabulary.
    ///
    /// Terms the corpus never produced (or that were cut by `max_features`)
    /// contribute nothing: a query is only ever compared on the fitted
    /// vocabulary, so a fitted space never changes for one-off queries.
    pub fn transform(&self, text: &str) -> TermVector {
        let tokens = self.normalizer.normalize(text);
        let freq = TokenFrequency::from_ngrams(&tokens, self.ngram_range);
        self.vectorize(&freq)
    }

    fn vectorize(&self, freq: &TokenFrequency) -> TermVector {
        let doc_len = freq.token_sum();
        let pairs = freq.iter().filter_map(|(term, count)| {
            let idx = self.vocabulary.index_of(term)?;
            let idf = *self.idf.idf_vec.get(idx as usize)?;
            Some((idx, E::tf(count, doc_len) * idf))
        });
        TermVector::from_pairs(pairs).l2_normalized()
    }

    /// Check that a space built outside `fit` (e.g. decoded from a snapshot) is
    /// consistent with itself and was produced under `config`.
    pub fn validate(&self, config: &IndexerConfig) -> Result<()> {
        let malformed = |what: String| -> Result<()> {
            Err(MatchError::Snapshot(format!("malformed fitted space: {what}")))
        };
        let dims = self.vocabulary.len();

        if self.ngram_range != config.ngram_range || !self.normalizer.matches_config(config) {
            return malformed("text pipeline differs from its indexer configuration".into());
        }
        if dims == 0 || dims > config.max_features {
            return malformed(format!("{dims} vocabulary terms for max_features {}", config.max_features));
        }
        if self.idf.idf_vec.len() != dims {
            return malformed(format!("{} idf weights for {dims} terms", self.idf.idf_vec.len()));
        }
        if !self.idf.idf_vec.iter().all(|w| w.is_finite()) {
            return malformed("non-finite idf weight".into());
        }
        if self.idf.doc_num != self.documents.len() as u64 {
            return malformed(format!(
                "idf computed over {} documents, {} document vectors",
                self.idf.doc_num,
                self.documents.len()
            ));
        }
        if let Some(pos) = self.documents.iter().position(|d| !d.is_well_formed(dims)) {
            return malformed(format!("document vector {pos} does not fit the vocabulary"));
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn idf(&self) -> &IDFVector {
        &self.idf
    }

    /// One vector per fitted document, in corpus order
    pub fn document_vectors(&self) -> &[TermVector] {
        &self.documents
    }

    pub fn doc_num(&self) -> usize {
        self.documents.len()
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// View a vector as `(term, weight)` pairs, heaviest first.
    pub fn term_weights(&self, vector: &TermVector) -> Vec<(&str, f64)> {
        let mut weights: Vec<(&str, f64)> = vector
            .iter()
            .filter_map(|(idx, w)| self.vocabulary.term(idx).map(|t| (t, w)))
            .collect();
        weights.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        weights
    }
}

/// Builds [`FittedSpace`]s from raw document texts.
///
/// `fit` stores the space it builds; `transform` projects new text into the
/// stored space and fails with [`MatchError::NotFitted`] until a fit happened.
/// Fitting again replaces the previous space entirely.
///
/// # Examples
/// ```
/// use tfidf_recommender::{IndexerConfig, VectorSpaceIndexer};
///
/// let mut indexer: VectorSpaceIndexer = VectorSpaceIndexer::new(IndexerConfig::default()).unwrap();
/// assert!(indexer.transform("python").is_err());
///
/// indexer.fit(&["dev python pandas", "dev java spring"]).unwrap();
/// let query = indexer.transform("python com pandas").unwrap();
/// assert_eq!(query.nnz(), 3); // python, pandas, "python pandas"
/// ```
#[derive(Debug, Clone)]
pub struct VectorSpaceIndexer<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    config: IndexerConfig,
    normalizer: TextNormalizer,
    fitted: Option<FittedSpace<E>>,
}

impl<E> VectorSpaceIndexer<E>
where
    E: TFIDFEngine,
{
    pub fn new(config: IndexerConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = TextNormalizer::from_config(&config);
        Ok(Self { config, normalizer, fitted: None })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Fit and keep the resulting space.
    pub fn fit<S>(&mut self, docs: &[S]) -> Result<&FittedSpace<E>>
    where
        S: AsRef<str> + Sync,
    {
        let space = self.fit_space(docs)?;
        Ok(self.fitted.insert(space))
    }

    /// Fit without touching the stored space.
    pub fn fit_space<S>(&self, docs: &[S]) -> Result<FittedSpace<E>>
    where
        S: AsRef<str> + Sync,
    {
        if docs.is_empty() {
            return Err(MatchError::Corpus("cannot fit an empty corpus".into()));
        }
        let started = Instant::now();

        let freqs: Vec<TokenFrequency> = docs
            .par_iter()
            .map(|doc| {
                let tokens = self.normalizer.normalize(doc.as_ref());
                TokenFrequency::from_ngrams(&tokens, self.config.ngram_range)
            })
            .collect();

        let vocabulary = Vocabulary::select(&freqs, self.config.max_features);
        if vocabulary.is_empty() {
            return Err(MatchError::Corpus(
                "empty vocabulary: no document contains a usable term".into(),
            ));
        }

        let mut doc_freq = vec![0u64; vocabulary.len()];
        for freq in &freqs {
            for (term, _) in freq.iter() {
                if let Some(idx) = vocabulary.index_of(term) {
                    doc_freq[idx as usize] += 1;
                }
            }
        }
        let doc_num = docs.len() as u64;
        let idf = IDFVector {
            idf_vec: doc_freq.iter().map(|&df| E::idf(doc_num, df)).collect(),
            doc_num,
        };

        let mut space = FittedSpace {
            normalizer: self.normalizer.clone(),
            ngram_range: self.config.ngram_range,
            vocabulary,
            idf,
            documents: Vec::new(),
            _marker: PhantomData,
        };
        let documents: Vec<TermVector> = freqs.par_iter().map(|f| space.vectorize(f)).collect();
        space.documents = documents;

        tracing::info!(
            docs = doc_num,
            vocabulary = space.vocabulary.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fitted vector space"
        );
        Ok(space)
    }

    /// Project `text` into the stored space.
    pub fn transform(&self, text: &str) -> Result<TermVector> {
        self.fitted
            .as_ref()
            .map(|space| space.transform(text))
            .ok_or(MatchError::NotFitted)
    }

    pub fn fitted(&self) -> Option<&FittedSpace<E>> {
        self.fitted.as_ref()
    }
}
