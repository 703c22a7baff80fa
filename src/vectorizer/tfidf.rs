/// Weighting strategy of the vector space.
///
/// The vectorizer multiplies `tf` by `idf` for every vocabulary term of a
/// document and then scales the result to unit length. Implement this trait to
/// plug a different weighting into [`VectorSpaceIndexer`](super::VectorSpaceIndexer).
pub trait TFIDFEngine: Clone + Send + Sync {
    /// Local weight of a term seen `count` times in a document of `doc_len` terms
    fn tf(count: u32, doc_len: u64) -> f64;
    /// Global weight of a term present in `doc_freq` of `doc_num` documents
    fn idf(doc_num: u64, doc_freq: u64) -> f64;
}

/// Raw counts with smoothed IDF.
///
/// idf(t) = ln((1 + n) / (1 + df(t))) + 1
///
/// A term present in every document keeps weight 1, rarer terms weigh more and
/// no term ever reaches zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl TFIDFEngine for DefaultTFIDFEngine {
    #[inline]
    fn tf(count: u32, _doc_len: u64) -> f64 {
        count as f64
    }

    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }
}
