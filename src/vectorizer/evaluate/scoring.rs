use std::fmt::Debug;

use rayon::prelude::*;
use serde::Serialize;

use crate::utils::math::TermVector;

/// One ranked position: index into the corpus and its cosine score.
#[derive(Clone, Copy, PartialEq, Serialize)]
pub struct HitEntry {
    pub index: usize,
    pub score: f64,
}

impl Debug for HitEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: {:.6}", self.index, self.score)
    }
}

/// Cosine ranking of a query against corpus vectors.
///
/// - scores lie in [0, 1]; a zero vector on either side scores 0
/// - order is descending by score; equal scores keep corpus order
/// - `top_n` larger than the corpus returns everything; `top_n <= 0` returns
///   nothing (negative values are treated as 0, not rejected)
///
/// Inputs are never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    /// Cosine score of `query` against every corpus vector, in corpus order.
    pub fn scores(query: &TermVector, corpus_vectors: &[TermVector]) -> Vec<f64> {
        corpus_vectors
            .par_iter()
            .map(|doc| query.cosine(doc))
            .collect()
    }

    pub fn rank(query: &TermVector, corpus_vectors: &[TermVector], top_n: i64) -> Vec<HitEntry> {
        let take = usize::try_from(top_n).unwrap_or(0).min(corpus_vectors.len());
        if take == 0 {
            return Vec::new();
        }

        let mut hits: Vec<HitEntry> = Self::scores(query, corpus_vectors)
            .into_iter()
            .enumerate()
            .map(|(index, score)| HitEntry { index, score })
            .collect();
        // stable: ties stay in corpus order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(take);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(pairs: &[(u32, f64)]) -> TermVector {
        TermVector::from_pairs(pairs.iter().copied())
    }

    fn corpus() -> Vec<TermVector> {
        vec![
            v(&[(0, 1.0)]),
            v(&[(0, 1.0), (1, 1.0)]),
            v(&[(2, 1.0)]),
            v(&[(0, 1.0)]),
        ]
    }

    #[test]
    fn orders_by_descending_score_with_stable_ties() {
        let hits = SimilarityRanker::rank(&v(&[(0, 1.0)]), &corpus(), 10);
        let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(order, vec![0, 3, 1, 2]);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[3].score, 0.0);
    }

    #[test]
    fn clamps_top_n() {
        let q = v(&[(0, 1.0)]);
        assert_eq!(SimilarityRanker::rank(&q, &corpus(), 100).len(), 4);
        assert_eq!(SimilarityRanker::rank(&q, &corpus(), 2).len(), 2);
        assert!(SimilarityRanker::rank(&q, &corpus(), 0).is_empty());
        assert!(SimilarityRanker::rank(&q, &corpus(), -3).is_empty());
    }

    #[test]
    fn zero_query_scores_zero_in_corpus_order() {
        let hits = SimilarityRanker::rank(&TermVector::new(), &corpus(), 4);
        assert!(hits.iter().all(|h| h.score == 0.0));
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let q = v(&[(0, 0.3), (1, 2.0), (2, 0.7)]);
        for s in SimilarityRanker::scores(&q, &corpus()) {
            assert!((0.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn prefix_is_monotonic() {
        let q = v(&[(0, 0.5), (1, 1.0)]);
        let one = SimilarityRanker::rank(&q, &corpus(), 1);
        let three = SimilarityRanker::rank(&q, &corpus(), 3);
        assert_eq!(one[0], three[0]);
        assert_eq!(&three[..1], &one[..]);
    }

    #[test]
    fn empty_corpus_ranks_nothing() {
        assert!(SimilarityRanker::rank(&v(&[(0, 1.0)]), &[], 5).is_empty());
    }
}
