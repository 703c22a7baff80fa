pub mod corpus;
pub mod enhance;
pub mod source;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::error::{MatchError, Result};
use crate::recommend::corpus::{Candidate, Corpus, Fingerprint};
use crate::recommend::enhance::{enhance_or_original, DescriptionEnhancer};
use crate::vectorizer::evaluate::SimilarityRanker;
use crate::vectorizer::serde::SpaceSnapshot;
use crate::vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};
use crate::vectorizer::{FittedSpace, VectorSpaceIndexer};

/// A candidate of the queried corpus with its similarity to the description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult<'c> {
    pub candidate: &'c Candidate,
    pub score: f64,
}

/// One cached corpus. Empty until its first fit completes; the slot lock is held
/// during that fit so the corpus is fitted at most once at a time.
type Slot<E> = Arc<Mutex<Option<Arc<FittedSpace<E>>>>>;

/// Fitted spaces by corpus fingerprint, least recently used first.
#[derive(Debug)]
struct FitCache<E>
where
    E: TFIDFEngine,
{
    entries: IndexMap<Fingerprint, Slot<E>>,
    capacity: usize,
}

impl<E> FitCache<E>
where
    E: TFIDFEngine,
{
    fn new(capacity: usize) -> Self {
        Self { entries: IndexMap::new(), capacity }
    }

    /// Slot of `fingerprint`, created empty if missing, marked most recently used.
    fn slot(&mut self, fingerprint: &Fingerprint) -> Slot<E> {
        let slot = self.entries.shift_remove(fingerprint).unwrap_or_default();
        self.entries.insert(fingerprint.clone(), Arc::clone(&slot));
        self.evict();
        slot
    }

    fn insert(&mut self, fingerprint: Fingerprint, space: Arc<FittedSpace<E>>) {
        self.entries.shift_remove(&fingerprint);
        self.entries.insert(fingerprint, Arc::new(Mutex::new(Some(space))));
        self.evict();
    }

    /// Drop `slot` unless it was replaced in the meantime.
    fn remove_slot(&mut self, fingerprint: &Fingerprint, slot: &Slot<E>) {
        if self.entries.get(fingerprint).is_some_and(|s| Arc::ptr_eq(s, slot)) {
            self.entries.shift_remove(fingerprint);
        }
    }

    fn evict(&mut self) {
        while self.entries.len() > self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                tracing::debug!(fingerprint = evicted.short(), "evicted fitted space");
            }
        }
    }
}

/// Ranks the candidates of a corpus against a job description.
///
/// Construct one per process and share it; the service is `Send + Sync`.
/// Each distinct corpus (by [`Fingerprint`]) is fitted once and kept in a bounded
/// cache. Concurrent first requests for the same corpus fit it only once, while
/// queries against other corpora keep running.
///
/// # Examples
/// ```
/// use tfidf_recommender::{Candidate, Corpus, RecommendationService, ServiceConfig};
///
/// let service: RecommendationService = RecommendationService::new(ServiceConfig::default()).unwrap();
/// let corpus = Corpus::new(vec![
///     Candidate::new("1", "Ana", "dev python pandas"),
///     Candidate::new("2", "Bruno", "dev java spring"),
/// ]);
///
/// let ranked = service.recommend(&corpus, "vaga python", 1).unwrap();
/// assert_eq!(ranked[0].candidate.name, "Ana");
/// ```
#[derive(Debug)]
pub struct RecommendationService<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    config: ServiceConfig,
    indexer: VectorSpaceIndexer<E>,
    cache: Mutex<FitCache<E>>,
}

impl<E> RecommendationService<E>
where
    E: TFIDFEngine,
{
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        let indexer = VectorSpaceIndexer::new(config.indexer.clone())?;
        let cache = Mutex::new(FitCache::new(config.cache_capacity));
        Ok(Self { config, indexer, cache })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Rank `corpus` against `description`, best match first.
    ///
    /// At most `top_n` results; `top_n` above the corpus size returns every
    /// candidate and `top_n <= 0` returns none. Equal scores keep corpus order.
    /// Fails with [`MatchError::EmptyCorpus`] for a corpus without candidates and
    /// with [`MatchError::InvalidInput`] for a blank description.
    pub fn recommend<'c>(
        &self,
        corpus: &'c Corpus,
        description: &str,
        top_n: i64,
    ) -> Result<Vec<RankedResult<'c>>> {
        check_request(corpus, description)?;
        let space = self.fitted(corpus)?;

        let query = space.transform(description);
        if query.is_zero() {
            tracing::debug!("description shares no term with the corpus vocabulary");
        }
        let hits = SimilarityRanker::rank(&query, space.document_vectors(), top_n);

        let results = hits
            .into_iter()
            .map(|hit| {
                corpus
                    .get(hit.index)
                    .map(|candidate| RankedResult { candidate, score: hit.score })
                    .ok_or_else(|| {
                        MatchError::Corpus(format!("ranked index {} outside the corpus", hit.index))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            corpus = corpus.fingerprint().short(),
            top_n,
            returned = results.len(),
            "ranked candidates"
        );
        Ok(results)
    }

    /// Like [`recommend`](Self::recommend), with `description` first rewritten by
    /// `enhancer`. The original description is used when the enhancer fails,
    /// returns blank text, or answers with the configured refusal marker.
    pub fn recommend_enhanced<'c>(
        &self,
        corpus: &'c Corpus,
        description: &str,
        enhancer: &dyn DescriptionEnhancer,
        top_n: i64,
    ) -> Result<Vec<RankedResult<'c>>> {
        check_request(corpus, description)?;
        let description = enhance_or_original(enhancer, description, &self.config.refusal_marker);
        self.recommend(corpus, &description, top_n)
    }

    /// Fitted space for `corpus`, fitting and caching it on first use.
    pub fn fitted(&self, corpus: &Corpus) -> Result<Arc<FittedSpace<E>>> {
        if corpus.is_empty() {
            return Err(MatchError::EmptyCorpus);
        }
        let fingerprint = corpus.fingerprint();
        // the cache lock is released before fitting, only this corpus waits on the slot
        let slot = self.lock_cache().slot(fingerprint);
        let mut filled = lock(&slot);
        if let Some(space) = filled.as_ref() {
            if space.doc_num() == corpus.len() {
                tracing::debug!(corpus = fingerprint.short(), "fit cache hit");
                return Ok(Arc::clone(space));
            }
            tracing::warn!(
                corpus = fingerprint.short(),
                cached = space.doc_num(),
                expected = corpus.len(),
                "cached space does not match corpus size, refitting"
            );
        }

        let started = Instant::now();
        match self.indexer.fit_space(&corpus.resumes()) {
            Ok(space) => {
                let space = Arc::new(space);
                *filled = Some(Arc::clone(&space));
                tracing::info!(
                    corpus = fingerprint.short(),
                    candidates = corpus.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "fit cache miss, corpus fitted"
                );
                Ok(space)
            }
            Err(e) => {
                let stale = filled.is_none();
                drop(filled);
                if stale {
                    self.lock_cache().remove_slot(fingerprint, &slot);
                }
                Err(e)
            }
        }
    }

    /// True once `corpus` has a fitted space in the cache.
    pub fn is_cached(&self, corpus: &Corpus) -> bool {
        let slot = self.lock_cache().entries.get(corpus.fingerprint()).cloned();
        slot.is_some_and(|slot| lock(&slot).is_some())
    }

    /// Number of fitted spaces in the cache.
    pub fn cached_len(&self) -> usize {
        let slots: Vec<Slot<E>> = self.lock_cache().entries.values().cloned().collect();
        slots.iter().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn clear_cache(&self) {
        self.lock_cache().entries.clear();
    }

    /// Encode the fitted space of `corpus` (fitting it if needed) as CBOR.
    pub fn export_snapshot(&self, corpus: &Corpus) -> Result<Vec<u8>> {
        let space = self.fitted(corpus)?;
        SpaceSnapshot::new(
            self.config.indexer.clone(),
            corpus.fingerprint().clone(),
            (*space).clone(),
        )
        .to_cbor()
    }

    /// Seed the cache from a snapshot produced by
    /// [`export_snapshot`](Self::export_snapshot). Returns the fingerprint of
    /// the corpus it belongs to.
    ///
    /// Fails with [`MatchError::Snapshot`] when the bytes are not a consistent
    /// snapshot or were fitted under a different indexer configuration than
    /// this service's; the cache is left untouched in that case.
    pub fn import_snapshot(&self, bytes: &[u8]) -> Result<Fingerprint> {
        let snapshot = SpaceSnapshot::<E>::from_cbor(bytes)?;
        if snapshot.config != self.config.indexer {
            return Err(MatchError::Snapshot(
                "snapshot was fitted under a different indexer configuration".into(),
            ));
        }
        let fingerprint = snapshot.fingerprint;
        tracing::info!(
            corpus = fingerprint.short(),
            vocabulary = snapshot.space.vocabulary().len(),
            "imported fitted space"
        );
        self.lock_cache().insert(fingerprint.clone(), Arc::new(snapshot.space));
        Ok(fingerprint)
    }

    fn lock_cache(&self) -> MutexGuard<'_, FitCache<E>> {
        lock(&self.cache)
    }
}

/// Entries and slots are only ever replaced whole, so a poisoned lock still
/// guards consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check_request(corpus: &Corpus, description: &str) -> Result<()> {
    if corpus.is_empty() {
        return Err(MatchError::EmptyCorpus);
    }
    if description.trim().is_empty() {
        return Err(MatchError::InvalidInput("job description is empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexerConfig;
    use crate::error::ErrorKind;

    fn service() -> RecommendationService {
        RecommendationService::new(ServiceConfig::default()).unwrap()
    }

    fn corpus(resumes: &[(&str, &str)]) -> Corpus {
        resumes
            .iter()
            .map(|(name, resume)| Candidate::new(*name, *name, *resume))
            .collect()
    }

    fn names<'a>(results: &'a [RankedResult<'_>]) -> Vec<&'a str> {
        results.iter().map(|r| r.candidate.name.as_str()).collect()
    }

    fn three_resumes() -> Corpus {
        corpus(&[
            ("A", "dev python pandas"),
            ("B", "dev java spring"),
            ("C", "dev python flask pandas"),
        ])
    }

    #[test]
    fn ranks_by_lexical_overlap() {
        let svc = service();
        let corpus = three_resumes();
        let ranked = svc.recommend(&corpus, "vaga python pandas", 2).unwrap();
        // A also shares the "python pandas" bigram with the description
        assert_eq!(names(&ranked), vec!["A", "C"]);
        assert!(ranked[0].score > ranked[1].score);
        assert!(ranked[1].score > 0.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let svc = service();
        let corpus = three_resumes();
        let first = svc.recommend(&corpus, "python flask", 3).unwrap();
        let second = svc.recommend(&corpus, "python flask", 3).unwrap();
        assert_eq!(first, second);
        let bits = |r: &[RankedResult]| r.iter().map(|x| x.score.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn unrelated_description_scores_zero_in_corpus_order() {
        let svc = service();
        let corpus = three_resumes();
        let ranked = svc.recommend(&corpus, "kubernetes terraform", 10).unwrap();
        assert_eq!(names(&ranked), vec!["A", "B", "C"]);
        assert!(ranked.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn scores_stay_within_unit_interval() {
        let svc = service();
        let corpus = three_resumes();
        for r in svc.recommend(&corpus, "dev python pandas flask java", 3).unwrap() {
            assert!((0.0..=1.0).contains(&r.score));
        }
    }

    #[test]
    fn top_n_is_clamped() {
        let svc = service();
        let corpus = three_resumes();
        assert_eq!(svc.recommend(&corpus, "python", 50).unwrap().len(), 3);
        assert!(svc.recommend(&corpus, "python", 0).unwrap().is_empty());
        assert!(svc.recommend(&corpus, "python", -1).unwrap().is_empty());
    }

    #[test]
    fn identical_resumes_tie_in_corpus_order() {
        let svc = service();
        let corpus = corpus(&[
            ("first", "analista dados python"),
            ("other", "gerente projetos"),
            ("second", "analista dados python"),
        ]);
        let ranked = svc.recommend(&corpus, "analista python", 3).unwrap();
        assert_eq!(names(&ranked)[..2], ["first", "second"]);
        assert_eq!(ranked[0].score, ranked[1].score);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let svc = service();
        let err = svc.recommend(&Corpus::new(Vec::new()), "python", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyCorpus);
    }

    #[test]
    fn blank_description_is_rejected() {
        let svc = service();
        let corpus = three_resumes();
        for description in ["", "   \n\t"] {
            let err = svc.recommend(&corpus, description, 3).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert_eq!(svc.cached_len(), 0);
    }

    #[test]
    fn shorter_ranking_is_a_prefix() {
        let svc = service();
        let corpus = three_resumes();
        let one = svc.recommend(&corpus, "dev python", 1).unwrap();
        let three = svc.recommend(&corpus, "dev python", 3).unwrap();
        assert_eq!(one[0], three[0]);
    }

    #[test]
    fn extra_fields_pass_through() {
        let svc = service();
        let corpus = Corpus::new(vec![Candidate::new("9", "Ana", "dev python")
            .with_seniority("Sênior")
            .with_extra("cidade", serde_json::json!("Recife"))]);
        let ranked = svc.recommend(&corpus, "python", 1).unwrap();
        assert_eq!(ranked[0].candidate.seniority.as_deref(), Some("Sênior"));
        assert_eq!(ranked[0].candidate.extra["cidade"], "Recife");
    }

    #[test]
    fn corpus_is_fitted_once() {
        let svc = service();
        let corpus = three_resumes();
        let a = svc.fitted(&corpus).unwrap();
        svc.recommend(&corpus, "python", 2).unwrap();
        let b = svc.fitted(&corpus).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(svc.cached_len(), 1);

        svc.clear_cache();
        assert!(!svc.is_cached(&corpus));
        let c = svc.fitted(&corpus).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn least_recently_used_corpus_is_evicted() {
        let config = ServiceConfig { cache_capacity: 2, ..ServiceConfig::default() };
        let svc: RecommendationService = RecommendationService::new(config).unwrap();
        let first = corpus(&[("A", "dev python")]);
        let second = corpus(&[("B", "dev java")]);
        let third = corpus(&[("C", "dev rust")]);

        svc.fitted(&first).unwrap();
        svc.fitted(&second).unwrap();
        svc.fitted(&first).unwrap();
        svc.fitted(&third).unwrap();

        assert!(svc.is_cached(&first));
        assert!(!svc.is_cached(&second));
        assert!(svc.is_cached(&third));
    }

    #[test]
    fn enhanced_description_feeds_the_ranking() {
        let svc = service();
        let corpus = three_resumes();
        let to_java = |_: &str| -> Result<String> { Ok("desenvolvedor java spring".into()) };
        let ranked = svc.recommend_enhanced(&corpus, "vaga backend", &to_java, 1).unwrap();
        assert_eq!(names(&ranked), vec!["B"]);

        let failing = |_: &str| -> Result<String> { Err(MatchError::Enhancement("offline".into())) };
        let ranked = svc.recommend_enhanced(&corpus, "vaga flask", &failing, 1).unwrap();
        assert_eq!(names(&ranked), vec!["C"]);
    }

    #[test]
    fn snapshot_seeds_another_service() {
        let corpus = three_resumes();
        let source = service();
        let bytes = source.export_snapshot(&corpus).unwrap();

        let target = service();
        let fingerprint = target.import_snapshot(&bytes).unwrap();
        assert_eq!(&fingerprint, corpus.fingerprint());
        assert!(target.is_cached(&corpus));
        assert_eq!(
            source.recommend(&corpus, "python pandas", 3).unwrap(),
            target.recommend(&corpus, "python pandas", 3).unwrap()
        );
    }

    #[test]
    fn service_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecommendationService>();

        let svc = service();
        let corpus = three_resumes();
        let expected = svc.recommend(&corpus, "python pandas", 3).unwrap();
        svc.clear_cache();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| svc.recommend(&corpus, "python pandas", 3).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
        assert_eq!(svc.cached_len(), 1);
    }

    #[test]
    fn snapshot_from_another_configuration_is_rejected() {
        let corpus = corpus(&[("A", "dev python pandas"), ("B", "dev java spring")]);
        let config = ServiceConfig {
            indexer: IndexerConfig { extra_stop_words: vec!["python".into()], ..IndexerConfig::default() },
            ..ServiceConfig::default()
        };
        let source: RecommendationService = RecommendationService::new(config).unwrap();
        let bytes = source.export_snapshot(&corpus).unwrap();

        let target = service();
        let err = target.import_snapshot(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Snapshot);
        assert!(!target.is_cached(&corpus));

        let ranked = target.recommend(&corpus, "python", 2).unwrap();
        assert_eq!(names(&ranked), vec!["A", "B"]);
        assert!(ranked[0].score > 0.0);
    }

    #[test]
    fn inconsistent_snapshot_is_rejected_before_caching() {
        use serde_cbor::Value;

        fn field<'v>(value: &'v mut Value, name: &str) -> &'v mut Value {
            match value {
                Value::Map(map) => map.get_mut(&Value::Text(name.into())).unwrap(),
                other => panic!("expected a map, got {other:?}"),
            }
        }

        let corpus = three_resumes();
        let bytes = service().export_snapshot(&corpus).unwrap();
        let mut value: Value = serde_cbor::from_slice(&bytes).unwrap();
        *field(field(field(&mut value, "space"), "idf"), "idf_vec") = Value::Array(Vec::new());
        let broken = serde_cbor::to_vec(&value).unwrap();

        let svc = service();
        assert_eq!(svc.import_snapshot(&broken).unwrap_err().kind(), ErrorKind::Snapshot);
        assert!(!svc.is_cached(&corpus));
        assert_eq!(svc.recommend(&corpus, "python pandas", 1).unwrap()[0].candidate.name, "A");
    }

    #[test]
    fn failed_fit_leaves_no_cache_entry() {
        let svc = service();
        let unusable = corpus(&[("A", "de para com"), ("B", "123 !!")]);
        assert_eq!(svc.recommend(&unusable, "python", 1).unwrap_err().kind(), ErrorKind::Corpus);
        assert_eq!(svc.cached_len(), 0);
        assert!(svc.lock_cache().entries.is_empty());
    }

    #[test]
    fn fit_in_progress_does_not_block_other_corpora() {
        let svc = service();
        let cached = three_resumes();
        svc.fitted(&cached).unwrap();

        // hold the slot of a corpus as an unfinished fit would
        let busy = corpus(&[("Z", "gerente projetos scrum")]);
        let slot = svc.lock_cache().slot(busy.fingerprint());
        let _fitting = lock(&slot);

        let ranked = svc.recommend(&cached, "python pandas", 1).unwrap();
        assert_eq!(names(&ranked), vec!["A"]);
    }
}
