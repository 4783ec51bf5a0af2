pub mod config;
pub mod corpus;
pub mod pivot;
pub mod scheme;
pub mod serde;
pub mod tfidf;
pub mod token;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{Result, TfidfError};
use crate::utils::normalizer::Normalization;
use crate::vectorizer::config::TfidfConfig;
use crate::vectorizer::corpus::{CorpusAccumulator, CorpusStatistics};
use crate::vectorizer::pivot::{pivoted_normalize, PivotedBatch};
use crate::vectorizer::tfidf::{DocContext, GlobalWeight, LocalWeight};
use crate::vectorizer::token::VocabularyIndex;

pub use crate::utils::math::vector::{SparseVector, TermId};

/// Everything `fit` produces. Shared behind an `Arc` and never mutated.
#[derive(Debug)]
struct FittedState {
    stats: CorpusStatistics,
    /// global weight of every term in `stats`
    idfs: IndexMap<TermId, f64>,
}

/// Result of transforming a batch of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct TfidfBatch {
    pub vectors: Vec<SparseVector<f64>>,
    /// pivoted normalization factor per document, only with pivoting enabled
    pub norms: Option<Vec<f64>>,
}

/// TF-IDF model.
///
/// `fit` streams a corpus of bag-of-words documents once and keeps the
/// document frequencies. `transform` turns a document into its weighted,
/// normalized sparse vector:
///
/// `weight(t) = local(count(t), doc) * global(df(t), num_docs)`
///
/// Terms the model has not seen are dropped, as are weights that end up
/// within `eps` of zero.
///
/// The fitted statistics are immutable and shared, so `transform` takes
/// `&self` and can run on many threads at once.
///
/// # Examples
/// ```
/// use tf_idf_pivot::{TfidfConfig, TfidfModel};
///
/// let corpus: Vec<Vec<(u32, f64)>> = vec![vec![(0, 1.0), (1, 1.0)], vec![(0, 1.0), (2, 1.0)]];
/// let mut model = TfidfModel::new(TfidfConfig::default()).unwrap();
/// model.fit(&corpus).unwrap();
///
/// let v = model.transform(&[(0, 1.0), (1, 1.0)]).unwrap();
/// assert_eq!(v.as_slice(), &[(1, 1.0)]);
/// ```
#[derive(Clone)]
pub struct TfidfModel {
    config: TfidfConfig,
    local: LocalWeight,
    global: GlobalWeight,
    normalization: Normalization,
    vocabulary: Option<Arc<dyn VocabularyIndex>>,
    fitted: Option<Arc<FittedState>>,
}

impl TfidfModel {
    /// Validate the configuration and build an unfitted model.
    pub fn new(config: TfidfConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            local: config.local_weight(),
            global: config.global_weight(),
            normalization: config.normalization(),
            config,
            vocabulary: None,
            fitted: None,
        })
    }

    /// Rebuild a fitted model from previously computed statistics.
    pub fn from_statistics(config: TfidfConfig, stats: CorpusStatistics) -> Result<Self> {
        let mut model = Self::new(config)?;
        let stats = if model.config.pivoted() && stats.pivot_stats().is_none() {
            stats.with_average_pivot()
        } else {
            stats
        };
        model.install(stats);
        Ok(model)
    }

    /// Attach a vocabulary. Ids at or past its length are rejected as
    /// malformed and error messages name the offending token.
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: Arc<dyn VocabularyIndex>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    /// Gather corpus statistics in one pass over `corpus`.
    ///
    /// The corpus can be any lazy stream; it is consumed exactly once. On
    /// error the previously fitted statistics stay in place.
    pub fn fit<I, D>(&mut self, corpus: I) -> Result<&CorpusStatistics>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<[(TermId, f64)]>,
    {
        let mut acc = CorpusAccumulator::new(self.config.pivoted());
        for doc in corpus {
            let doc = self.clean_document(doc.as_ref())?;
            acc.add_document(&doc);
        }
        let stats = acc.finish();
        debug!(
            num_docs = stats.num_docs(),
            vocab_size = stats.vocab_size(),
            num_nnz = stats.num_nnz(),
            "fitted tf-idf statistics"
        );
        Ok(self.install(stats))
    }

    /// Take document frequencies straight from a vocabulary that counted
    /// them while it was built, skipping the corpus pass.
    pub fn fit_from_vocabulary(&mut self, vocabulary: &dyn VocabularyIndex) -> Result<&CorpusStatistics> {
        let dfs = (0..vocabulary.len()).map(|i| {
            let id = i as TermId;
            (id, vocabulary.doc_freq(id))
        });
        let mut stats = CorpusStatistics::from_parts(dfs, vocabulary.num_docs(), vocabulary.num_nnz());
        if self.config.pivoted() {
            stats = stats.with_average_pivot();
        }
        debug!(
            num_docs = stats.num_docs(),
            vocab_size = stats.vocab_size(),
            "initialised tf-idf statistics from vocabulary"
        );
        Ok(self.install(stats))
    }

    fn install(&mut self, stats: CorpusStatistics) -> &CorpusStatistics {
        let num_docs = stats.num_docs();
        let idfs = stats
            .document_frequencies()
            .map(|(id, df)| (id, self.global.apply(df, num_docs)))
            .collect();
        let state = Arc::new(FittedState { stats, idfs });
        &self.fitted.insert(state).stats
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    #[inline]
    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    #[inline]
    pub fn statistics(&self) -> Option<&CorpusStatistics> {
        self.fitted.as_ref().map(|s| &s.stats)
    }

    /// Global weight of a fitted term.
    #[inline]
    pub fn idf(&self, id: TermId) -> Option<f64> {
        self.fitted.as_ref().and_then(|s| s.idfs.get(&id).copied())
    }

    /// Weight one bag-of-words document.
    ///
    /// Weights that come out infinite or NaN (log-based local weights on
    /// fractional counts below one) are dropped like zero weights.
    ///
    /// Only the scheme's normalization runs here. The pivoted pass needs a
    /// pivot and per-document unique counts, so with `pivot_norm` enabled use
    /// [`TfidfModel::transform_batch`], passing `&[doc]` for a single document.
    ///
    /// # Errors
    /// `NotFitted` before `fit`, `MalformedInput` for negative or non-finite
    /// counts and ids outside the attached vocabulary.
    pub fn transform(&self, doc: &[(TermId, f64)]) -> Result<SparseVector<f64>> {
        let state = self.state("transform")?;
        let doc = self.clean_document(doc)?;
        let ctx = DocContext::from_counts(doc.values());

        let mut vec = SparseVector::with_capacity(doc.nnz());
        for (id, count) in doc.iter() {
            let Some(&idf) = state.idfs.get(&id) else {
                trace!(term_id = id, "dropping unseen term");
                continue;
            };
            let weight = self.local.apply(count, &ctx) * idf;
            if !weight.is_finite() {
                trace!(term_id = id, count, weight, "dropping non-finite weight");
                continue;
            }
            if weight != 0.0 {
                vec.push(id, weight);
            }
        }

        let mut vec = self.normalization.normalize(vec);
        vec.retain_nonzero(self.config.eps);
        vec.shrink_to_fit();
        Ok(vec)
    }

    /// Weight a batch of documents in parallel, keeping their order, and run
    /// the pivoted pass when it is enabled.
    pub fn transform_batch<D>(&self, docs: &[D]) -> Result<TfidfBatch>
    where
        D: AsRef<[(TermId, f64)]> + Sync,
    {
        self.state("transform_batch")?;
        debug!(docs = docs.len(), "transforming batch");
        let vectors = docs
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if self.config.pivoted() {
            let pivoted = self.pivoted_normalize(vectors)?;
            Ok(TfidfBatch {
                vectors: pivoted.vectors,
                norms: Some(pivoted.norms),
            })
        } else {
            Ok(TfidfBatch { vectors, norms: None })
        }
    }

    /// Pivoted unique normalization of already weighted vectors.
    ///
    /// The pivot is the configured one, else the average unique term count of
    /// the fitted corpus, else the average over `batch`.
    pub fn pivoted_normalize(&self, batch: Vec<SparseVector<f64>>) -> Result<PivotedBatch> {
        let state = self.state("pivoted_normalize")?;
        let pivot = self.config.pivot.or_else(|| {
            state
                .stats
                .pivot_stats()
                .and_then(|p| p.average_unique_terms)
        });
        let mut out = pivoted_normalize(batch, self.config.slope, pivot)?;
        for vec in out.vectors.iter_mut() {
            vec.retain_nonzero(self.config.eps);
        }
        Ok(out)
    }

    fn state(&self, operation: &'static str) -> Result<&FittedState> {
        self.fitted
            .as_deref()
            .ok_or(TfidfError::NotFitted { operation })
    }

    /// Check a raw bag-of-words and bring it into sparse vector form:
    /// sorted, duplicate ids summed, zero counts removed.
    fn clean_document(&self, doc: &[(TermId, f64)]) -> Result<SparseVector<f64>> {
        for &(id, count) in doc {
            let reason = if !count.is_finite() {
                Some("non-finite count")
            } else if count < 0.0 {
                Some("negative count")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(self.malformed(id, count, reason));
            }
            if let Some(vocab) = &self.vocabulary {
                if id as usize >= vocab.len() {
                    return Err(self.malformed(id, id as f64, "term id outside the vocabulary"));
                }
            }
        }
        Ok(SparseVector::from_pairs(
            doc.iter().copied().filter(|&(_, count)| count > 0.0),
        ))
    }

    fn malformed(&self, term_id: TermId, value: f64, reason: &'static str) -> TfidfError {
        TfidfError::MalformedInput {
            term_id,
            token: self
                .vocabulary
                .as_ref()
                .and_then(|v| v.token_of(term_id))
                .map(str::to_string),
            value,
            reason,
        }
    }
}

impl fmt::Debug for TfidfModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfidfModel")
            .field("smartirs", &self.config.smartirs.to_string())
            .field("local", &self.local)
            .field("global", &self.global)
            .field("normalization", &self.normalization)
            .field("pivoted", &self.config.pivoted())
            .field("vocabulary", &self.vocabulary.as_ref().map(|v| v.len()))
            .field("statistics", &self.statistics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::token::Dictionary;

    type Doc = Vec<(TermId, f64)>;

    fn small_corpus() -> Vec<Doc> {
        vec![vec![(0, 1.0), (1, 1.0)], vec![(0, 1.0), (2, 1.0)]]
    }

    fn fitted(config: TfidfConfig, corpus: &[Doc]) -> TfidfModel {
        let mut model = TfidfModel::new(config).unwrap();
        model.fit(corpus).unwrap();
        model
    }

    #[test]
    fn ntc_drops_terms_present_everywhere() {
        let model = fitted(TfidfConfig::default(), &small_corpus());
        let stats = model.statistics().unwrap();
        assert_eq!(stats.num_docs(), 2);
        assert_eq!(stats.doc_freq(0), Some(2));
        assert_eq!(stats.doc_freq(1), Some(1));
        assert_eq!(stats.doc_freq(2), Some(1));

        let v = model.transform(&[(0, 1.0), (1, 1.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(1, 1.0)]);
    }

    #[test]
    fn transform_before_fit_is_not_fitted() {
        let mut model = TfidfModel::new(TfidfConfig::default()).unwrap();
        let err = model.transform(&[(0, 1.0)]).unwrap_err();
        assert!(matches!(err, TfidfError::NotFitted { operation: "transform" }));
        assert!(err.to_string().contains("fit"));
        assert!(matches!(
            model.pivoted_normalize(Vec::new()),
            Err(TfidfError::NotFitted { .. })
        ));

        model.fit(&small_corpus()).unwrap();
        assert!(model.transform(&[(0, 1.0)]).is_ok());
    }

    #[test]
    fn invalid_scheme_fails_at_construction() {
        let err = TfidfConfig::new().with_smartirs("xtc").unwrap_err();
        assert!(matches!(err, TfidfError::InvalidScheme { letter: 'x', .. }));
        assert!(TfidfModel::new(TfidfConfig::new().with_slope(2.0)).is_err());
    }

    #[test]
    fn empty_corpus_fits() {
        let mut model = TfidfModel::new(TfidfConfig::default()).unwrap();
        let stats = model.fit(Vec::<Doc>::new()).unwrap();
        assert_eq!(stats.num_docs(), 0);
        assert!(model.is_fitted());
        // nothing is known, so everything is dropped
        assert!(model.transform(&[(0, 3.0)]).unwrap().is_empty());
    }

    #[test]
    fn unseen_terms_are_dropped() {
        let model = fitted(TfidfConfig::new().with_smartirs("nnn").unwrap(), &small_corpus());
        let v = model.transform(&[(1, 2.0), (42, 5.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(1, 2.0)]);
    }

    #[test]
    fn refit_is_identical() {
        let corpus: Vec<Doc> = vec![vec![(3, 1.0), (1, 2.0)], vec![(1, 1.0)], vec![(7, 4.0), (3, 1.0)]];
        let mut model = TfidfModel::new(TfidfConfig::new().with_pivot_norm(true)).unwrap();
        let first = model.fit(&corpus).unwrap().clone();
        let second = model.fit(&corpus).unwrap().clone();
        assert_eq!(first, second);
        assert_eq!(
            serde_cbor::to_vec(&first).unwrap(),
            serde_cbor::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn fit_consumes_a_lazy_stream() {
        let stream = (0..100u32).map(|i| vec![(i % 10, 1.0), (10 + i % 3, 2.0)]);
        let mut model = TfidfModel::new(TfidfConfig::default()).unwrap();
        let stats = model.fit(stream).unwrap();
        assert_eq!(stats.num_docs(), 100);
        assert_eq!(stats.doc_freq(0), Some(10));
        assert_eq!(stats.doc_freq(10), Some(34));
    }

    #[test]
    fn duplicate_ids_are_merged_and_zero_counts_ignored() {
        let corpus: Vec<Doc> = vec![vec![(0, 1.0), (0, 2.0), (1, 0.0)], vec![(2, 1.0)]];
        let model = fitted(TfidfConfig::new().with_smartirs("ntn").unwrap(), &corpus);
        let stats = model.statistics().unwrap();
        assert_eq!(stats.doc_freq(0), Some(1));
        assert_eq!(stats.doc_freq(1), None);
        assert_eq!(stats.num_nnz(), 2);

        let v = model.transform(&[(0, 1.0), (0, 1.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(0, 2.0)]);
    }

    #[test]
    fn malformed_counts_are_reported() {
        let model = fitted(TfidfConfig::default(), &small_corpus());
        match model.transform(&[(1, -2.0)]) {
            Err(TfidfError::MalformedInput { term_id, value, .. }) => {
                assert_eq!(term_id, 1);
                assert_eq!(value, -2.0);
            }
            other => panic!("expected MalformedInput, got {other:?}"),
        }
        assert!(matches!(
            model.transform(&[(0, f64::NAN)]),
            Err(TfidfError::MalformedInput { reason: "non-finite count", .. })
        ));
    }

    #[test]
    fn failed_fit_keeps_previous_statistics() {
        let mut model = fitted(TfidfConfig::default(), &small_corpus());
        let bad: Vec<Doc> = vec![vec![(0, 1.0)], vec![(1, -1.0)]];
        assert!(model.fit(&bad).is_err());
        assert_eq!(model.statistics().unwrap().num_docs(), 2);
    }

    #[test]
    fn vocabulary_bounds_and_diagnostics() {
        let mut dict = Dictionary::new();
        dict.add_document(&["alpha", "beta"]);
        let mut model = TfidfModel::new(TfidfConfig::default())
            .unwrap()
            .with_vocabulary(Arc::new(dict));
        model.fit(&small_corpus()[..1]).unwrap();

        match model.transform(&[(5, 1.0)]) {
            Err(TfidfError::MalformedInput { term_id: 5, token: None, .. }) => {}
            other => panic!("expected out of range error, got {other:?}"),
        }
        let err = model.transform(&[(1, -1.0)]).unwrap_err();
        assert!(err.to_string().contains("\"beta\""), "{err}");
    }

    #[test]
    fn fit_from_vocabulary_matches_corpus_pass() {
        let texts = [vec!["a", "b"], vec!["a", "c", "c"], vec!["d"]];
        let mut dict = Dictionary::new();
        dict.add_documents(&texts);
        let corpus: Vec<Doc> = texts.iter().map(|t| dict.doc2bow(t)).collect();

        let mut from_corpus = TfidfModel::new(TfidfConfig::default()).unwrap();
        from_corpus.fit(&corpus).unwrap();
        let mut from_vocab = TfidfModel::new(TfidfConfig::default()).unwrap();
        from_vocab.fit_from_vocabulary(&dict).unwrap();

        assert_eq!(from_corpus.statistics(), from_vocab.statistics());
        for doc in &corpus {
            assert_eq!(from_corpus.transform(doc).unwrap(), from_vocab.transform(doc).unwrap());
        }
    }

    #[test]
    fn local_and_global_letters_flow_through() {
        // df: 0 -> 2, 1 -> 1, 2 -> 1 over 2 docs
        let model = fitted(TfidfConfig::new().with_smartirs("lnn").unwrap(), &small_corpus());
        let v = model.transform(&[(0, 4.0), (1, 1.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(0, 3.0), (1, 1.0)]);

        let model = fitted(TfidfConfig::new().with_smartirs("bfn").unwrap(), &small_corpus());
        let v = model.transform(&[(0, 4.0), (2, 7.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(0, 0.5), (2, 1.0)]);
        assert_eq!(model.idf(0), Some(0.5));
        assert_eq!(model.idf(9), None);
    }

    #[test]
    fn fractional_counts_never_yield_non_finite_weights() {
        let corpus: Vec<Doc> = vec![vec![(0, 1.0), (1, 1.0)], vec![(2, 1.0)]];

        // 1 + log2(1 + log2(0.25)) is NaN, the remaining term is normalized alone
        let model = fitted(TfidfConfig::new().with_smartirs("dtc").unwrap(), &corpus);
        let v = model.transform(&[(0, 0.25), (1, 3.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(1, 1.0)]);

        // average count 0.5 puts a zero in the LogAverage denominator
        let model = fitted(TfidfConfig::new().with_smartirs("Ltc").unwrap(), &corpus);
        let v = model.transform(&[(0, 0.25), (1, 0.75)]).unwrap();
        assert!(v.is_empty(), "{v:?}");

        let v = model.transform(&[(0, 0.5), (1, 4.0)]).unwrap();
        assert!(v.values().all(f64::is_finite));
        assert!((v.norm_l2() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn custom_weights_and_normalization() {
        let config = TfidfConfig::new()
            .with_local(LocalWeight::custom(|c, ctx| c + ctx.max_count))
            .with_global(GlobalWeight::custom(|_, _| 2.0))
            .with_normalize(Normalization::custom(|v| v.norm_l1()));
        let model = fitted(config, &small_corpus());
        let v = model.transform(&[(0, 1.0), (1, 3.0)]).unwrap();
        assert_eq!(v.as_slice(), &[(0, 0.4), (1, 0.6)]);
    }

    #[test]
    fn concurrent_transforms_agree() {
        let corpus: Vec<Doc> = (0..50u32)
            .map(|i| vec![(i % 7, 1.0 + f64::from(i % 3)), (7 + i % 5, 1.0)])
            .collect();
        let model = fitted(TfidfConfig::new().with_smartirs("ltc").unwrap(), &corpus);
        let expected: Vec<_> = corpus.iter().map(|d| model.transform(d).unwrap()).collect();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| corpus.iter().map(|d| model.transform(d).unwrap()).collect::<Vec<_>>()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });

        let batch = model.transform_batch(&corpus).unwrap();
        assert_eq!(batch.vectors, expected);
        assert!(batch.norms.is_none());
    }

    #[test]
    fn batch_with_pivoting_uses_fitted_average() {
        let corpus: Vec<Doc> = vec![
            vec![(0, 1.0), (1, 2.0), (2, 1.0)],
            vec![(1, 1.0), (3, 1.0)],
            vec![(2, 3.0), (4, 1.0)],
        ];
        let model = fitted(TfidfConfig::new().with_smartirs("nnu").unwrap(), &corpus);
        let avg = model
            .statistics()
            .unwrap()
            .pivot_stats()
            .unwrap()
            .average_unique_terms
            .unwrap();
        assert!((avg - 7.0 / 3.0).abs() < 1e-12);

        let batch = model.transform_batch(&corpus[..1]).unwrap();
        let out = pivoted_normalize(
            vec![model.transform(&corpus[0]).unwrap()],
            0.65,
            Some(avg),
        )
        .unwrap();
        assert_eq!(batch.vectors, out.vectors);
        assert_eq!(batch.norms, Some(out.norms));
    }

    #[test]
    fn single_document_pivoting_goes_through_the_batch() {
        let model = fitted(TfidfConfig::new().with_smartirs("ntu").unwrap(), &small_corpus());
        let doc = [(0, 1.0), (1, 2.0), (2, 1.0)];

        let plain = model.transform(&doc).unwrap();
        assert!((plain.norm_l2() - 1.0).abs() < 1e-9);

        let batch = model.transform_batch(&[doc]).unwrap();
        let expected = model.pivoted_normalize(vec![plain]).unwrap();
        assert_eq!(batch.vectors, expected.vectors);
        assert_eq!(batch.norms, Some(expected.norms));
    }

    #[test]
    fn configured_pivot_takes_precedence() {
        let config = TfidfConfig::new().with_pivot_norm(true).with_pivot(4.0).with_slope(0.5);
        let model = fitted(config, &small_corpus());
        let out = model
            .pivoted_normalize(vec![SparseVector::from_pairs(vec![(1, 1.0)])])
            .unwrap();
        assert_eq!(out.pivot, 4.0);
        assert_eq!(out.vectors[0].as_slice(), &[(1, 0.5 + 0.5 * 0.25)]);
    }

    #[test]
    fn from_statistics_restores_a_fitted_model() {
        let model = fitted(TfidfConfig::default(), &small_corpus());
        let stats = model.statistics().unwrap().clone();
        let restored = TfidfModel::from_statistics(TfidfConfig::default(), stats).unwrap();
        let doc = [(0, 1.0), (2, 3.0)];
        assert_eq!(model.transform(&doc).unwrap(), restored.transform(&doc).unwrap());
    }
}
