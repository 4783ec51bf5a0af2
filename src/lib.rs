/// This crate is a TF-IDF weighting engine over bag-of-words documents,
/// with SMART scheme codes and pivoted unique normalization.
pub mod error;
pub mod utils;
pub mod vectorizer;

/// TF-IDF Model
/// The top-level struct of this crate.
/// `fit` streams a corpus once and keeps its document frequencies;
/// `transform` weights a single document against them.
///
/// Internally, it holds:
/// - The validated configuration
/// - The resolved local / global weighting and normalization
/// - An optional vocabulary for diagnostics
/// - The fitted statistics and an IDF cache, shared behind an `Arc`
///
/// Transforming takes `&self`; a fitted model can be used from many threads.
pub use vectorizer::{TfidfBatch, TfidfModel};

/// Configuration for `TfidfModel`
/// Builder style struct carrying the SMART code, overrides and pivot settings.
/// Defaults: `"ntc"`, slope 0.65, no pivot override, eps 1e-12.
pub use vectorizer::config::TfidfConfig;

/// SMART scheme code
/// Three letters selecting local weighting, global weighting and normalization,
/// e.g. `"ntc"` or `"Ltu"`. Unknown letters fail when parsed.
pub use vectorizer::scheme::{SchemeNormalization, SmartirsScheme};

/// Weighting functions
/// - `LocalWeight`: term frequency transforms (`n l a b L d`, or custom)
/// - `GlobalWeight`: document frequency transforms (`n t p f g`, or custom)
/// - `DocContext`: per-document values some local weightings need
pub use vectorizer::tfidf::{DocContext, GlobalWeight, LocalWeight};

/// Corpus statistics
/// Document frequencies, document count and, with pivoting, `PivotStats`.
/// Immutable once built; serializable with serde (CBOR helpers included).
pub use vectorizer::corpus::{CorpusStatistics, PivotStats};

/// Pivoted unique normalization
/// Batch pass blending cosine normalization with the unique term count of
/// each document. Returns the normalization factor of every document too.
pub use vectorizer::pivot::{pivoted_normalize, PivotedBatch};

/// Vocabulary
/// `VocabularyIndex` is what the model needs from a token dictionary;
/// `Dictionary` is an in-memory implementation.
pub use vectorizer::token::{Dictionary, VocabularyIndex};

/// Sparse vectors and normalization
pub use utils::math::vector::{SparseVector, TermId};
pub use utils::normalizer::{normalize, Normalization};

pub use error::{Result, TfidfError};
