use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::math::vector::{SparseVector, TermId};

/// Corpus-wide statistics gathered by `fit`.
///
/// Created once per fit and never mutated afterwards; the model shares it
/// read-only between transform calls. A later fit replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStatistics {
    /// number of documents each term occurs in, sorted by term id
    #[serde(with = "indexmap::map::serde_seq")]
    document_frequency: IndexMap<TermId, u64>,
    /// number of documents seen
    num_docs: u64,
    /// number of distinct (document, term) pairs seen
    num_nnz: u64,
    /// only gathered when pivoted normalization is enabled
    pivot: Option<PivotStats>,
}

/// Statistics the pivoted unique normalization needs from the fitting pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotStats {
    /// mean number of distinct terms per document, `None` for an empty corpus
    pub average_unique_terms: Option<f64>,
    /// distinct term count of every fitted document, in corpus order
    pub doc_unique_terms: Vec<u32>,
}

impl CorpusStatistics {
    /// Statistics handed over by a collaborator that already counted them.
    pub fn from_parts<I>(document_frequency: I, num_docs: u64, num_nnz: u64) -> Self
    where
        I: IntoIterator<Item = (TermId, u64)>,
    {
        let mut document_frequency: IndexMap<TermId, u64> = document_frequency
            .into_iter()
            .filter(|&(_, df)| df > 0)
            .collect();
        document_frequency.sort_unstable_keys();
        Self {
            document_frequency,
            num_docs,
            num_nnz,
            pivot: None,
        }
    }

    /// Attach pivot statistics derived from `num_nnz / num_docs`.
    #[must_use]
    pub fn with_average_pivot(mut self) -> Self {
        self.pivot = Some(PivotStats {
            average_unique_terms: average(self.num_nnz, self.num_docs),
            doc_unique_terms: Vec::new(),
        });
        self
    }

    #[inline]
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    #[inline]
    pub fn num_nnz(&self) -> u64 {
        self.num_nnz
    }

    /// number of distinct terms seen
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.document_frequency.len()
    }

    #[inline]
    pub fn doc_freq(&self, id: TermId) -> Option<u64> {
        self.document_frequency.get(&id).copied()
    }

    #[inline]
    pub fn contains(&self, id: TermId) -> bool {
        self.document_frequency.contains_key(&id)
    }

    /// `(term id, document frequency)` in ascending id order
    pub fn document_frequencies(&self) -> impl ExactSizeIterator<Item = (TermId, u64)> + '_ {
        self.document_frequency.iter().map(|(&id, &df)| (id, df))
    }

    #[inline]
    pub fn pivot_stats(&self) -> Option<&PivotStats> {
        self.pivot.as_ref()
    }
}

/// Single pass accumulator behind `fit`.
#[derive(Debug, Default)]
pub struct CorpusAccumulator {
    document_frequency: IndexMap<TermId, u64>,
    num_docs: u64,
    num_nnz: u64,
    doc_unique_terms: Option<Vec<u32>>,
}

impl CorpusAccumulator {
    pub fn new(collect_pivot: bool) -> Self {
        Self {
            doc_unique_terms: collect_pivot.then(Vec::new),
            ..Self::default()
        }
    }

    /// Count one cleaned document (unique ids, positive counts).
    pub fn add_document(&mut self, doc: &SparseVector<f64>) {
        self.num_docs += 1;
        let mut unique = 0u32;
        for id in doc.term_ids() {
            *self.document_frequency.entry(id).or_insert(0) += 1;
            unique += 1;
        }
        self.num_nnz += u64::from(unique);
        if let Some(counts) = self.doc_unique_terms.as_mut() {
            counts.push(unique);
        }
    }

    #[inline]
    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    /// Freeze into statistics. Keys are sorted so that equal streams give
    /// identical statistics whatever order terms were first met in.
    pub fn finish(mut self) -> CorpusStatistics {
        self.document_frequency.sort_unstable_keys();
        self.document_frequency.shrink_to_fit();
        let pivot = self.doc_unique_terms.map(|doc_unique_terms| PivotStats {
            average_unique_terms: average(self.num_nnz, self.num_docs),
            doc_unique_terms,
        });
        CorpusStatistics {
            document_frequency: self.document_frequency,
            num_docs: self.num_docs,
            num_nnz: self.num_nnz,
            pivot,
        }
    }
}

fn average(total: u64, count: u64) -> Option<f64> {
    (count > 0).then(|| total as f64 / count as f64)
}
