use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::utils::math::vector::TermId;

/// Token ↔ id mapping plus the document frequencies counted while building it.
///
/// The engine only needs this through the trait; `token_of` is used for
/// diagnostics, never for computation.
pub trait VocabularyIndex: Send + Sync {
    fn id_of(&self, token: &str) -> Option<TermId>;
    fn token_of(&self, id: TermId) -> Option<&str>;
    /// number of ids handed out; every valid id is `< len()`
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// documents containing `id`, 0 for unknown ids
    fn doc_freq(&self, id: TermId) -> u64;
    fn num_docs(&self) -> u64;
    fn num_nnz(&self) -> u64;
}

/// In-memory vocabulary.
///
/// Ids are insertion positions in an `IndexMap`, so they are stable and dense.
///
/// # Examples
/// ```
/// use tf_idf_pivot::{Dictionary, VocabularyIndex};
///
/// let mut dict = Dictionary::new();
/// dict.add_document(&["rust", "fast", "rust"]);
/// assert_eq!(dict.id_of("fast"), Some(1));
/// assert_eq!(dict.doc2bow(&["rust", "rust", "unknown"]), vec![(0, 2.0)]);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Dictionary {
    /// token → document frequency, index is the id
    #[serde(with = "indexmap::map::serde_seq")]
    token_dfs: IndexMap<Box<str>, u64>,
    num_docs: u64,
    num_nnz: u64,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tokenized document, assigning ids to new tokens.
    pub fn add_document<T>(&mut self, tokens: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        let distinct: IndexSet<&str> = tokens.iter().map(|t| t.as_ref()).collect();
        for token in &distinct {
            *self.token_dfs.entry((*token).into()).or_insert(0) += 1;
        }
        self.num_docs += 1;
        self.num_nnz += distinct.len() as u64;
        self
    }

    pub fn add_documents<T, D>(&mut self, docs: &[D]) -> &mut Self
    where
        T: AsRef<str>,
        D: AsRef<[T]>,
    {
        for doc in docs {
            self.add_document(doc.as_ref());
        }
        self
    }

    /// Bag-of-words of `tokens`, ascending by id. Unknown tokens are skipped.
    pub fn doc2bow<T>(&self, tokens: &[T]) -> Vec<(TermId, f64)>
    where
        T: AsRef<str>,
    {
        let mut counts: IndexMap<TermId, f64> = IndexMap::new();
        for token in tokens {
            if let Some(id) = self.id_of(token.as_ref()) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }
        counts.sort_unstable_keys();
        counts.into_iter().collect()
    }

    pub fn tokens(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.token_dfs.keys().map(|k| k.as_ref())
    }
}

impl VocabularyIndex for Dictionary {
    #[inline]
    fn id_of(&self, token: &str) -> Option<TermId> {
        self.token_dfs.get_index_of(token).map(|i| i as TermId)
    }

    #[inline]
    fn token_of(&self, id: TermId) -> Option<&str> {
        self.token_dfs.get_index(id as usize).map(|(k, _)| k.as_ref())
    }

    #[inline]
    fn len(&self) -> usize {
        self.token_dfs.len()
    }

    #[inline]
    fn doc_freq(&self, id: TermId) -> u64 {
        self.token_dfs.get_index(id as usize).map_or(0, |(_, &df)| df)
    }

    #[inline]
    fn num_docs(&self) -> u64 {
        self.num_docs
    }

    #[inline]
    fn num_nnz(&self) -> u64 {
        self.num_nnz
    }
}
