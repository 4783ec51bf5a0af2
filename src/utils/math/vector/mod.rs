pub mod math;
pub mod serde;

use std::fmt::{self, Debug};
use std::ops::AddAssign;

use num::{Float, Num};

/// Vocabulary index of a term.
pub type TermId = u32;

/// Sparse vector of `(term id, value)` entries.
///
/// Entries are kept sorted by term id in ascending order and every term id
/// appears at most once. Zero values are allowed while a vector is being built
/// (a raw bag-of-words may carry them); weighting and normalization strip them.
#[derive(Clone, PartialEq)]
pub struct SparseVector<N = f64>
where
    N: Num,
{
    entries: Vec<(TermId, N)>,
}

impl<N> SparseVector<N>
where
    N: Num + Copy,
{
    #[inline]
    pub fn new() -> Self {
        SparseVector { entries: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        SparseVector { entries: Vec::with_capacity(cap) }
    }

    /// Build from arbitrary pairs.
    /// Pairs are sorted by term id and duplicate ids are merged by summing.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (TermId, N)>,
        N: AddAssign,
    {
        let mut entries: Vec<(TermId, N)> = pairs.into_iter().collect();
        // stable so that merge order follows input order
        entries.sort_by_key(|&(id, _)| id);
        entries.dedup_by(|next, kept| {
            if next.0 == kept.0 {
                kept.1 += next.1;
                true
            } else {
                false
            }
        });
        SparseVector { entries }
    }

    /// Push an entry whose term id is greater than every id already stored.
    ///
    /// # Panics
    /// Debug builds panic when the ordering invariant is violated.
    #[inline]
    pub fn push(&mut self, id: TermId, value: N) {
        debug_assert!(
            self.entries.last().map_or(true, |&(last, _)| last < id),
            "term ids must be pushed in strictly ascending order"
        );
        self.entries.push((id, value));
    }

    /// number of stored entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, id: TermId) -> Option<N> {
        self.entries
            .binary_search_by_key(&id, |&(i, _)| i)
            .ok()
            .map(|pos| self.entries[pos].1)
    }

    #[inline]
    pub fn contains(&self, id: TermId) -> bool {
        self.entries.binary_search_by_key(&id, |&(i, _)| i).is_ok()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (TermId, N)> + '_ {
        self.entries.iter().copied()
    }

    #[inline]
    pub fn term_ids(&self) -> impl ExactSizeIterator<Item = TermId> + '_ {
        self.entries.iter().map(|&(id, _)| id)
    }

    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = N> + '_ {
        self.entries.iter().map(|&(_, v)| v)
    }

    #[inline]
    pub fn as_slice(&self) -> &[(TermId, N)] {
        &self.entries
    }

    #[inline]
    pub fn into_pairs(self) -> Vec<(TermId, N)> {
        self.entries
    }

    /// Apply `f` to every value, keeping the ids.
    #[inline]
    pub fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(N) -> N,
    {
        SparseVector {
            entries: self.entries.iter().map(|&(id, v)| (id, f(v))).collect(),
        }
    }

    #[inline]
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }
}

impl<N> SparseVector<N>
where
    N: Float,
{
    /// Drop entries whose absolute value is `<= eps`.
    /// With `eps == 0` only exact zeros are removed.
    #[inline]
    pub fn retain_nonzero(&mut self, eps: N) {
        self.entries.retain(|&(_, v)| v.abs() > eps);
    }

    /// number of distinct terms carrying a non-zero value
    #[inline]
    pub fn unique_terms(&self) -> usize {
        self.entries.iter().filter(|&&(_, v)| v != N::zero()).count()
    }
}

impl<N> Default for SparseVector<N>
where
    N: Num + Copy,
{
    #[inline]
    fn default() -> Self {
        SparseVector::new()
    }
}

impl<N> AsRef<[(TermId, N)]> for SparseVector<N>
where
    N: Num,
{
    #[inline]
    fn as_ref(&self) -> &[(TermId, N)] {
        &self.entries
    }
}

impl<N> From<Vec<(TermId, N)>> for SparseVector<N>
where
    N: Num + Copy + AddAssign,
{
    #[inline]
    fn from(pairs: Vec<(TermId, N)>) -> Self {
        SparseVector::from_pairs(pairs)
    }
}

impl<N> FromIterator<(TermId, N)> for SparseVector<N>
where
    N: Num + Copy + AddAssign,
{
    #[inline]
    fn from_iter<I: IntoIterator<Item = (TermId, N)>>(iter: I) -> Self {
        SparseVector::from_pairs(iter)
    }
}

impl<N> IntoIterator for SparseVector<N>
where
    N: Num,
{
    type Item = (TermId, N);
    type IntoIter = std::vec::IntoIter<(TermId, N)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<N: Num + Debug> Debug for SparseVector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // one entry per line
            writeln!(f, "SparseVector [")?;
            for (id, v) in &self.entries {
                writeln!(f, "    {}: {:?}", id, v)?;
            }
            write!(f, "]")
        } else {
            f.debug_map().entries(self.entries.iter().map(|(id, v)| (id, v))).finish()
        }
    }
}
