use tracing::debug;

use crate::error::{Result, TfidfError};
use crate::utils::math::vector::SparseVector;
use crate::utils::normalizer::Normalization;
use crate::vectorizer::config::check_slope;

/// Output of the pivoted unique normalization pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotedBatch {
    /// rewritten vectors, in batch order
    pub vectors: Vec<SparseVector<f64>>,
    /// per document `(1 - slope) * pivot + slope * unique_terms`
    pub norms: Vec<f64>,
    /// pivot that was used
    pub pivot: f64,
}

/// Pivoted unique normalization (Singhal, Buckley & Mitra).
///
/// Every vector is L2-normalized, then each weight becomes
/// `w * (1 - slope) + slope * (u / pivot)` where `u` is the number of distinct
/// non-zero terms of that vector. Without an explicit `pivot` the average `u`
/// over the batch is used. `slope == 0` is plain L2 normalization.
///
/// The per-document pivoted normalization factor is returned next to the
/// vectors for scoring formulas that want it.
///
/// # Errors
/// * `InvalidParameter` when `slope` is outside `[0, 1]` or `pivot` is negative or not finite
/// * `DivideByZero` when the pivot has to be averaged over an empty batch, or
///   is zero while some vector has terms
pub fn pivoted_normalize(
    batch: Vec<SparseVector<f64>>,
    slope: f64,
    pivot: Option<f64>,
) -> Result<PivotedBatch> {
    check_slope(slope)?;
    let unique: Vec<usize> = batch.iter().map(|v| v.unique_terms()).collect();

    let pivot = match pivot {
        Some(p) if !p.is_finite() || p < 0.0 => {
            return Err(TfidfError::InvalidParameter {
                name: "pivot",
                value: p,
                reason: "must be finite and non-negative",
            });
        }
        Some(p) => p,
        None if batch.is_empty() => {
            return Err(TfidfError::DivideByZero {
                context: "cannot average unique term counts over an empty batch",
            });
        }
        None => unique.iter().sum::<usize>() as f64 / unique.len() as f64,
    };
    if pivot == 0.0 && unique.iter().any(|&u| u > 0) {
        return Err(TfidfError::DivideByZero {
            context: "pivot is zero but the batch has non-empty vectors",
        });
    }
    debug!(docs = batch.len(), pivot, slope, "pivoted unique normalization");

    let mut vectors = Vec::with_capacity(batch.len());
    let mut norms = Vec::with_capacity(batch.len());
    for (mut vec, u) in batch.into_iter().zip(unique) {
        let u = u as f64;
        norms.push((1.0 - slope) * pivot + slope * u);

        vec.retain_nonzero(0.0);
        if vec.is_empty() {
            vectors.push(vec);
            continue;
        }
        let shift = slope * (u / pivot);
        let mut out = Normalization::L2
            .normalize(vec)
            .map_values(|w| w * (1.0 - slope) + shift);
        out.retain_nonzero(0.0);
        vectors.push(out);
    }

    Ok(PivotedBatch { vectors, norms, pivot })
}
