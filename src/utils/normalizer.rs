use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::utils::math::vector::SparseVector;

/// Caller supplied normalization: returns the divisor for a vector.
pub type NormFn = Arc<dyn Fn(&SparseVector<f64>) -> f64 + Send + Sync>;

/// Post-weighting scaling of a sparse vector.
#[derive(Clone)]
pub enum Normalization {
    /// pass through unchanged
    None,
    /// divide by the sum of absolute weights
    L1,
    /// divide by the Euclidean norm (cosine normalization)
    L2,
    /// divide by the largest absolute weight
    Max,
    /// divide by whatever the function returns
    Custom(NormFn),
}

impl Normalization {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&SparseVector<f64>) -> f64 + Send + Sync + 'static,
    {
        Normalization::Custom(Arc::new(f))
    }

    /// The value every weight gets divided by, `None` when the vector passes through.
    pub fn divisor(&self, vec: &SparseVector<f64>) -> Option<f64> {
        let d = match self {
            Normalization::None => return None,
            Normalization::L1 => vec.norm_l1(),
            Normalization::L2 => vec.norm_l2(),
            Normalization::Max => vec.max_abs(),
            Normalization::Custom(f) => f(vec),
        };
        // all-zero and empty vectors map to themselves
        if d == 0.0 || !d.is_finite() {
            None
        } else {
            Some(d)
        }
    }

    #[inline]
    pub fn normalize(&self, vec: SparseVector<f64>) -> SparseVector<f64> {
        match self.divisor(&vec) {
            Some(d) => vec.map_values(|w| w / d),
            None => vec,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Normalization::None)
    }
}

/// Normalize `vec` with `mode`.
#[inline]
pub fn normalize(vec: SparseVector<f64>, mode: &Normalization) -> SparseVector<f64> {
    mode.normalize(vec)
}

impl From<bool> for Normalization {
    /// `true` is cosine normalization, `false` disables it
    fn from(enabled: bool) -> Self {
        if enabled {
            Normalization::L2
        } else {
            Normalization::None
        }
    }
}

impl Debug for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::None => write!(f, "None"),
            Normalization::L1 => write!(f, "L1"),
            Normalization::L2 => write!(f, "L2"),
            Normalization::Max => write!(f, "Max"),
            Normalization::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
