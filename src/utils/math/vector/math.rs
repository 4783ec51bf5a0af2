use std::ops::AddAssign;

use num::{Float, Num};

use super::SparseVector;

impl<N> SparseVector<N>
where
    N: Num + Copy + AddAssign,
{
    #[inline]
    pub fn norm_sq(&self) -> N {
        let mut result = N::zero();
        for v in self.values() {
            result += v * v;
        }
        result
    }
}

impl<N> SparseVector<N>
where
    N: Float + AddAssign,
{
    /// sum of absolute values
    #[inline]
    pub fn norm_l1(&self) -> N {
        let mut result = N::zero();
        for v in self.values() {
            result += v.abs();
        }
        result
    }

    /// Euclidean norm
    #[inline]
    pub fn norm_l2(&self) -> N {
        self.norm_sq().sqrt()
    }

    /// largest absolute value, zero for an empty vector
    #[inline]
    pub fn max_abs(&self) -> N {
        self.values().fold(N::zero(), |acc, v| acc.max(v.abs()))
    }
}
