use crate::error::{Result, TfidfError};
use crate::utils::normalizer::Normalization;
use crate::vectorizer::scheme::SmartirsScheme;
use crate::vectorizer::tfidf::{GlobalWeight, LocalWeight};

pub const DEFAULT_SLOPE: f64 = 0.65;
pub const DEFAULT_EPS: f64 = 1e-12;

/// Construction time options of a [`TfidfModel`](crate::TfidfModel).
///
/// Explicit `local`, `global` and `normalize` settings take precedence over
/// the letters of `smartirs`.
///
/// # Examples
/// ```
/// use tf_idf_pivot::{TfidfConfig, Normalization};
///
/// let config = TfidfConfig::new()
///     .with_smartirs("ltc").unwrap()
///     .with_normalize(Normalization::L1)
///     .with_slope(0.25);
/// ```
#[derive(Debug, Clone)]
pub struct TfidfConfig {
    pub smartirs: SmartirsScheme,
    pub local: Option<LocalWeight>,
    pub global: Option<GlobalWeight>,
    pub normalize: Option<Normalization>,
    pub pivot_norm: bool,
    pub slope: f64,
    pub pivot: Option<f64>,
    /// weights with an absolute value `<= eps` are dropped from outputs
    pub eps: f64,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            smartirs: SmartirsScheme::default(),
            local: None,
            global: None,
            normalize: None,
            pivot_norm: false,
            slope: DEFAULT_SLOPE,
            pivot: None,
            eps: DEFAULT_EPS,
        }
    }
}

impl TfidfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and set the SMART code. Fails on unknown letters.
    pub fn with_smartirs(mut self, code: &str) -> Result<Self> {
        self.smartirs = SmartirsScheme::parse(code)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: SmartirsScheme) -> Self {
        self.smartirs = scheme;
        self
    }

    #[must_use]
    pub fn with_local(mut self, local: LocalWeight) -> Self {
        self.local = Some(local);
        self
    }

    #[must_use]
    pub fn with_global(mut self, global: GlobalWeight) -> Self {
        self.global = Some(global);
        self
    }

    /// Override the scheme's normalization letter. Accepts a bool as well.
    #[must_use]
    pub fn with_normalize(mut self, normalize: impl Into<Normalization>) -> Self {
        self.normalize = Some(normalize.into());
        self
    }

    #[must_use]
    pub fn with_pivot_norm(mut self, enabled: bool) -> Self {
        self.pivot_norm = enabled;
        self
    }

    #[must_use]
    pub fn with_slope(mut self, slope: f64) -> Self {
        self.slope = slope;
        self
    }

    #[must_use]
    pub fn with_pivot(mut self, pivot: f64) -> Self {
        self.pivot = Some(pivot);
        self
    }

    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    pub fn local_weight(&self) -> LocalWeight {
        self.local.clone().unwrap_or_else(|| self.smartirs.local_weight())
    }

    pub fn global_weight(&self) -> GlobalWeight {
        self.global.clone().unwrap_or_else(|| self.smartirs.global_weight())
    }

    pub fn normalization(&self) -> Normalization {
        self.normalize.clone().unwrap_or_else(|| self.smartirs.normalization())
    }

    /// Pivoted pass is on when asked for explicitly or by a `u` scheme letter.
    pub fn pivoted(&self) -> bool {
        self.pivot_norm || self.smartirs.pivoted()
    }

    pub fn validate(&self) -> Result<()> {
        check_slope(self.slope)?;
        if let Some(pivot) = self.pivot {
            if !pivot.is_finite() || pivot <= 0.0 {
                return Err(TfidfError::InvalidParameter {
                    name: "pivot",
                    value: pivot,
                    reason: "must be finite and greater than zero",
                });
            }
        }
        if !(self.eps >= 0.0) || !self.eps.is_finite() {
            return Err(TfidfError::InvalidParameter {
                name: "eps",
                value: self.eps,
                reason: "must be finite and non-negative",
            });
        }
        Ok(())
    }
}

pub(crate) fn check_slope(slope: f64) -> Result<()> {
    if (0.0..=1.0).contains(&slope) {
        Ok(())
    } else {
        Err(TfidfError::InvalidParameter {
            name: "slope",
            value: slope,
            reason: "must lie in [0, 1]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TfidfConfig::default();
        assert_eq!(c.smartirs.to_string(), "ntc");
        assert_eq!(c.slope, 0.65);
        assert!(c.pivot.is_none());
        assert!(!c.pivoted());
        assert!(matches!(c.normalization(), Normalization::L2));
        c.validate().unwrap();
    }

    #[test]
    fn explicit_settings_override_scheme() {
        let c = TfidfConfig::new()
            .with_smartirs("ltc")
            .unwrap()
            .with_normalize(false)
            .with_global(GlobalWeight::None);
        assert!(matches!(c.local_weight(), LocalWeight::Logarithm));
        assert!(matches!(c.global_weight(), GlobalWeight::None));
        assert!(c.normalization().is_none());
    }

    #[test]
    fn u_letter_enables_pivoting() {
        let c = TfidfConfig::new().with_smartirs("nnu").unwrap();
        assert!(c.pivoted());
        assert!(TfidfConfig::new().with_pivot_norm(true).pivoted());
    }

    #[test]
    fn invalid_parameters() {
        assert!(TfidfConfig::new().with_slope(1.5).validate().is_err());
        assert!(TfidfConfig::new().with_slope(-0.1).validate().is_err());
        assert!(TfidfConfig::new().with_slope(f64::NAN).validate().is_err());
        assert!(TfidfConfig::new().with_pivot(0.0).validate().is_err());
        assert!(TfidfConfig::new().with_eps(-1.0).validate().is_err());
        TfidfConfig::new().with_slope(0.0).with_pivot(3.5).validate().unwrap();
    }
}
