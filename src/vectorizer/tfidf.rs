use std::fmt::{self, Debug};
use std::sync::Arc;

/// Custom local weighting: `(raw count, document context) -> weight`.
pub type LocalFn = Arc<dyn Fn(f64, &DocContext) -> f64 + Send + Sync>;
/// Custom global weighting: `(document frequency, number of documents) -> weight`.
pub type GlobalFn = Arc<dyn Fn(u64, u64) -> f64 + Send + Sync>;

/// Per-document statistics handed to local weighting.
///
/// Computed once per document by the engine over its positive counts, so
/// weightings that are relative to the document (augmented, log average)
/// do not need a second pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocContext {
    /// largest raw count in the document
    pub max_count: f64,
    /// mean raw count over the distinct terms of the document
    pub avg_count: f64,
}

impl DocContext {
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut max_count = 0.0f64;
        let mut sum = 0.0;
        let mut n = 0usize;
        for c in counts {
            max_count = max_count.max(c);
            sum += c;
            n += 1;
        }
        let avg_count = if n == 0 { 0.0 } else { sum / n as f64 };
        DocContext { max_count, avg_count }
    }
}

/// Term frequency transform.
#[derive(Clone)]
pub enum LocalWeight {
    /// `n`: raw count
    Natural,
    /// `l`: 1 + log2(count)
    Logarithm,
    /// `a`: 0.5 + 0.5 * count / max count
    Augmented,
    /// `b`: 1 when the term occurs
    Boolean,
    /// `L`: (1 + log2(count)) / (1 + log2(average count))
    LogAverage,
    /// `d`: 1 + log2(1 + log2(count))
    DoubleLogarithm,
    Custom(LocalFn),
}

impl LocalWeight {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64, &DocContext) -> f64 + Send + Sync + 'static,
    {
        LocalWeight::Custom(Arc::new(f))
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'n' => LocalWeight::Natural,
            'l' => LocalWeight::Logarithm,
            'a' => LocalWeight::Augmented,
            'b' => LocalWeight::Boolean,
            'L' => LocalWeight::LogAverage,
            'd' => LocalWeight::DoubleLogarithm,
            _ => return None,
        })
    }

    /// scheme letter, `None` for custom functions
    pub fn letter(&self) -> Option<char> {
        Some(match self {
            LocalWeight::Natural => 'n',
            LocalWeight::Logarithm => 'l',
            LocalWeight::Augmented => 'a',
            LocalWeight::Boolean => 'b',
            LocalWeight::LogAverage => 'L',
            LocalWeight::DoubleLogarithm => 'd',
            LocalWeight::Custom(_) => return None,
        })
    }

    /// Weight for a raw count. Counts `<= 0` weigh nothing for the built-in policies.
    #[inline]
    pub fn apply(&self, count: f64, ctx: &DocContext) -> f64 {
        match self {
            LocalWeight::Custom(f) => f(count, ctx),
            _ if count <= 0.0 => 0.0,
            LocalWeight::Natural => count,
            LocalWeight::Logarithm => 1.0 + count.log2(),
            LocalWeight::Augmented => 0.5 + 0.5 * count / ctx.max_count,
            LocalWeight::Boolean => 1.0,
            LocalWeight::LogAverage => (1.0 + count.log2()) / (1.0 + ctx.avg_count.log2()),
            LocalWeight::DoubleLogarithm => 1.0 + (1.0 + count.log2()).log2(),
        }
    }
}

/// Inverse document frequency transform.
#[derive(Clone)]
pub enum GlobalWeight {
    /// `n`: 1
    None,
    /// `t`: log2(N / df)
    Idf,
    /// `p`: max(0, log2((N - df) / df))
    ProbabilisticIdf,
    /// `f`: 1 / df
    Fixed,
    /// `g`: log2((N - df + 1) / df)
    ProbabilisticFixed,
    Custom(GlobalFn),
}

impl GlobalWeight {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u64, u64) -> f64 + Send + Sync + 'static,
    {
        GlobalWeight::Custom(Arc::new(f))
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'n' => GlobalWeight::None,
            't' => GlobalWeight::Idf,
            'p' => GlobalWeight::ProbabilisticIdf,
            'f' => GlobalWeight::Fixed,
            'g' => GlobalWeight::ProbabilisticFixed,
            _ => return None,
        })
    }

    pub fn letter(&self) -> Option<char> {
        Some(match self {
            GlobalWeight::None => 'n',
            GlobalWeight::Idf => 't',
            GlobalWeight::ProbabilisticIdf => 'p',
            GlobalWeight::Fixed => 'f',
            GlobalWeight::ProbabilisticFixed => 'g',
            GlobalWeight::Custom(_) => return None,
        })
    }

    /// Weight of a term seen in `doc_freq` of `num_docs` documents.
    /// `doc_freq` is at least 1 for every term the engine keeps statistics for.
    #[inline]
    pub fn apply(&self, doc_freq: u64, num_docs: u64) -> f64 {
        let df = doc_freq as f64;
        let n = num_docs as f64;
        match self {
            GlobalWeight::None => 1.0,
            GlobalWeight::Idf => (n / df).log2(),
            GlobalWeight::ProbabilisticIdf => ((n - df) / df).log2().max(0.0),
            GlobalWeight::Fixed => 1.0 / df,
            GlobalWeight::ProbabilisticFixed => ((n - df + 1.0) / df).log2(),
            GlobalWeight::Custom(f) => f(doc_freq, num_docs),
        }
    }
}

impl Debug for LocalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(l) => write!(f, "LocalWeight({l})"),
            None => write!(f, "LocalWeight(custom)"),
        }
    }
}

impl Debug for GlobalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter() {
            Some(l) => write!(f, "GlobalWeight({l})"),
            None => write!(f, "GlobalWeight(custom)"),
        }
    }
}
