use crate::vectorizer::TermId;

/// Errors raised by the TF-IDF engine.
///
/// Every failure is a deterministic function of the input or the configuration,
/// so nothing in this crate retries.
#[derive(Debug, thiserror::Error)]
pub enum TfidfError {
    #[error("this model has not been fitted yet; call `fit` before `{operation}`")]
    NotFitted { operation: &'static str },

    #[error("invalid smartirs scheme {scheme:?}: letter {letter:?} at position {position} ({reason})")]
    InvalidScheme {
        scheme: String,
        position: usize,
        letter: char,
        reason: String,
    },

    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("division by zero: {context}")]
    DivideByZero { context: &'static str },

    #[error("malformed input for term {term_id}{}: value {value} ({reason})", token_suffix(.token))]
    MalformedInput {
        term_id: TermId,
        token: Option<String>,
        value: f64,
        reason: &'static str,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_cbor::Error),
}

fn token_suffix(token: &Option<String>) -> String {
    token.as_deref().map(|t| format!(" ({t:?})")).unwrap_or_default()
}

pub type Result<T, E = TfidfError> = std::result::Result<T, E>;
