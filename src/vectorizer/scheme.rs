use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TfidfError};
use crate::utils::normalizer::Normalization;
use crate::vectorizer::tfidf::{GlobalWeight, LocalWeight};

/// Normalization selected by the third scheme letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemeNormalization {
    /// `n`
    None,
    /// `c`: cosine, i.e. L2
    Cosine,
    /// `u`: cosine followed by the pivoted unique pass
    PivotedUnique,
}

/// Three letter SMART weighting code, e.g. `"ntc"`.
///
/// | position | letters |
/// |---|---|
/// | local | `n` `l` `a` `b` `L` `d` |
/// | global | `n` `t` `p` `f` `g` |
/// | normalization | `n` `c` `u` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SmartirsScheme {
    local: char,
    global: char,
    normalization: SchemeNormalization,
}

impl SmartirsScheme {
    pub fn parse(code: &str) -> Result<Self> {
        let letters: Vec<char> = code.chars().collect();
        if letters.len() != 3 {
            return Err(TfidfError::InvalidScheme {
                scheme: code.to_string(),
                position: letters.len().min(3),
                letter: letters.get(3).copied().unwrap_or(' '),
                reason: format!("expected exactly 3 letters, got {}", letters.len()),
            });
        }
        let invalid = |position: usize, what: &str, allowed: &str| TfidfError::InvalidScheme {
            scheme: code.to_string(),
            position,
            letter: letters[position],
            reason: format!("unknown {what} letter, expected one of {allowed}"),
        };

        if LocalWeight::from_letter(letters[0]).is_none() {
            return Err(invalid(0, "local weighting", "n l a b L d"));
        }
        if GlobalWeight::from_letter(letters[1]).is_none() {
            return Err(invalid(1, "global weighting", "n t p f g"));
        }
        let normalization = match letters[2] {
            'n' => SchemeNormalization::None,
            'c' => SchemeNormalization::Cosine,
            'u' => SchemeNormalization::PivotedUnique,
            _ => return Err(invalid(2, "normalization", "n c u")),
        };

        Ok(SmartirsScheme {
            local: letters[0],
            global: letters[1],
            normalization,
        })
    }

    pub fn local_weight(&self) -> LocalWeight {
        // letters are validated in parse
        LocalWeight::from_letter(self.local).unwrap_or(LocalWeight::Natural)
    }

    pub fn global_weight(&self) -> GlobalWeight {
        GlobalWeight::from_letter(self.global).unwrap_or(GlobalWeight::Idf)
    }

    pub fn scheme_normalization(&self) -> SchemeNormalization {
        self.normalization
    }

    /// Per-document normalization implied by the scheme.
    pub fn normalization(&self) -> Normalization {
        match self.normalization {
            SchemeNormalization::None => Normalization::None,
            SchemeNormalization::Cosine | SchemeNormalization::PivotedUnique => Normalization::L2,
        }
    }

    /// Whether the scheme asks for the pivoted unique pass.
    pub fn pivoted(&self) -> bool {
        self.normalization == SchemeNormalization::PivotedUnique
    }
}

impl Default for SmartirsScheme {
    /// `"ntc"`
    fn default() -> Self {
        SmartirsScheme {
            local: 'n',
            global: 't',
            normalization: SchemeNormalization::Cosine,
        }
    }
}

impl FromStr for SmartirsScheme {
    type Err = TfidfError;

    fn from_str(s: &str) -> Result<Self> {
        SmartirsScheme::parse(s)
    }
}

impl TryFrom<String> for SmartirsScheme {
    type Error = TfidfError;

    fn try_from(s: String) -> Result<Self> {
        SmartirsScheme::parse(&s)
    }
}

impl From<SmartirsScheme> for String {
    fn from(s: SmartirsScheme) -> Self {
        s.to_string()
    }
}

impl fmt::Display for SmartirsScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self.normalization {
            SchemeNormalization::None => 'n',
            SchemeNormalization::Cosine => 'c',
            SchemeNormalization::PivotedUnique => 'u',
        };
        write!(f, "{}{}{}", self.local, self.global, n)
    }
}
