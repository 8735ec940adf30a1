use crate::IdentifierError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of every canonical ASIN
pub const ASIN_LEN: usize = 10;

/// A marketplace product identifier in canonical shape
///
/// Canonical means exactly ten ASCII alphanumeric characters with a leading
/// `B`. Parsing trims surrounding whitespace and upper-cases the input.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asin(String);

impl Asin {
    /// Parses and canonicalizes an ASIN
    ///
    /// # Example
    ///
    /// ```
    /// use rank_scout::Asin;
    ///
    /// let asin = Asin::parse(" b0crmzhdg8 ").unwrap();
    /// assert_eq!(asin.as_str(), "B0CRMZHDG8");
    /// assert!(Asin::parse("0123456789").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let candidate = raw.trim().to_ascii_uppercase();

        if candidate.len() != ASIN_LEN {
            return Err(IdentifierError::Length(candidate.chars().count()));
        }

        if !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdentifierError::Charset(candidate));
        }

        if !candidate.starts_with('B') {
            return Err(IdentifierError::Prefix(candidate));
        }

        Ok(Self(candidate))
    }

    /// Returns true if `raw` is already canonical without any rewriting
    pub fn is_canonical(raw: &str) -> bool {
        raw.len() == ASIN_LEN
            && raw.starts_with('B')
            && raw
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Asin {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Asin {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Asin> for String {
    fn from(asin: Asin) -> Self {
        asin.0
    }
}

impl AsRef<str> for Asin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
