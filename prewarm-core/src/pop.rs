//! Point-of-presence identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Short code naming an edge location, e.g. `lhr` or `FRA50-C1`.
///
/// The code is opaque: it is only ever interpolated into hostnames and used
/// as a metric dimension, so the original casing is preserved.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PopCode(String);

impl PopCode {
    /// Create a POP code, trimming surrounding whitespace
    pub fn new(code: impl AsRef<str>) -> Result<Self, PopCodeError> {
        let code = code.as_ref().trim();
        if code.is_empty() {
            return Err(PopCodeError::Empty);
        }
        if let Some(c) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(PopCodeError::InvalidCharacter {
                code: code.to_string(),
                character: c,
            });
        }
        Ok(PopCode(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PopCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PopCode {
    type Err = PopCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PopCode::new(s)
    }
}

impl TryFrom<String> for PopCode {
    type Error = PopCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PopCode::new(value)
    }
}

impl From<PopCode> for String {
    fn from(code: PopCode) -> Self {
        code.0
    }
}

impl AsRef<str> for PopCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing POP codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PopCodeError {
    #[error("POP code cannot be empty")]
    Empty,

    #[error("POP code '{code}' contains invalid character '{character}' (allowed: letters, digits, '-')")]
    InvalidCharacter { code: String, character: char },
}

/// Parse a comma-separated POP list such as `"FRA,LHR, jfk"`.
///
/// Blank entries are skipped. Order and duplicates are kept as given; the
/// resolver deduplicates on its own.
pub fn parse_pop_list(list: &str) -> Result<Vec<PopCode>, PopCodeError> {
    list.split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(PopCode::new)
        .collect()
}
