//! Parsing of expanded text into typed values.

use super::ExpandError;
use url::{ParseError, Url};

/// Parses the boolean spellings `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
pub fn parse_bool(text: &str) -> Result<bool, ExpandError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ExpandError::InvalidBool(text.to_string())),
    }
}

/// Parses an optionally signed decimal integer.
pub fn parse_int(text: &str) -> Result<i64, ExpandError> {
    text.parse::<i64>()
        .map_err(|_| ExpandError::InvalidInt(text.to_string()))
}

/// Parses an absolute URL.
///
/// Relative references such as `/users/1` are rejected: a request target
/// needs a scheme and host, so the caller must expand a word that carries
/// them (typically `$base` followed by the path).
pub fn parse_url(text: &str) -> Result<Url, ExpandError> {
    Url::parse(text).map_err(|e| ExpandError::InvalidUrl {
        text: text.to_string(),
        reason: match e {
            ParseError::RelativeUrlWithoutBase => {
                "relative reference; an absolute URL with a scheme is required".to_string()
            }
            other => other.to_string(),
        },
    })
}
