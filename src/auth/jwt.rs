//! JWT claim-set assembly.
//!
//! This module expands claim words into a [`Claims`] set and hands it to a
//! [`JwtEncoder`]. Signing itself lives behind that trait; the only encoder
//! shipped here is [`UnsecuredEncoder`], which produces `alg: none` tokens.

use crate::environment::Environment;
use crate::word::{ExpandError, Word};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::ser::{Serialize, Serializer};
use serde_json::json;
use std::fmt;

/// Value of a single claim.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Single(String),
    List(Vec<String>),
}

/// Ordered claim set. Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    entries: Vec<(String, ClaimValue)>,
}

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a claim, replacing an existing one of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: ClaimValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Claims {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(n, v)| (n, v)))
    }
}

/// Expands each claim's words.
///
/// A claim with exactly one word becomes a single value, any other count a
/// list. The first expansion failure aborts assembly.
pub fn assemble_claims(
    claims: &[(String, Vec<Word>)],
    env: &Environment<String>,
) -> Result<Claims, ExpandError> {
    let mut out = Claims::new();
    for (name, words) in claims {
        let value = match words.as_slice() {
            [single] => ClaimValue::Single(single.expand(env)?),
            many => ClaimValue::List(
                many.iter()
                    .map(|w| w.expand(env))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };
        out.insert(name.clone(), value);
    }
    Ok(out)
}

/// Errors reported by a [`JwtEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The encoder does not implement the requested algorithm
    UnsupportedAlgorithm(String),
    /// Serialization or signing failed
    Signing(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported JWT algorithm: {}", alg)
            }
            EncodeError::Signing(msg) => write!(f, "JWT encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError::Signing(err.to_string())
    }
}

/// Turns a claim set into a compact token.
pub trait JwtEncoder {
    fn encode(&self, claims: &Claims, algorithm: &str, secret: &str)
        -> Result<String, EncodeError>;
}

impl<F> JwtEncoder for F
where
    F: Fn(&Claims, &str, &str) -> Result<String, EncodeError>,
{
    fn encode(
        &self,
        claims: &Claims,
        algorithm: &str,
        secret: &str,
    ) -> Result<String, EncodeError> {
        self(claims, algorithm, secret)
    }
}

/// Encoder for unsecured tokens (RFC 7519 section 6).
///
/// Accepts only the `none` algorithm and ignores the secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsecuredEncoder;

impl JwtEncoder for UnsecuredEncoder {
    fn encode(
        &self,
        claims: &Claims,
        algorithm: &str,
        _secret: &str,
    ) -> Result<String, EncodeError> {
        if !algorithm.eq_ignore_ascii_case("none") {
            return Err(EncodeError::UnsupportedAlgorithm(algorithm.to_string()));
        }
        let header = serde_json::to_vec(&json!({ "alg": "none", "typ": "JWT" }))?;
        let payload = serde_json::to_vec(claims)?;
        Ok(format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        ))
    }
}
