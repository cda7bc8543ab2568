//! Words: expressions that expand to text against an [`Environment`].
//!
//! A [`Word`] is built once from tokens and may be expanded many times, e.g.
//! once per collection run. Type coercion happens at expansion time, so the
//! same word can feed a string, boolean, integer or URL context.
//!
//! # Example
//!
//! ```
//! use reqdef::environment::Environment;
//! use reqdef::word::Word;
//!
//! let env = Environment::new();
//! env.define("host", "api.example.com".to_string());
//!
//! let url = Word::compound(vec![
//!     Word::literal("https://"),
//!     Word::variable("host"),
//!     Word::literal("/users"),
//! ]);
//!
//! assert_eq!(url.expand(&env).unwrap(), "https://api.example.com/users");
//! assert_eq!(url.expand_url(&env).unwrap().path(), "/users");
//! ```

pub mod coerce;

use crate::environment::{EnvError, Environment};
use std::fmt;
use url::Url;

/// Errors that can occur while expanding a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    /// A referenced variable is not defined in the scope chain
    Undefined(EnvError),
    /// Expanded text is not a boolean spelling
    InvalidBool(String),
    /// Expanded text is not a decimal integer
    InvalidInt(String),
    /// Expanded text is not a valid URL
    InvalidUrl { text: String, reason: String },
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::Undefined(err) => write!(f, "{}", err),
            ExpandError::InvalidBool(text) => write!(f, "invalid boolean: {:?}", text),
            ExpandError::InvalidInt(text) => write!(f, "invalid integer: {:?}", text),
            ExpandError::InvalidUrl { text, reason } => {
                write!(f, "invalid URL {:?}: {}", text, reason)
            }
        }
    }
}

impl std::error::Error for ExpandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExpandError::Undefined(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EnvError> for ExpandError {
    fn from(err: EnvError) -> Self {
        ExpandError::Undefined(err)
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Word {
    /// Fixed text.
    Literal(String),
    /// Deferred lookup of a variable by name.
    Variable(String),
    /// Concatenation of child expansions, left to right.
    Compound(Vec<Word>),
}

impl Word {
    pub fn literal(text: impl Into<String>) -> Self {
        Word::Literal(text.into())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Word::Variable(name.into())
    }

    pub fn compound(parts: Vec<Word>) -> Self {
        Word::Compound(parts)
    }

    /// Expands the word to text.
    ///
    /// Compound words stop at the first failing child.
    pub fn expand(&self, env: &Environment<String>) -> Result<String, ExpandError> {
        match self {
            Word::Literal(text) => Ok(text.clone()),
            Word::Variable(name) => Ok(env.resolve(name)?),
            Word::Compound(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&part.expand(env)?);
                }
                Ok(out)
            }
        }
    }

    pub fn expand_bool(&self, env: &Environment<String>) -> Result<bool, ExpandError> {
        coerce::parse_bool(&self.expand(env)?)
    }

    pub fn expand_int(&self, env: &Environment<String>) -> Result<i64, ExpandError> {
        coerce::parse_int(&self.expand(env)?)
    }

    /// Expands to text and parses it as an absolute URL.
    pub fn expand_url(&self, env: &Environment<String>) -> Result<Url, ExpandError> {
        coerce::parse_url(&self.expand(env)?)
    }

    /// Names of referenced variables in evaluation order, duplicates kept.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Word::Literal(_) => {}
            Word::Variable(name) => names.push(name),
            Word::Compound(parts) => {
                for part in parts {
                    part.collect_variables(names);
                }
            }
        }
    }
}

/// Renders the word in source form, variables as `${name}`.
impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Word::Literal(text) => f.write_str(text),
            Word::Variable(name) => write!(f, "${{{}}}", name),
            Word::Compound(parts) => parts
                .iter()
                .try_for_each(|part| fmt::Display::fmt(part, f)),
        }
    }
}
