//! Front end for declarative HTTP request definitions.
//!
//! The crate turns request-definition source text into the values a request
//! executor needs at run time:
//!
//! - **lexer**: hand-written scanner producing [`Token`]s, with quoting modes
//!   for interpolated strings, raw strings and heredocs
//! - **environment**: lexically scoped variable [`Environment`]s and a JSON
//!   environment-file loader
//! - **word**: [`Word`] expressions expanded against an environment, with
//!   boolean, integer and URL coercion
//! - **auth**: [`Authorization`] schemes (Basic, Bearer, JWT claims) expanded
//!   into header values
//! - **cache**: TTL response [`Cache`] over a pluggable key-value store
//! - **config**: global settings (reserved words, file names, default TTL)
//!
//! Parsing tokens into requests and collections, and issuing the HTTP calls,
//! happen outside this crate.
//!
//! # Example
//!
//! ```
//! use reqdef::lexer::{tokenize, TokenKind};
//! use reqdef::{Environment, Word};
//!
//! let tokens = tokenize("`Bearer $token`");
//! let parts: Vec<Word> = tokens
//!     .iter()
//!     .filter_map(|t| match t.kind {
//!         TokenKind::String => Some(Word::literal(t.literal.clone())),
//!         TokenKind::Variable => Some(Word::variable(t.literal.clone())),
//!         _ => None,
//!     })
//!     .collect();
//!
//! let env = Environment::new();
//! env.define("token", "abc123".to_string());
//! assert_eq!(Word::compound(parts).expand(&env).unwrap(), "Bearer abc123");
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod environment;
pub mod lexer;
pub mod word;

pub use auth::{AuthError, Authorization};
pub use cache::{Cache, CacheError};
pub use config::ReqdefConfig;
pub use environment::{EnvError, Environment};
pub use lexer::{Scanner, Token, TokenKind};
pub use word::{ExpandError, Word};
