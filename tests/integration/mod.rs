//! Integration tests for reqdef
//!
//! Shared helpers for tests that drive several modules together: source text
//! through the scanner, words through environments, and cache entries
//! through on-disk stores.

pub mod cache_test;
pub mod environment_test;
pub mod pipeline_test;

use reqdef::config::ReqdefConfig;
use reqdef::lexer::{Keywords, Scanner, Token, TokenKind};
use reqdef::Word;
use std::fs;
use std::path::{Path, PathBuf};

/// Scans `source` with the default keyword set, independent of global config.
pub fn scan(source: &str) -> Vec<Token> {
    Scanner::with_keywords(source, Keywords::from_config(&ReqdefConfig::default()))
        .into_iter()
        .collect()
}

/// Turns every quoted region in `tokens` into a compound word.
///
/// Stands in for the document parser: `String` pieces become literals and
/// `Variable` pieces become variables, in order.
pub fn quoted_words(tokens: &[Token]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Vec<Word>> = None;

    for token in tokens {
        match token.kind {
            TokenKind::Quote => match current.take() {
                Some(parts) => words.push(Word::compound(parts)),
                None => current = Some(Vec::new()),
            },
            TokenKind::String => {
                if let Some(parts) = current.as_mut() {
                    parts.push(Word::literal(token.literal.clone()));
                }
            }
            TokenKind::Variable => {
                if let Some(parts) = current.as_mut() {
                    parts.push(Word::variable(token.literal.clone()));
                }
            }
            _ => {}
        }
    }

    words
}

/// Writes `content` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}
