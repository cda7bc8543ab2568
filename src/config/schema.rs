//! Configuration schema for reqdef.
//!
//! This module defines the configuration structure and validation logic for
//! the user-configurable parts of the request-definition front end.

use serde::{Deserialize, Serialize};

/// Main configuration structure.
///
/// All settings can be supplied under the "reqdef" key of a JSON settings
/// document. Missing settings fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReqdefConfig {
    /// Reserved words the scanner classifies as keywords.
    ///
    /// Words not in this list lex as plain identifiers.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Name of the JSON file holding shared and per-environment variables.
    ///
    /// Searched for in the working directory and up to 3 parent directories.
    #[serde(default = "default_environment_file")]
    pub environment_file: String,

    /// Path of the file backing the response cache.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,

    /// Maximum age of a cached response, in seconds.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for ReqdefConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            environment_file: default_environment_file(),
            cache_file: default_cache_file(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl ReqdefConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_secs == 0 {
            return Err("cacheTtlSecs must be greater than 0".to_string());
        }

        if let Some(bad) = self.keywords.iter().find(|k| !is_keyword_shaped(k)) {
            return Err(format!("keyword '{}' must be a non-empty word", bad));
        }

        if self.cache_file.trim().is_empty() {
            return Err("cacheFile must not be empty".to_string());
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn merge(&self, other: &ReqdefConfig) -> Self {
        Self {
            keywords: other.keywords.clone(),
            environment_file: other.environment_file.clone(),
            cache_file: other.cache_file.clone(),
            cache_ttl_secs: other.cache_ttl_secs,
        }
    }
}

/// Keywords must start with a letter and contain no blanks.
fn is_keyword_shaped(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() => chars.all(|c| !c.is_whitespace()),
        _ => false,
    }
}

// Default value functions for serde

fn default_keywords() -> Vec<String> {
    [
        "collection",
        "request",
        "before",
        "after",
        "set",
        "let",
        "with",
        "header",
        "query",
        "body",
        "cookie",
        "auth",
        "basic",
        "bearer",
        "jwt",
        "expect",
        "include",
        "get",
        "post",
        "put",
        "patch",
        "delete",
        "head",
        "options",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn default_environment_file() -> String {
    ".reqdef-env.json".to_string()
}

fn default_cache_file() -> String {
    ".reqdef-cache.json".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}
