//! Environment file loader.
//!
//! Builds a scope chain from a JSON file of the form
//!
//! ```json
//! {
//!     "shared": { "version": "v1" },
//!     "dev": { "host": "localhost:3000" },
//!     "prod": { "host": "api.example.com" },
//!     "active": "dev"
//! }
//! ```
//!
//! Shared variables are defined in a root scope and the selected
//! environment's variables in a child scope on top of it, so environment
//! values shadow shared ones.

use super::Environment;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Maximum number of parent directories to search
const MAX_PARENT_SEARCH_DEPTH: usize = 3;

/// Errors that can occur while loading an environment file
#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    /// IO error occurred while reading file
    Io(String),

    /// Failed to parse JSON content
    Parse(String),

    /// Invalid format or structure in the environment file
    InvalidFormat(String),

    /// The requested environment is not declared in the file
    UnknownEnvironment(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "IO error: {}", msg),
            LoadError::Parse(msg) => write!(f, "Failed to parse environment file: {}", msg),
            LoadError::InvalidFormat(msg) => write!(f, "Invalid environment format: {}", msg),
            LoadError::UnknownEnvironment(name) => {
                write!(f, "Environment '{}' not found", name)
            }
        }
    }
}

impl std::error::Error for LoadError {}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err.to_string())
    }
}

/// Finds `file_name` in `start_dir` or up to 3 of its parents.
pub fn find_environment_file(start_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let mut current = Some(start_dir);

    for _ in 0..=MAX_PARENT_SEARCH_DEPTH {
        let dir = current?;
        let candidate = dir.join(file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }

    None
}

/// Loads an environment file and returns the scope for `active`.
///
/// When `active` is `None` the file's own `"active"` entry is used; when
/// neither names an environment the shared root scope is returned.
pub fn load_environment(
    path: &Path,
    active: Option<&str>,
) -> Result<Environment<String>, LoadError> {
    let content = fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)?;
    log::debug!("loaded environment file {}", path.display());
    parse_environment(&raw, active)
}

/// Builds the scope chain from an already parsed environment document.
pub fn parse_environment(
    raw: &Value,
    active: Option<&str>,
) -> Result<Environment<String>, LoadError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| LoadError::InvalidFormat("Root must be a JSON object".to_string()))?;

    let mut shared = HashMap::new();
    let mut environments = HashMap::new();
    let mut file_active = None;

    for (key, value) in obj {
        match key.as_str() {
            "shared" | "$shared" => {
                shared = parse_variable_map(value, "shared")?;
            }
            "active" | "$active" => {
                file_active = value.as_str().map(str::to_string);
            }
            env_name => {
                if !is_valid_identifier(env_name) {
                    return Err(LoadError::InvalidFormat(format!(
                        "Invalid environment name: '{}'. Names must be alphanumeric with underscores/hyphens",
                        env_name
                    )));
                }
                environments.insert(env_name.to_string(), parse_variable_map(value, env_name)?);
            }
        }
    }

    let root: Environment<String> = shared.into_iter().collect();

    let selected = active.map(str::to_string).or(file_active);
    let Some(name) = selected else {
        return Ok(root);
    };

    let variables = environments
        .remove(&name)
        .ok_or_else(|| LoadError::UnknownEnvironment(name.clone()))?;

    log::debug!(
        "environment '{}' selected with {} variables",
        name,
        variables.len()
    );

    let scope = Environment::enclosed(&root);
    for (key, value) in variables {
        scope.define(key, value);
    }
    Ok(scope)
}

/// Converts a JSON object of scalars into a variable map
fn parse_variable_map(value: &Value, context: &str) -> Result<HashMap<String, String>, LoadError> {
    let obj = value
        .as_object()
        .ok_or_else(|| LoadError::InvalidFormat(format!("'{}' must be a JSON object", context)))?;

    let mut map = HashMap::new();

    for (key, val) in obj {
        let value_str = match val {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            _ => {
                return Err(LoadError::InvalidFormat(format!(
                    "Variable '{}' in '{}' has invalid type (must be string, number, or boolean)",
                    key, context
                )));
            }
        };

        map.insert(key.clone(), value_str);
    }

    Ok(map)
}

/// Environment names start with a letter or underscore and continue with
/// letters, digits, underscores or hyphens.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
