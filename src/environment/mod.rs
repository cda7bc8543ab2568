//! Lexically scoped variable environments.
//!
//! An [`Environment`] is a handle to one scope: a local map of bindings plus
//! an optional parent. Scopes form a tree rooted at the global/collection
//! scope; request scopes are created fresh per execution with
//! [`Environment::enclosed`] and dropped afterwards.
//!
//! Handles are cheap to clone and share the scope they point at, so a fully
//! populated parent can be read from many request scopes at once. Writes are
//! not coordinated beyond each scope's own lock; populate shared parents
//! before handing them out.
//!
//! # Example
//!
//! ```
//! use reqdef::environment::Environment;
//!
//! let collection = Environment::new();
//! collection.define("host", "api.example.com".to_string());
//!
//! let request = Environment::enclosed(&collection);
//! request.define("id", "42".to_string());
//!
//! assert_eq!(request.resolve("host").unwrap(), "api.example.com");
//! assert!(collection.resolve("id").is_err());
//! ```

pub mod loader;

pub use loader::{find_environment_file, load_environment, parse_environment, LoadError};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Errors raised by environment lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// The name is not bound anywhere in the scope chain.
    Undefined(String),
}

impl EnvError {
    /// The identifier the lookup was for.
    pub fn name(&self) -> &str {
        match self {
            EnvError::Undefined(name) => name,
        }
    }
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvError::Undefined(name) => write!(f, "identifier not defined: {}", name),
        }
    }
}

impl std::error::Error for EnvError {}

#[derive(Debug)]
struct Scope<V> {
    values: RwLock<HashMap<String, V>>,
    parent: Option<Environment<V>>,
}

/// Handle to a scope of name to value bindings.
#[derive(Debug)]
pub struct Environment<V> {
    scope: Arc<Scope<V>>,
}

impl<V> Clone for Environment<V> {
    fn clone(&self) -> Self {
        Self {
            scope: Arc::clone(&self.scope),
        }
    }
}

impl<V> Default for Environment<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Environment<V> {
    /// Creates a root scope.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    /// Creates a child scope of `parent`.
    pub fn enclosed(parent: &Environment<V>) -> Self {
        Self::with_parent(Some(parent.clone()))
    }

    fn with_parent(parent: Option<Environment<V>>) -> Self {
        Self {
            scope: Arc::new(Scope {
                values: RwLock::new(HashMap::new()),
                parent,
            }),
        }
    }

    pub fn parent(&self) -> Option<&Environment<V>> {
        self.scope.parent.as_ref()
    }

    /// Number of ancestors above this scope.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Binds `name` in this scope, shadowing any ancestor binding.
    pub fn define(&self, name: impl Into<String>, value: V) {
        self.scope
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value);
    }

    /// Overwrites an existing binding in the nearest scope that holds `name`.
    ///
    /// Never creates a binding.
    pub fn assign(&self, name: &str, value: V) -> Result<(), EnvError> {
        for env in self.ancestors() {
            let mut values = env
                .scope
                .values
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = values.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(EnvError::Undefined(name.to_string()))
    }

    /// Returns true if `name` is bound anywhere in the chain.
    pub fn contains(&self, name: &str) -> bool {
        self.ancestors().any(|env| env.contains_local(name))
    }

    /// Names bound in this scope only, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scope
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn contains_local(&self, name: &str) -> bool {
        self.scope
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// This scope followed by each ancestor up to the root.
    fn ancestors(&self) -> impl Iterator<Item = &Environment<V>> {
        std::iter::successors(Some(self), |env| env.parent())
    }
}

impl<V: Clone> Environment<V> {
    /// Looks `name` up in this scope, then in each ancestor.
    pub fn resolve(&self, name: &str) -> Result<V, EnvError> {
        for env in self.ancestors() {
            let values = env
                .scope
                .values
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = values.get(name) {
                return Ok(value.clone());
            }
        }
        Err(EnvError::Undefined(name.to_string()))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Environment<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let env = Environment::new();
        for (name, value) in iter {
            env.define(name, value);
        }
        env
    }
}
