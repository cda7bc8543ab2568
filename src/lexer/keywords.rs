//! Reserved-word set used to tell keywords from identifiers.

use crate::config::ReqdefConfig;
use std::collections::HashSet;

/// Set of reserved words, matched case-sensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    words: HashSet<String>,
}

impl Keywords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds the set from the `keywords` setting.
    pub fn from_config(config: &ReqdefConfig) -> Self {
        Self::new(config.keywords.iter().cloned())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
