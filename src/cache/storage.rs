//! Key-value stores underneath the response cache.
//!
//! A [`Store`] maps string keys to opaque byte values. Each call is atomic on
//! its own; callers get no transaction spanning several calls.
//!
//! Two implementations are provided:
//! - [`MemoryStore`]: process-local map, for tests and short-lived runs
//! - [`FileStore`]: one JSON file holding the whole keyspace, rewritten
//!   through a temporary file and a rename on every mutation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

/// Errors reported by a [`Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    Io(String),
    /// The backing medium holds data the store cannot read.
    Corrupt(String),
    /// The value stored under one key cannot be decoded. Other keys are
    /// unaffected.
    BadValue(String),
    /// The store was closed.
    Closed,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "cache store I/O error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "cache store is corrupt: {}", msg),
            StoreError::BadValue(msg) => write!(f, "undecodable cache value: {}", msg),
            StoreError::Closed => write!(f, "cache store is closed"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Persistent byte store keyed by string.
pub trait Store {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Releases the store. Every later call fails with [`StoreError::Closed`].
    fn close(&self) -> Result<(), StoreError>;
}

/// In-memory [`Store`].
#[derive(Debug)]
pub struct MemoryStore {
    // None once closed
    values: RwLock<Option<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(Some(HashMap::new())),
        }
    }

    /// Number of stored keys; zero once closed.
    pub fn len(&self) -> usize {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let values = values.as_ref().ok_or(StoreError::Closed)?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let values = values.as_mut().ok_or(StoreError::Closed)?;
        values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let values = values.as_mut().ok_or(StoreError::Closed)?;
        values.remove(key);
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        *values = None;
        Ok(())
    }
}

/// File-backed [`Store`].
///
/// The file holds a JSON object mapping keys to base64 values. A missing file
/// is an empty store. Mutations read the file, apply the change, write the
/// result to a uniquely named sibling and rename it over the original, so a
/// crash mid-write leaves the previous contents in place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process; false once closed
    open: Mutex<bool>,
}

impl FileStore {
    /// Opens the store at `path`, creating parent directories as needed.
    ///
    /// The file itself is created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path,
            open: Mutex::new(true),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            StoreError::Corrupt(format!("{}: {}", self.path.display(), e))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        replace_file(&self.path, &temp_path, json.as_bytes())?;
        Ok(())
    }
}

/// Writes `contents` to `temp_path` and renames it over `path`.
///
/// `temp_path` is removed if any step fails.
fn replace_file(path: &Path, temp_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let result = File::create(temp_path)
        .and_then(|mut temp_file| {
            temp_file.write_all(contents)?;
            temp_file.flush()
        })
        .and_then(|()| fs::rename(temp_path, path));

    if result.is_err() {
        let _ = fs::remove_file(temp_path);
    }
    result
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            return Err(StoreError::Closed);
        }
        match self.read_map()?.get(key) {
            Some(encoded) => STANDARD
                .decode(encoded)
                .map(Some)
                .map_err(|e| StoreError::BadValue(format!("{:?}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            return Err(StoreError::Closed);
        }
        let mut map = self.read_map()?;
        map.insert(key.to_string(), STANDARD.encode(value));
        self.write_map(&map)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            return Err(StoreError::Closed);
        }
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn close(&self) -> Result<(), StoreError> {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        *open = false;
        Ok(())
    }
}
