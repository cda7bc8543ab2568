//! TTL-based response cache.
//!
//! [`Cache`] wraps a [`Store`] and keeps a [`CacheEntry`] (timestamp, payload,
//! checksum) under each key. Expiry is checked lazily: an entry older than
//! the TTL passed to [`Cache::get`] is deleted on that read and reported as
//! a miss. Nothing sweeps the store in the background.
//!
//! A miss is not a failure. [`CacheError::Miss`] covers absent, unreadable
//! and expired entries alike; [`CacheError::Store`] means the backing store
//! itself failed and should be surfaced.
//!
//! # Example
//!
//! ```
//! use reqdef::cache::{Cache, MemoryStore};
//! use std::time::Duration;
//!
//! let cache = Cache::new(MemoryStore::new());
//! cache.put("GET https://example.com", b"hello").unwrap();
//!
//! let hit = cache.get("GET https://example.com", Duration::from_secs(60)).unwrap();
//! assert_eq!(hit, b"hello");
//! assert!(cache.get("other", Duration::from_secs(60)).unwrap_err().is_miss());
//! ```

pub mod models;
pub mod storage;

pub use models::{checksum, CacheEntry};
pub use storage::{FileStore, MemoryStore, Store, StoreError};

use crate::config::ReqdefConfig;
use chrono::{DateTime, Utc};
use log::debug;
use std::fmt;
use std::time::Duration;

/// Outcome of a cache operation that produced no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// No usable entry; fetch fresh data.
    Miss,
    /// The backing store failed.
    Store(StoreError),
}

impl CacheError {
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss)
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Miss => write!(f, "cache miss"),
            CacheError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Miss => None,
            CacheError::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        CacheError::Store(err)
    }
}

/// Source of the current time for entry stamps and expiry checks.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Response cache over a [`Store`].
pub struct Cache<S: Store> {
    store: S,
    clock: Box<dyn Clock + Send + Sync>,
}

impl<S: Store> Cache<S> {
    /// Creates a cache using the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(store: S, clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            store,
            clock: Box::new(clock),
        }
    }

    /// Returns the payload stored under `key` if it is younger than `ttl`.
    ///
    /// An expired entry is deleted before the miss is reported.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Miss`] if the entry is absent, undecodable or expired
    /// - [`CacheError::Store`] if the store fails, including while deleting
    ///   an expired entry
    pub fn get(&self, key: &str, ttl: Duration) -> Result<Vec<u8>, CacheError> {
        let entry = match self.peek(key)? {
            Some(entry) => entry,
            None => {
                debug!("cache miss for {:?}", key);
                return Err(CacheError::Miss);
            }
        };

        let age = entry.age(self.clock.now());
        if age >= ttl {
            debug!(
                "cache entry {:?} expired ({}s old, ttl {}s)",
                key,
                age.as_secs(),
                ttl.as_secs()
            );
            self.store.delete(key)?;
            return Err(CacheError::Miss);
        }

        Ok(entry.data)
    }

    /// Reads the entry under `key` without checking its age.
    ///
    /// Undecodable entries read as `None`.
    pub fn peek(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(StoreError::BadValue(reason)) => {
                debug!("cache entry {:?} is undecodable: {}", key, reason);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice::<CacheEntry>(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                debug!("cache entry {:?} is unreadable: {}", key, err);
                Ok(None)
            }
        }
    }

    /// Stores `data` under `key`, stamped with the current time.
    ///
    /// Overwrites any previous entry.
    pub fn put(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        let entry = CacheEntry::new(data.to_vec(), self.clock.now());
        let encoded =
            serde_json::to_vec(&entry).map_err(|e| StoreError::Io(e.to_string()))?;
        self.store.put(key, &encoded)?;
        Ok(())
    }

    /// Closes the underlying store.
    pub fn close(self) -> Result<(), CacheError> {
        self.store.close()?;
        Ok(())
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl Cache<FileStore> {
    /// Opens the file-backed cache named by `config.cache_file`.
    pub fn from_config(config: &ReqdefConfig) -> Result<Self, CacheError> {
        Ok(Self::new(FileStore::open(&config.cache_file)?))
    }
}

impl<S: Store + fmt::Debug> fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("store", &self.store).finish()
    }
}
