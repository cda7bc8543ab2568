//! Cache tests against the file-backed store
//!
//! These tests exercise the cache through a real file in a temporary
//! directory, including reopening the store and damaging the file.

use chrono::{DateTime, TimeZone, Utc};
use reqdef::cache::{checksum, Cache, CacheError, Clock, FileStore, Store, StoreError};
use reqdef::config::ReqdefConfig;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Clone)]
struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )))
    }

    fn advance(&self, secs: i64) {
        *self.0.lock().unwrap() += chrono::Duration::seconds(secs);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn file_cache(path: &Path, clock: &TestClock) -> Cache<FileStore> {
    Cache::with_clock(
        FileStore::open(path).expect("Failed to open store"),
        clock.clone(),
    )
}

const TTL: Duration = Duration::from_secs(10);

#[test]
fn test_ttl_scenario_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let clock = TestClock::new();
    let cache = file_cache(&path, &clock);

    cache.put("k", b"v1").unwrap();
    assert_eq!(cache.get("k", TTL).unwrap(), b"v1");

    clock.advance(11);
    assert_eq!(cache.get("k", TTL), Err(CacheError::Miss));
    assert_eq!(cache.store().get("k").unwrap(), None);
}

#[test]
fn test_entries_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let clock = TestClock::new();

    let cache = file_cache(&path, &clock);
    cache.put("GET https://example.com/a", b"alpha").unwrap();
    cache.put("GET https://example.com/b", b"beta").unwrap();
    cache.close().unwrap();

    clock.advance(5);
    let reopened = file_cache(&path, &clock);
    assert_eq!(
        reopened.get("GET https://example.com/a", TTL).unwrap(),
        b"alpha"
    );
    let entry = reopened.peek("GET https://example.com/b").unwrap().unwrap();
    assert_eq!(entry.checksum, checksum(b"beta"));
    assert!(entry.is_intact());
}

#[test]
fn test_last_write_wins() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let clock = TestClock::new();

    let first = file_cache(&path, &clock);
    let second = file_cache(&path, &clock);
    first.put("k", b"one").unwrap();
    second.put("k", b"two").unwrap();

    assert_eq!(first.get("k", TTL).unwrap(), b"two");
}

#[test]
fn test_expiry_only_removes_that_key() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let clock = TestClock::new();
    let cache = file_cache(&path, &clock);

    cache.put("old", b"1").unwrap();
    clock.advance(8);
    cache.put("new", b"2").unwrap();
    clock.advance(4);

    assert!(cache.get("old", TTL).unwrap_err().is_miss());
    assert_eq!(cache.get("new", TTL).unwrap(), b"2");
}

#[test]
fn test_damaged_entry_is_miss_but_damaged_file_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let clock = TestClock::new();
    let cache = file_cache(&path, &clock);

    // a well-formed store value that is not a cache entry
    cache.store().put("k", b"{\"when\": 1}").unwrap();
    assert_eq!(cache.get("k", TTL), Err(CacheError::Miss));

    fs::write(&path, "not json at all").unwrap();
    match cache.get("k", TTL) {
        Err(CacheError::Store(StoreError::Corrupt(_))) => {}
        other => panic!("Expected corrupt store error, got {:?}", other),
    }
}

#[test]
fn test_undecodable_value_is_miss_for_that_key_only() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let clock = TestClock::new();
    let cache = file_cache(&path, &clock);

    cache.put("good", b"payload").unwrap();
    let mut map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    map.insert("bad".to_string(), "!!!not-base64!!!".into());
    fs::write(&path, serde_json::to_string(&map).unwrap()).unwrap();

    assert_eq!(cache.get("bad", TTL), Err(CacheError::Miss));
    assert_eq!(cache.peek("bad").unwrap(), None);
    assert_eq!(cache.get("good", TTL).unwrap(), b"payload");

    // the key can be written again
    cache.put("bad", b"fresh").unwrap();
    assert_eq!(cache.get("bad", TTL).unwrap(), b"fresh");
}

#[test]
fn test_cache_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = ReqdefConfig {
        cache_file: temp_dir
            .path()
            .join("nested")
            .join("responses.json")
            .to_string_lossy()
            .into_owned(),
        ..Default::default()
    };

    let cache = Cache::from_config(&config).unwrap();
    cache.put("k", b"payload").unwrap();
    assert_eq!(cache.get("k", config.cache_ttl()).unwrap(), b"payload");
    assert!(temp_dir.path().join("nested").join("responses.json").is_file());
}
