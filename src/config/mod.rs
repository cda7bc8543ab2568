//! Configuration management for reqdef.
//!
//! Configuration is loaded from the "reqdef" key of a JSON settings document
//! and merged with defaults, then kept in a process-wide singleton.

pub mod schema;

pub use schema::ReqdefConfig;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{PoisonError, RwLock};

/// Global configuration instance.
///
/// This is lazily initialized on first access and can be replaced when
/// settings change.
static CONFIG: Lazy<RwLock<ReqdefConfig>> = Lazy::new(|| RwLock::new(ReqdefConfig::default()));

/// Loads configuration from a JSON settings document and installs it.
///
/// Settings are read from the "reqdef" key; a document without that key
/// yields the defaults. Settings that fail to deserialize are logged and
/// ignored. The merged configuration is validated before it replaces the
/// global one, so a rejected document leaves the current configuration in
/// place.
///
/// # Arguments
///
/// * `settings_json` - Optional settings document with a "reqdef" object
///
/// # Returns
///
/// The installed `ReqdefConfig`, or a message naming the invalid setting.
///
/// # Example
///
/// ```no_run
/// use reqdef::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "reqdef": {
///         "cacheTtlSecs": 60
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.cache_ttl_secs, 60);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ReqdefConfig, String> {
    let config = settings_json
        .as_ref()
        .map_or_else(ReqdefConfig::default, settings_from);
    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}", e))?;

    let mut global = CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    *global = config.clone();
    log::debug!(
        "loaded reqdef settings: {} keywords, ttl {}s, cache at {}",
        config.keywords.len(),
        config.cache_ttl_secs,
        config.cache_file
    );
    Ok(config)
}

/// Merges the "reqdef" object of `settings` over the defaults.
fn settings_from(settings: &Value) -> ReqdefConfig {
    let defaults = ReqdefConfig::default();
    let Some(section) = settings.get("reqdef") else {
        return defaults;
    };
    match ReqdefConfig::deserialize(section) {
        Ok(user_config) => defaults.merge(&user_config),
        Err(e) => {
            log::warn!("failed to parse reqdef settings: {}; using defaults", e);
            defaults
        }
    }
}

/// Gets a clone of the current global configuration.
///
/// Scanners built with [`Scanner::new`](crate::lexer::Scanner::new) and the
/// diagnostic binary read their settings from here. Returns the defaults
/// until [`load_config`] succeeds.
pub fn get_config() -> ReqdefConfig {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Restores the default configuration.
pub fn reset_config() {
    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = ReqdefConfig::default();
}
