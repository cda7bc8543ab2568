//! Environment and configuration integration tests
//!
//! Tests here that touch the global configuration run serially.

use super::write_file;
use reqdef::config::{get_config, load_config, reset_config};
use reqdef::environment::{find_environment_file, load_environment, EnvError};
use reqdef::lexer::{tokenize, TokenKind};
use reqdef::{Environment, Word};
use serde_json::json;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_configured_environment_file_is_found_upwards() {
    reset_config();
    load_config(Some(json!({ "reqdef": { "environmentFile": "vars.json" } }))).unwrap();

    let temp_dir = TempDir::new().unwrap();
    write_file(
        temp_dir.path(),
        "vars.json",
        r#"{ "shared": { "host": "example.com" } }"#,
    );
    let source_dir = temp_dir.path().join("requests").join("users");
    std::fs::create_dir_all(&source_dir).unwrap();

    let path = find_environment_file(&source_dir, &get_config().environment_file).unwrap();
    let env = load_environment(&path, None).unwrap();
    assert_eq!(env.resolve("host").unwrap(), "example.com");

    reset_config();
    assert!(find_environment_file(&source_dir, &get_config().environment_file).is_none());
}

#[test]
#[serial]
fn test_configured_keywords_drive_scanner() {
    reset_config();
    let kinds = |src: &str| -> Vec<TokenKind> { tokenize(src).iter().map(|t| t.kind).collect() };

    assert_eq!(kinds("fetch get")[..2], [TokenKind::Identifier, TokenKind::Keyword]);

    load_config(Some(json!({ "reqdef": { "keywords": ["fetch"] } }))).unwrap();
    assert_eq!(kinds("fetch get")[..2], [TokenKind::Keyword, TokenKind::Identifier]);

    reset_config();
}

#[test]
#[serial]
fn test_invalid_config_is_rejected_and_previous_kept() {
    reset_config();
    let err = load_config(Some(json!({ "reqdef": { "cacheTtlSecs": 0 } }))).unwrap_err();
    assert!(err.contains("cacheTtlSecs"));
    assert_eq!(get_config().cache_ttl_secs, 300);
}

#[test]
fn test_assignment_reaches_loaded_scope() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "env.json",
        r#"{ "shared": { "token": "initial" }, "dev": { "host": "localhost" } }"#,
    );
    let env = load_environment(&path, Some("dev")).unwrap();
    let request_scope = Environment::enclosed(&env);

    // a response hook updating a shared value from a request scope
    request_scope.assign("token", "refreshed".to_string()).unwrap();
    assert_eq!(
        env.parent().unwrap().resolve("token").unwrap(),
        "refreshed"
    );
    assert!(request_scope.identifiers().is_empty());

    assert_eq!(
        request_scope.assign("missing", String::new()),
        Err(EnvError::Undefined("missing".to_string()))
    );
}

#[test]
fn test_request_scope_shadows_without_leaking() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "env.json",
        r#"{ "dev": { "host": "localhost", "port": 8080 }, "active": "dev" }"#,
    );
    let env = load_environment(&path, None).unwrap();
    let word = Word::compound(vec![
        Word::variable("host"),
        Word::literal(":"),
        Word::variable("port"),
    ]);

    let request_scope = Environment::enclosed(&env);
    request_scope.define("port", "9090".to_string());

    assert_eq!(word.expand(&request_scope).unwrap(), "localhost:9090");
    assert_eq!(word.expand(&env).unwrap(), "localhost:8080");
    assert!(word.expand_int(&request_scope).is_err());
}
