//! End-to-end tests from source text to expanded values
//!
//! These tests scan request-definition snippets, assemble words from the
//! token stream the way a document parser would, and expand them against
//! environments loaded from disk.

use super::{quoted_words, scan, write_file};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqdef::auth::jwt::UnsecuredEncoder;
use reqdef::environment::load_environment;
use reqdef::lexer::TokenKind;
use reqdef::{Authorization, Environment, ExpandError, Word};
use tempfile::TempDir;

const REQUEST: &str = "request get `https://$host/users/${id}` {
  auth bearer `$token`
}
";

const ENV_FILE: &str = r#"{
    "shared": { "user": "alice", "pass": "secret" },
    "dev": { "host": "localhost:3000", "token": "dev-token" },
    "prod": { "host": "api.example.com", "token": "prod-token" },
    "active": "dev"
}"#;

fn load(active: Option<&str>) -> (TempDir, Environment<String>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_file(temp_dir.path(), ".reqdef-env.json", ENV_FILE);
    let env = load_environment(&path, active).expect("Failed to load environment");
    (temp_dir, env)
}

#[test]
fn test_request_token_stream() {
    let kinds: Vec<TokenKind> = scan(REQUEST).iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword,
            TokenKind::Keyword,
            TokenKind::Quote,
            TokenKind::String,
            TokenKind::Variable,
            TokenKind::String,
            TokenKind::Variable,
            TokenKind::Quote,
            TokenKind::LeftBrace,
            TokenKind::Keyword,
            TokenKind::Keyword,
            TokenKind::Quote,
            TokenKind::Variable,
            TokenKind::Quote,
            TokenKind::EndOfLine,
            TokenKind::RightBrace,
            TokenKind::EndOfInput,
        ]
    );
}

#[test]
fn test_request_expands_against_active_environment() {
    let (_temp_dir, env) = load(None);
    let request_scope = Environment::enclosed(&env);
    request_scope.define("id", "42".to_string());

    let words = quoted_words(&scan(REQUEST));
    assert_eq!(words.len(), 2);

    let url = words[0].expand_url(&request_scope).unwrap();
    assert_eq!(url.as_str(), "https://localhost:3000/users/42");
    assert_eq!(url.host_str(), Some("localhost"));
    assert_eq!(url.port(), Some(3000));
    assert_eq!(url.path(), "/users/42");

    let auth = Authorization::Bearer {
        token: words[1].clone(),
    };
    assert_eq!(
        auth.header_value(&request_scope, &UnsecuredEncoder).unwrap(),
        "Bearer dev-token"
    );
}

#[test]
fn test_same_words_against_another_environment() {
    let (_temp_dir, env) = load(Some("prod"));
    let request_scope = Environment::enclosed(&env);
    request_scope.define("id", "7".to_string());

    let words = quoted_words(&scan(REQUEST));
    assert_eq!(
        words[0].expand(&request_scope).unwrap(),
        "https://api.example.com/users/7"
    );
    assert_eq!(words[1].expand(&request_scope).unwrap(), "prod-token");
}

#[test]
fn test_missing_request_variable_aborts_expansion() {
    let (_temp_dir, env) = load(None);
    let request_scope = Environment::enclosed(&env);

    let words = quoted_words(&scan(REQUEST));
    let err = words[0].expand(&request_scope).unwrap_err();
    assert!(matches!(&err, ExpandError::Undefined(e) if e.name() == "id"));
    assert_eq!(err.to_string(), "identifier not defined: id");
}

#[test]
fn test_basic_auth_from_shared_variables() {
    let (_temp_dir, env) = load(None);
    let words = quoted_words(&scan("auth basic `$user` `$pass`\n"));
    assert_eq!(words.len(), 2);

    let auth = Authorization::Basic {
        user: words[0].clone(),
        pass: words[1].clone(),
    };
    assert_eq!(auth.method(), "Basic");
    assert_eq!(
        auth.header_value(&env, &UnsecuredEncoder).unwrap(),
        "Basic YWxpY2U6c2VjcmV0"
    );
}

#[test]
fn test_jwt_claims_from_source() {
    let (_temp_dir, env) = load(None);
    let words = quoted_words(&scan("`$user` `web` `${host}`"));

    let auth = Authorization::JwtClaims {
        claims: vec![
            ("sub".to_string(), vec![words[0].clone()]),
            ("aud".to_string(), vec![words[1].clone(), words[2].clone()]),
        ],
        algorithm: "none".to_string(),
        secret: String::new(),
    };

    let token = auth.expand(&env, &UnsecuredEncoder).unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[2], "");

    let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
    assert_eq!(
        String::from_utf8(payload).unwrap(),
        r#"{"sub":"alice","aud":["web","localhost:3000"]}"#
    );
}

#[test]
fn test_heredoc_body_is_one_literal() {
    let tokens = scan("body <<EOF\n{\n\n  \"a\": 1\n}\nEOF\n");
    assert_eq!(tokens[0].kind, TokenKind::Keyword);
    assert_eq!(tokens[1].kind, TokenKind::String);
    assert_eq!(tokens[1].literal, "{  \"a\": 1}");
    assert_eq!(tokens[2].kind, TokenKind::EndOfInput);

    let word = Word::literal(tokens[1].literal.clone());
    assert_eq!(word.expand(&Environment::new()).unwrap(), "{  \"a\": 1}");
}

#[test]
fn test_unterminated_string_reports_position() {
    let tokens = scan("get `https://$host\n");
    let last = tokens.last().unwrap();
    assert_eq!(last.kind, TokenKind::Invalid);
    assert_eq!((last.line, last.column), (1, 19));
    assert_eq!(
        tokens.iter().filter(|t| t.is_terminal()).count(),
        1,
        "only the final token is terminal"
    );
}

#[test]
fn test_concurrent_request_scopes_share_parent() {
    let (_temp_dir, env) = load(None);
    let words = quoted_words(&scan(REQUEST));
    let url = &words[0];

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let env = &env;
                s.spawn(move || {
                    let request_scope = Environment::enclosed(env);
                    request_scope.define("id", i.to_string());
                    url.expand(&request_scope).unwrap()
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(
                handle.join().unwrap(),
                format!("https://localhost:3000/users/{}", i)
            );
        }
    });

    assert!(!env.contains("id"));
}
