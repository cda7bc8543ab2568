//! reqdef diagnostic binary.
//!
//! ```text
//! reqdef [--config <settings.json>] tokens <file>
//! reqdef [--config <settings.json>] expand <file> [--env <name>]
//! reqdef [--config <settings.json>] cache get <key>
//! reqdef [--config <settings.json>] cache put <key> <file>
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use reqdef::cache::Cache;
use reqdef::config::{get_config, load_config};
use reqdef::environment::{find_environment_file, load_environment, Environment};
use reqdef::lexer::{Scanner, TokenKind};
use reqdef::word::Word;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "usage:
  reqdef [--config <settings.json>] tokens <file>
  reqdef [--config <settings.json>] expand <file> [--env <name>]
  reqdef [--config <settings.json>] cache get <key>
  reqdef [--config <settings.json>] cache put <key> <file>";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    if let Some(pos) = args.iter().position(|a| a == "--config") {
        if pos + 1 >= args.len() {
            eprintln!("--config requires a path\n{}", USAGE);
            return ExitCode::from(2);
        }
        let path = args.remove(pos + 1);
        args.remove(pos);
        if let Err(e) = apply_settings(Path::new(&path)) {
            eprintln!("reqdef: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["tokens", file] => dump_tokens(Path::new(file)),
        ["expand", file] => expand_variables(Path::new(file), None),
        ["expand", file, "--env", name] => expand_variables(Path::new(file), Some(*name)),
        ["cache", "get", key] => cache_get(key),
        ["cache", "put", key, file] => cache_put(key, Path::new(file)),
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("reqdef: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn apply_settings(path: &Path) -> Result<(), String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let settings = serde_json::from_str(&content)
        .map_err(|e| format!("invalid settings in {}: {}", path.display(), e))?;
    load_config(Some(settings))?;
    Ok(())
}

fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

/// Prints one token per line, stopping after the first terminal token.
fn dump_tokens(path: &Path) -> Result<(), String> {
    let source = read_source(path)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for token in Scanner::new(source) {
        writeln!(out, "{}", token).map_err(|e| e.to_string())?;
        if token.kind == TokenKind::Invalid {
            return Err(format!(
                "{}:{}:{}: invalid token",
                path.display(),
                token.line,
                token.column
            ));
        }
    }
    Ok(())
}

/// Resolves every variable referenced in the file against the environment
/// file found next to it.
fn expand_variables(path: &Path, env_name: Option<&str>) -> Result<(), String> {
    let source = read_source(path)?;
    let env = environment_for(path, env_name)?;

    let mut seen = BTreeSet::new();
    let mut failures = 0;
    for token in Scanner::new(source) {
        match token.kind {
            TokenKind::Variable if seen.insert(token.literal.clone()) => {
                match Word::variable(token.literal.as_str()).expand(&env) {
                    Ok(value) => println!("{} = {}", token.literal, value),
                    Err(e) => {
                        failures += 1;
                        eprintln!("{}:{}:{}: {}", path.display(), token.line, token.column, e);
                    }
                }
            }
            TokenKind::Invalid => {
                return Err(format!(
                    "{}:{}:{}: invalid token",
                    path.display(),
                    token.line,
                    token.column
                ));
            }
            _ => {}
        }
    }

    match failures {
        0 => Ok(()),
        n => Err(format!("{} undefined variable(s)", n)),
    }
}

fn environment_for(path: &Path, env_name: Option<&str>) -> Result<Environment<String>, String> {
    let config = get_config();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    match find_environment_file(dir, &config.environment_file) {
        Some(env_path) => load_environment(&env_path, env_name).map_err(|e| e.to_string()),
        None if env_name.is_some() => Err(format!(
            "no {} found near {}",
            config.environment_file,
            path.display()
        )),
        None => {
            log::info!("no {} found; using an empty environment", config.environment_file);
            Ok(Environment::new())
        }
    }
}

fn cache_get(key: &str) -> Result<(), String> {
    let config = get_config();
    let cache = Cache::from_config(&config).map_err(|e| e.to_string())?;
    match cache.get(key, config.cache_ttl()) {
        Ok(data) => std::io::stdout()
            .write_all(&data)
            .map_err(|e| e.to_string()),
        Err(e) if e.is_miss() => Err(format!("no fresh entry for {:?}", key)),
        Err(e) => Err(e.to_string()),
    }
}

fn cache_put(key: &str, path: &Path) -> Result<(), String> {
    let data =
        std::fs::read(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let cache = Cache::from_config(&get_config()).map_err(|e| e.to_string())?;
    cache.put(key, &data).map_err(|e| e.to_string())?;
    cache.close().map_err(|e| e.to_string())
}
