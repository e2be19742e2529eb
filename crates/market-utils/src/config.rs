//! Environment configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// Variable is set but its value does not parse
    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Load a `.env` file from the working directory (or a parent), if one exists
///
/// Variables already present in the process environment win.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env file: {e}"),
    }
}

/// Read a variable from the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Read an optional variable; empty values count as unset
pub fn env_opt(name: &str) -> Option<String> {
    var_opt(process_env, name)
}

/// Read a variable, falling back to `default` when unset or empty
pub fn env_or(name: &str, default: &str) -> String {
    var_or(process_env, name, default)
}

/// Read and parse a variable, falling back to `default` when unset or empty
pub fn env_parse_or<T: FromStr>(name: &str, default: T) -> Result<T, EnvError> {
    var_parse_or(process_env, name, default)
}

/// Like [`env_opt`], reading from `lookup` instead of the process environment
pub fn var_opt(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.trim().is_empty())
}

/// Like [`env_or`], reading from `lookup`
pub fn var_or(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    var_opt(lookup, name).unwrap_or_else(|| default.to_string())
}

/// Like [`env_parse_or`], reading from `lookup`
pub fn var_parse_or<T: FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, EnvError> {
    match var_opt(lookup, name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| EnvError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
    }
}
