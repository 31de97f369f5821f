//! Configuration loading from environment variables
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file with [`load_dotenv`].

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::discovery::{
    DEFAULT_EXTENSIONS, DEFAULT_INDEX_NAMES, Discovery, NamingFilter, PathDeriver,
};

/// Load environment variables from a `.env` file if it exists.
///
/// Call this at the start of your application before accessing config.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Get a required environment variable.
pub fn get_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

/// Get an optional environment variable with a default value.
pub fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get and parse a required environment variable.
pub fn get_env_parsed<T: FromStr>(key: &str) -> Result<T, ConfigError> {
    let value = get_env(key)?;
    parse(key, value)
}

/// Get and parse an environment variable, using `default` when it is unset.
///
/// A value that is set but does not parse is an error, not the default.
pub fn get_env_parsed_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => parse(key, value),
        Err(_) => Ok(default),
    }
}

/// Get a comma separated list, using `default` when the variable is unset.
///
/// Items are trimmed and empty items dropped.
pub fn get_env_list_or(key: &str, default: &[&str]) -> Vec<String> {
    match env::var(key) {
        Ok(value) => value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        Err(_) => default.iter().map(|item| item.to_string()).collect(),
    }
}

fn parse<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value,
    })
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable '{0}'")]
    Missing(String),
    #[error("Invalid value '{value}' for environment variable '{key}' (failed to parse as expected type)")]
    Invalid { key: String, value: String },
}

/// Route discovery settings read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `WAYPOST_ROUTES_DIR` | `src/routes` |
/// | `WAYPOST_ROUTE_EXTENSIONS` | `rs` |
/// | `WAYPOST_INDEX_NAMES` | `index,mod` |
/// | `WAYPOST_HOT_RELOAD` | `false` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub routes_dir: PathBuf,
    pub extensions: Vec<String>,
    pub index_names: Vec<String>,
    pub hot_reload: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("src/routes"),
            extensions: DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            index_names: DEFAULT_INDEX_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            hot_reload: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let extensions: Vec<&str> = defaults.extensions.iter().map(String::as_str).collect();
        let index_names: Vec<&str> = defaults.index_names.iter().map(String::as_str).collect();

        Ok(Self {
            routes_dir: get_env_parsed_or("WAYPOST_ROUTES_DIR", defaults.routes_dir.clone())?,
            extensions: get_env_list_or("WAYPOST_ROUTE_EXTENSIONS", &extensions),
            index_names: get_env_list_or("WAYPOST_INDEX_NAMES", &index_names),
            hot_reload: get_env_parsed_or("WAYPOST_HOT_RELOAD", defaults.hot_reload)?,
        })
    }

    /// Builds the discovery pass these settings describe.
    pub fn discovery(&self) -> Discovery {
        Discovery::new(&self.routes_dir)
            .filter(NamingFilter::with_extensions(&self.extensions))
            .deriver(PathDeriver::with_index_names(&self.index_names))
    }
}
