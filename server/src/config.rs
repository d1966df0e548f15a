//! Process configuration, read from the environment.
//!
//! | Variable         | Default     |
//! |------------------|-------------|
//! | `TODO_HOST`      | `127.0.0.1` |
//! | `TODO_PORT`      | `8000`      |
//! | `TODO_DATA_PATH` | unset: todos are kept in memory only |
//!
//! Log filtering is controlled separately through `RUST_LOG`.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// JSON document holding the collection.
    pub data_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let port = match get("TODO_PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "TODO_PORT",
                value,
            })?,
            None => defaults.port,
        };

        Ok(Self {
            host: get("TODO_HOST").unwrap_or(defaults.host),
            port,
            data_path: get("TODO_DATA_PATH").map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::from_lookup(lookup(&[
            ("TODO_HOST", "0.0.0.0"),
            ("TODO_PORT", "9090"),
            ("TODO_DATA_PATH", "/var/lib/todo/todos.json"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9090");
        assert_eq!(
            config.data_path,
            Some(PathBuf::from("/var/lib/todo/todos.json"))
        );
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[("TODO_PORT", ""), ("TODO_DATA_PATH", " ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let err = Config::from_lookup(lookup(&[("TODO_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid value for TODO_PORT: `eighty`");
    }
}
