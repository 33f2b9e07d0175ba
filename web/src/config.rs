//! Runtime configuration read from the environment.
//!
//! `main` loads a `.env` file first (via `dotenvy`), so every key below may
//! also live there.

use std::time::Duration;

use thiserror::Error;
use todo_core::DEFAULT_TABLE;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the backing store, e.g. `https://xyz.supabase.co`.
    pub store_url: String,
    pub api_key: Option<String>,
    pub table: String,
    pub timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_url = get("STORE_URL").ok_or(ConfigError::Missing("STORE_URL"))?;
        let port = match get("PORT") {
            Some(raw) => parse(&raw, "PORT")?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match get("STORE_TIMEOUT_SECS") {
            Some(raw) => parse(&raw, "STORE_TIMEOUT_SECS")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            store_url,
            api_key: get("STORE_API_KEY"),
            table: get("TODO_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            host: get("BIND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<N: std::str::FromStr>(raw: &str, key: &'static str) -> Result<N, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[("STORE_URL", "http://localhost:54321")]).unwrap();
        assert_eq!(cfg.table, "todos");
        assert_eq!(cfg.api_key, None);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("STORE_URL", "https://example.supabase.co"),
            ("STORE_API_KEY", "anon"),
            ("TODO_TABLE", "chores"),
            ("STORE_TIMEOUT_SECS", "5"),
            ("BIND_HOST", "0.0.0.0"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("anon"));
        assert_eq!(cfg.table, "chores");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn store_url_is_required() {
        assert_eq!(config(&[]), Err(ConfigError::Missing("STORE_URL")));
        assert_eq!(
            config(&[("STORE_URL", "  ")]),
            Err(ConfigError::Missing("STORE_URL"))
        );
    }

    #[test]
    fn bad_port() {
        let err = config(&[("STORE_URL", "http://x"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
    }
}
