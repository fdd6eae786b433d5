//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file)
//! and fall back to defaults that talk to the public PokeAPI. Binaries may
//! override individual fields from command-line flags.

use anyhow::{Context, Result};
use std::str::FromStr;

use crate::models::TYPE_UNIVERSE;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_LIST_LIMIT: usize = 1000;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Catalog base URL, without trailing slash
    pub base_url: String,
    /// `limit` passed to the bulk list endpoint
    pub list_limit: usize,
    /// Names per browse page; 0 disables pagination
    pub page_size: usize,
    /// Coverage denominator
    pub type_universe: usize,
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            list_limit: DEFAULT_LIST_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            type_universe: TYPE_UNIVERSE,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `POKEAPI_BASE_URL` -- catalog base URL
    /// - `TEAM_BUILDER_LIST_LIMIT` -- bulk list size (default 1000)
    /// - `TEAM_BUILDER_PAGE_SIZE` -- browse page size (default 20, 0 = no paging)
    /// - `TEAM_BUILDER_TYPE_UNIVERSE` -- coverage denominator (default 18)
    /// - `TEAM_BUILDER_BIND` -- server bind address (default `0.0.0.0:3000`)
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let base_url = lookup("POKEAPI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        Ok(Config {
            base_url,
            list_limit: parse_var(&lookup, "TEAM_BUILDER_LIST_LIMIT", defaults.list_limit)?,
            page_size: parse_var(&lookup, "TEAM_BUILDER_PAGE_SIZE", defaults.page_size)?,
            type_universe: parse_var(&lookup, "TEAM_BUILDER_TYPE_UNIVERSE", defaults.type_universe)?,
            bind_addr: lookup("TEAM_BUILDER_BIND").unwrap_or(defaults.bind_addr),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.type_universe, 18);
        assert_eq!(config.list_limit, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("POKEAPI_BASE_URL", "http://localhost:8080/api/v2/"),
            ("TEAM_BUILDER_PAGE_SIZE", "0"),
            ("TEAM_BUILDER_TYPE_UNIVERSE", "19"),
            ("TEAM_BUILDER_BIND", "127.0.0.1:4000"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/api/v2");
        assert_eq!(config.page_size, 0);
        assert_eq!(config.type_universe, 19);
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("TEAM_BUILDER_LIST_LIMIT", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("TEAM_BUILDER_LIST_LIMIT"));
    }
}
