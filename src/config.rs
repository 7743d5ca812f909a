use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::RecordId;
use crate::error::ConfigError;

pub const API_BASE: &str = "URBANZEST_API_BASE";
pub const BACKEND: &str = "URBANZEST_BACKEND";
pub const CART_ID: &str = "URBANZEST_CART_ID";
pub const TRACKING_TICK_SECS: &str = "URBANZEST_TRACKING_TICK_SECS";
pub const SESSION_FILE: &str = "URBANZEST_SESSION_FILE";

/// Where the collections live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The mock REST server.
    Http,
    /// In-process actors seeded with the built-in menu.
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Backend::Http),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("expected `http` or `memory`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub backend: Backend,
    pub cart_id: RecordId,
    pub tracking_tick: Duration,
    pub session_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let tick_secs: u64 = try_load(&lookup, TRACKING_TICK_SECS, "5")?;
        if tick_secs == 0 {
            return Err(ConfigError::Invalid {
                key: TRACKING_TICK_SECS,
                value: tick_secs.to_string(),
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            api_base: try_load::<String, _>(&lookup, API_BASE, "http://localhost:3001")?
                .trim_end_matches('/')
                .to_string(),
            backend: try_load(&lookup, BACKEND, "http")?,
            cart_id: RecordId::new(try_load::<String, _>(&lookup, CART_ID, "1")?),
            tracking_tick: Duration::from_secs(tick_secs),
            session_file: lookup(SESSION_FILE)
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        }
    })
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
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_mock_server() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base, "http://localhost:3001");
        assert_eq!(config.backend, Backend::Http);
        assert_eq!(config.cart_id, RecordId::from("1"));
        assert_eq!(config.tracking_tick, Duration::from_secs(5));
        assert!(config.session_file.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            (API_BASE, "http://mock:4000/"),
            (BACKEND, "Memory"),
            (CART_ID, "7"),
            (TRACKING_TICK_SECS, "1"),
            (SESSION_FILE, "/tmp/session.json"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://mock:4000");
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.cart_id, RecordId::from(7u64));
        assert_eq!(config.tracking_tick, Duration::from_secs(1));
        assert_eq!(config.session_file, Some(PathBuf::from("/tmp/session.json")));
    }

    #[test]
    fn bad_values_are_errors_not_panics() {
        let err = Config::from_lookup(lookup(&[(TRACKING_TICK_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: TRACKING_TICK_SECS, .. }));
        assert!(Config::from_lookup(lookup(&[(TRACKING_TICK_SECS, "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[(BACKEND, "ftp")])).is_err());
    }
}
