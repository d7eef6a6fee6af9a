//! Process configuration, read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `SUPPLYFLOW_BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `RUST_LOG`, else `SUPPLYFLOW_LOG_LEVEL`.
    pub log_filter: String,
    /// `SUPPLYFLOW_LOG_JSON`
    pub log_json: bool,
    /// `SUPPLYFLOW_TRANSITION_RETRIES`: extra attempts after a stale-version
    /// conflict on a status transition.
    pub transition_retries: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_filter: "info".to_string(),
            log_json: true,
            transition_retries: 3,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("SUPPLYFLOW_BIND_ADDR") {
            config.bind_addr = parse("SUPPLYFLOW_BIND_ADDR", &value)?;
        }
        if let Some(value) = get("RUST_LOG").or_else(|| get("SUPPLYFLOW_LOG_LEVEL")) {
            config.log_filter = value;
        }
        if let Some(value) = get("SUPPLYFLOW_LOG_JSON") {
            config.log_json = parse_bool("SUPPLYFLOW_LOG_JSON", &value)?;
        }
        if let Some(value) = get("SUPPLYFLOW_TRANSITION_RETRIES") {
            config.transition_retries = parse("SUPPLYFLOW_TRANSITION_RETRIES", &value)?;
        }

        Ok(config)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
