//! Process configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `HOOKLOG_DATABASE` | `hooklog.db` | SQLite file; `:memory:` keeps events in process memory |
//! | `HOST` | `0.0.0.0` | Bind address |
//! | `PORT` | `5000` | Bind port |
//! | `DEBUG` | `true` | `true` (any case) lowers the default log level to debug |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | Enables OTLP span export to this endpoint |
//!
//! `RUST_LOG`, when set, overrides the default log filter entirely.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DATABASE_VAR: &str = "HOOKLOG_DATABASE";
pub const HOST_VAR: &str = "HOST";
pub const PORT_VAR: &str = "PORT";
pub const DEBUG_VAR: &str = "DEBUG";
pub const LOG_FORMAT_VAR: &str = "LOG_FORMAT";
pub const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const DEFAULT_DATABASE: &str = "hooklog.db";
const MEMORY_DATABASE: &str = ":memory:";
const DEFAULT_PORT: u16 = 5000;

/// Crates whose events are raised to `debug` when debug logging is on.
///
/// The binary's tracing target is its bin name, `hooklog`, not the package name.
const WORKSPACE_TARGETS: &[&str] = &["hooklog", "events", "store", "listener", "tower_http"];

/// The configuration is invalid. Fatal at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value '{value}' for {key}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Where events are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseLocation,
    pub bind: SocketAddr,
    pub debug: bool,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unparseable host, port, or log format.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database = match lookup(DATABASE_VAR).filter(|v| !v.trim().is_empty()) {
            Some(v) if v == MEMORY_DATABASE => DatabaseLocation::Memory,
            Some(v) => DatabaseLocation::File(PathBuf::from(v)),
            None => DatabaseLocation::File(PathBuf::from(DEFAULT_DATABASE)),
        };

        let host = match lookup(HOST_VAR) {
            Some(raw) => raw.trim().parse::<IpAddr>().map_err(|e| ConfigError {
                key: HOST_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match lookup(PORT_VAR) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError {
                key: PORT_VAR,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let debug = lookup(DEBUG_VAR).map_or(true, |v| v.trim().eq_ignore_ascii_case("true"));

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError {
                        key: LOG_FORMAT_VAR,
                        value: raw,
                        reason: "expected 'text' or 'json'".to_string(),
                    })
                }
            },
            None => LogFormat::Text,
        };

        let otlp_endpoint = lookup(OTLP_ENDPOINT_VAR).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database,
            bind: SocketAddr::new(host, port),
            debug,
            log_format,
            otlp_endpoint,
        })
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> String {
        if !self.debug {
            return "info".to_string();
        }
        let mut directives: Vec<String> = WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{target}=debug"))
            .collect();
        directives.push("info".to_string());
        directives.join(",")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
