//! Service Configuration
//!
//! Defaults, then an optional JSON file at `CONFIG_PATH`, then
//! `ALERT_INTAKE_*` environment variables. The API key has no default and
//! must come from the deployment.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Deserialize;

use crate::IntakeError;

/// Path of an optional JSON config file
pub const ENV_CONFIG_PATH: &str = "CONFIG_PATH";
/// Shared secret expected in `x-api-key`
pub const ENV_API_KEY: &str = "ALERT_INTAKE_API_KEY";
/// Listen address, e.g. `0.0.0.0:8080`
pub const ENV_BIND_ADDR: &str = "ALERT_INTAKE_BIND_ADDR";
/// Request body cap in bytes
pub const ENV_MAX_BODY_BYTES: &str = "ALERT_INTAKE_MAX_BODY_BYTES";
/// `text` or `json`
pub const ENV_LOG_FORMAT: &str = "ALERT_INTAKE_LOG_FORMAT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(IntakeError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Intake service configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Shared secret for `x-api-key`
    pub api_key: Option<String>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_key: None,
            max_body_bytes: 1024 * 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl fmt::Debug for IntakeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntakeConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl IntakeConfig {
    /// Load from file
    pub fn load(path: &str) -> Result<Self, IntakeError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| IntakeError::Config(format!("{path}: {e}")))
    }

    /// Build from the process environment
    pub fn from_env() -> Result<Self, IntakeError> {
        let base = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => Self::load(&path)?,
            Err(_) => Self::default(),
        };

        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.api_key()?;
        Ok(config)
    }

    /// Apply `ALERT_INTAKE_*` overrides from `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, IntakeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = Some(key);
        }

        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            self.bind_addr = addr
                .parse()
                .map_err(|e| IntakeError::Config(format!("{ENV_BIND_ADDR}={addr}: {e}")))?;
        }

        if let Some(limit) = lookup(ENV_MAX_BODY_BYTES) {
            self.max_body_bytes = limit
                .parse()
                .map_err(|e| IntakeError::Config(format!("{ENV_MAX_BODY_BYTES}={limit}: {e}")))?;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse()?;
        }

        Ok(self)
    }

    /// The configured API key; absent or blank is a configuration error
    pub fn api_key(&self) -> Result<&str, IntakeError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(IntakeError::Config(format!("{ENV_API_KEY} must be set"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = IntakeConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.api_key().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = IntakeConfig::default()
            .with_overrides(lookup(&[
                (ENV_API_KEY, "s3cret"),
                (ENV_BIND_ADDR, "127.0.0.1:9000"),
                (ENV_MAX_BODY_BYTES, "4096"),
                (ENV_LOG_FORMAT, "JSON"),
            ]))
            .unwrap();

        assert_eq!(config.api_key().unwrap(), "s3cret");
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_body_bytes, 4096);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_bad_overrides() {
        let bad_addr = IntakeConfig::default().with_overrides(lookup(&[(ENV_BIND_ADDR, "nowhere")]));
        assert!(matches!(bad_addr, Err(IntakeError::Config(_))));

        let bad_format = IntakeConfig::default().with_overrides(lookup(&[(ENV_LOG_FORMAT, "xml")]));
        assert!(matches!(bad_format, Err(IntakeError::Config(_))));
    }

    #[test]
    fn test_blank_api_key_rejected() {
        let config = IntakeConfig::default()
            .with_overrides(lookup(&[(ENV_API_KEY, "   ")]))
            .unwrap();
        assert!(config.api_key().is_err());
    }

    #[test]
    fn test_partial_json_file() {
        let config: IntakeConfig =
            serde_json::from_str(r#"{"bind_addr": "127.0.0.1:8443", "log_format": "json"}"#).unwrap();
        assert_eq!(config.bind_addr.port(), 8443);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.max_body_bytes, IntakeConfig::default().max_body_bytes);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = IntakeConfig {
            api_key: Some("do-not-print".into()),
            ..IntakeConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("do-not-print"));
        assert!(debug.contains("<redacted>"));
    }
}
