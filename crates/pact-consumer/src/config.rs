//! Environment-driven configuration.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Directory contracts are written to.
pub const PACT_DIR_ENV: &str = "PACT_DIR";
/// Base URL of the external mock server.
pub const MOCK_SERVER_URL_ENV: &str = "PACT_MOCK_SERVER_URL";
/// Per-stage timeout in seconds.
pub const TIMEOUT_ENV: &str = "PACT_TIMEOUT_SECS";

pub const DEFAULT_PACT_DIR: &str = "/tmp/pacts";
pub const DEFAULT_MOCK_SERVER_URL: &str = "http://127.0.0.1:1234";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct PactConfig {
    pub pact_dir: PathBuf,
    pub mock_server_url: String,
    pub timeout: Duration,
}

impl Default for PactConfig {
    fn default() -> Self {
        Self {
            pact_dir: PathBuf::from(DEFAULT_PACT_DIR),
            mock_server_url: DEFAULT_MOCK_SERVER_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PactConfig {
    /// Read configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = non_empty(lookup(PACT_DIR_ENV)) {
            config.pact_dir = PathBuf::from(dir);
        }

        if let Some(url) = non_empty(lookup(MOCK_SERVER_URL_ENV)) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    name: MOCK_SERVER_URL_ENV,
                    value: url,
                    reason: "must start with http:// or https://".to_string(),
                });
            }
            config.mock_server_url = url.trim_end_matches('/').to_string();
        }

        if let Some(secs) = non_empty(lookup(TIMEOUT_ENV)) {
            let parsed: u64 = secs.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    name: TIMEOUT_ENV,
                    value: secs.clone(),
                    reason: e.to_string(),
                }
            })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidValue {
                    name: TIMEOUT_ENV,
                    value: secs,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_secs(parsed);
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PactConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PactConfig::default());
        assert_eq!(config.pact_dir, PathBuf::from("/tmp/pacts"));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = PactConfig::from_lookup(lookup(&[
            (PACT_DIR_ENV, "/work/pacts"),
            (MOCK_SERVER_URL_ENV, "http://localhost:9292/"),
            (TIMEOUT_ENV, "30"),
        ]))
        .unwrap();
        assert_eq!(config.pact_dir, PathBuf::from("/work/pacts"));
        assert_eq!(config.mock_server_url, "http://localhost:9292");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = PactConfig::from_lookup(lookup(&[(PACT_DIR_ENV, "  ")])).unwrap();
        assert_eq!(config.pact_dir, PathBuf::from(DEFAULT_PACT_DIR));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = PactConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: TIMEOUT_ENV, .. }));

        let err = PactConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_invalid_url() {
        let err =
            PactConfig::from_lookup(lookup(&[(MOCK_SERVER_URL_ENV, "localhost:1234")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: MOCK_SERVER_URL_ENV,
                ..
            }
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_pact_dir() {
        std::env::set_var(PACT_DIR_ENV, "/var/tmp/contracts");
        let config = PactConfig::from_env();
        std::env::remove_var(PACT_DIR_ENV);
        assert_eq!(
            config.unwrap().pact_dir,
            PathBuf::from("/var/tmp/contracts")
        );
    }
}
