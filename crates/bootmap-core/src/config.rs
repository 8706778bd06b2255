// Copyright 2025 The Bootmap Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for bootmap.

use serde::{Deserialize, Serialize};

/// Main configuration for a bootmap deployment.
///
/// The embedding service loads this at startup and hands the relevant
/// sections to the engine and the script renderer. Every section has full
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Assignment store configuration.
    pub store: StoreConfig,
    /// Boot-script rendering configuration.
    pub script: ScriptConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(crate::Error::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string cannot be parsed.
    pub fn parse(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }
}

/// Assignment store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of hosts accepted in a single create/update request.
    /// Oversized requests fail fast with `InvalidArgument`.
    /// Set to 0 for unlimited.
    pub max_hosts_per_request: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_hosts_per_request: 4096 }
    }
}

/// Boot-script rendering configuration.
///
/// Rendered scripts chain back to the service through a gateway; these
/// settings control how the re-entry URL is built and how long a failed boot
/// waits before retrying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Host name of the gateway that chained script requests target.
    pub ipxe_server: String,
    /// Scheme used for chained requests.
    pub chain_proto: String,
    /// Gateway URI prefix for the boot-script endpoint.
    pub gateway_uri: String,
    /// Seconds a failed boot sleeps before chaining to a retry.
    pub retry_delay_secs: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            ipxe_server: "boot-gw.local".to_string(),
            chain_proto: "https".to_string(),
            gateway_uri: "/apis/bootmap".to_string(),
            retry_delay_secs: 30,
        }
    }
}

impl ScriptConfig {
    /// Builds the chain URL a rendered script re-enters through.
    ///
    /// `query` is appended verbatim (e.g. `bootscript?host=n1`).
    #[must_use]
    pub fn chain_url(&self, query: &str) -> String {
        format!("{}://{}{}/{}", self.chain_proto, self.ipxe_server, self.gateway_uri, query)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. `info`, `bootmap_engine=debug`).
    pub level: String,
    /// Log output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_valid() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.store.max_hosts_per_request, 4096);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [store]
            max_hosts_per_request = 16

            [script]
            ipxe_server = "gw.example.net"
            retry_delay_secs = 5

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.max_hosts_per_request, 16);
        assert_eq!(config.script.ipxe_server, "gw.example.net");
        assert_eq!(config.script.chain_proto, "https");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_chain_url() {
        let script = ScriptConfig::default();
        assert_eq!(
            script.chain_url("bootscript?host=n1"),
            "https://boot-gw.local/apis/bootmap/bootscript?host=n1"
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::parse("store = 3").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }
}
