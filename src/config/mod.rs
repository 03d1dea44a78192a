//! Configuration for catalog-dump

mod dump;
mod endpoint;
mod logging;

pub use dump::{DumpConfig, LedgerBackend, LedgerConfig, PortalConfig, ScheduleConfig};
pub use endpoint::{EndpointConfig, RetryConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Triple store endpoint
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Query retry policy
    #[serde(default)]
    pub retry: RetryConfig,
    /// Output pagination
    #[serde(default)]
    pub dump: DumpConfig,
    /// Portal resolution strategy
    #[serde(default)]
    pub portal: PortalConfig,
    /// Title ledger storage
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Periodic trigger
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Endpoint
        match Url::parse(&self.endpoint.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "endpoint url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(e) => errors.push(format!(
                "endpoint url '{}' is invalid: {}",
                self.endpoint.url, e
            )),
        }
        if self.endpoint.password.is_some() && self.endpoint.username.is_none() {
            errors.push("endpoint password given without username".to_string());
        }

        // Retry
        if self.retry.max_attempts == 0 {
            errors.push("retry max_attempts must be positive".to_string());
        }

        // Dump
        if self.dump.page_size == 0 {
            errors.push("page_size must be positive".to_string());
        }
        if self.dump.base_address.trim().is_empty() {
            errors.push("base_address must not be empty".to_string());
        }
        if self.dump.output_dir.as_os_str().is_empty() {
            errors.push("output_dir must not be empty".to_string());
        }

        // Portal
        match &self.portal {
            PortalConfig::Store => {}
            PortalConfig::Uri { namespace } => {
                if namespace.trim().is_empty() {
                    errors.push("uri portal resolver requires a namespace".to_string());
                }
            }
            PortalConfig::Fixed { iri, name } => {
                if iri.trim().is_empty() || name.trim().is_empty() {
                    errors.push("fixed portal resolver requires iri and name".to_string());
                }
            }
        }

        // Ledger
        if self.ledger.backend == LedgerBackend::File && self.ledger.path.is_none() {
            errors.push("file ledger requires a path".to_string());
        }

        // Schedule
        if self.schedule.interval_secs == 0 {
            errors.push("schedule interval_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
