//! Triple store endpoint and retry configuration

use crate::query::{HttpQueryConfig, QueryDialect, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_url() -> String {
    "http://localhost:8890/sparql".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_delay() -> u64 {
    1000
}

/// SPARQL endpoint configuration
///
/// ```toml
/// [endpoint]
/// url = "http://localhost:8890/sparql"
/// username = "dba"
/// password = "secret"
/// dialect = "named_graph"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Query endpoint URL
    #[serde(default = "default_url")]
    pub url: String,
    /// HTTP basic auth user
    #[serde(default)]
    pub username: Option<String>,
    /// HTTP basic auth password
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Whether datasets live in named graphs
    #[serde(default)]
    pub dialect: QueryDialect,
    /// Pause before every request, in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            timeout_secs: default_timeout(),
            dialect: QueryDialect::default(),
            request_delay_ms: 0,
        }
    }
}

impl EndpointConfig {
    /// Client settings for `HttpQueryClient`
    pub fn to_http_config(&self) -> HttpQueryConfig {
        HttpQueryConfig {
            endpoint: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            request_delay: Duration::from_millis(self.request_delay_ms),
        }
    }
}

/// Retry behaviour for store queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per query, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}
