//! Dump, portal, ledger and schedule configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_page_size() -> u64 {
    5000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dump")
}

fn default_base_address() -> String {
    "http://localhost:8080/dump".to_string()
}

fn default_interval() -> u64 {
    86_400
}

fn default_true() -> bool {
    true
}

/// Output pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpConfig {
    /// Datasets per page file
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Directory receiving `model{N}.ttl`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Public address the pages are served under
    #[serde(default = "default_base_address")]
    pub base_address: String,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            output_dir: default_output_dir(),
            base_address: default_base_address(),
        }
    }
}

/// How the owning portal of a dataset is determined
///
/// ```toml
/// [portal]
/// resolver = "uri"
/// namespace = "http://projekt-opal.de/portal/"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "resolver", rename_all = "lowercase")]
pub enum PortalConfig {
    /// Ask the store for the catalog linking to the dataset
    #[default]
    Store,
    /// Derive the portal from the dataset URI's host
    Uri {
        /// Prefix for the generated catalog IRI
        namespace: String,
    },
    /// Every dataset belongs to one portal
    Fixed { iri: String, name: String },
}

/// Ledger storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Memory,
    File,
}

/// Title ledger configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub backend: LedgerBackend,
    /// JSON file for the `file` backend
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Periodic trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between run starts
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Run immediately instead of waiting one interval
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            run_on_start: true,
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
