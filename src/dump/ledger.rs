//! Title disambiguation ledger
//!
//! Records, per (title, portal) pair, how many datasets of that portal have
//! received a disambiguated title during the current run. The ledger is
//! cleared at the start of every run.

use crate::config::{LedgerBackend, LedgerConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Counter record for one repetitive title within one portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleLedgerEntry {
    /// Original title text
    pub title: String,
    /// Portal short name
    pub portal: String,
    /// Number of disambiguations handed out so far, at least 1
    pub counter: u64,
}

impl TitleLedgerEntry {
    /// First occurrence of `title` in `portal`
    pub fn first(title: impl Into<String>, portal: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            portal: portal.into(),
            counter: 1,
        }
    }

    fn key(&self) -> (String, String) {
        (self.title.clone(), self.portal.clone())
    }
}

/// Ledger storage failures
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger file {path} is corrupt: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed store of ledger entries
pub trait LedgerStore: Send + Sync + Debug {
    /// Remove every entry
    fn clear_all(&self) -> Result<(), LedgerError>;

    /// Entry for (`title`, `portal`), if one exists
    fn find_by_key(&self, title: &str, portal: &str)
        -> Result<Option<TitleLedgerEntry>, LedgerError>;

    /// Insert or overwrite the entry with the same key
    fn save(&self, entry: TitleLedgerEntry) -> Result<(), LedgerError>;

    /// Number of entries
    fn len(&self) -> Result<usize, LedgerError>;

    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}

type Entries = BTreeMap<(String, String), TitleLedgerEntry>;

/// In-process ledger
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Entries>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedger {
    fn clear_all(&self) -> Result<(), LedgerError> {
        self.entries.lock().clear();
        Ok(())
    }

    fn find_by_key(
        &self,
        title: &str,
        portal: &str,
    ) -> Result<Option<TitleLedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .lock()
            .get(&(title.to_string(), portal.to_string()))
            .cloned())
    }

    fn save(&self, entry: TitleLedgerEntry) -> Result<(), LedgerError> {
        self.entries.lock().insert(entry.key(), entry);
        Ok(())
    }

    fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.entries.lock().len())
    }
}

/// On-disk layout of the ledger file
#[derive(Debug, Serialize, Deserialize)]
struct SavedLedger {
    entries: Vec<TitleLedgerEntry>,
    version: u32,
}

/// JSON-file ledger, rewritten after every mutation
///
/// Lets an operator inspect the assignments of the last run.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileLedger {
    /// Open the ledger at `path`, loading existing entries
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let mut entries = Entries::new();

        if path.exists() {
            let data = std::fs::read_to_string(&path).map_err(|source| LedgerError::Io {
                path: path.clone(),
                source,
            })?;
            let saved: SavedLedger =
                serde_json::from_str(&data).map_err(|source| LedgerError::Json {
                    path: path.clone(),
                    source,
                })?;
            for entry in saved.entries {
                entries.insert(entry.key(), entry);
            }
            info!("Loaded title ledger with {} entries", entries.len());
        }

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Entries) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let saved = SavedLedger {
            entries: entries.values().cloned().collect(),
            version: 1,
        };
        let data = serde_json::to_string_pretty(&saved).map_err(|source| LedgerError::Json {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, data).map_err(|source| LedgerError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!("Saved title ledger with {} entries", saved.entries.len());
        Ok(())
    }
}

impl LedgerStore for FileLedger {
    fn clear_all(&self) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock();
        entries.clear();
        self.persist(&entries)
    }

    fn find_by_key(
        &self,
        title: &str,
        portal: &str,
    ) -> Result<Option<TitleLedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .lock()
            .get(&(title.to_string(), portal.to_string()))
            .cloned())
    }

    fn save(&self, entry: TitleLedgerEntry) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock();
        entries.insert(entry.key(), entry);
        self.persist(&entries)
    }

    fn len(&self) -> Result<usize, LedgerError> {
        Ok(self.entries.lock().len())
    }
}

/// Create the configured ledger
pub fn create_ledger(config: &LedgerConfig) -> Result<Arc<dyn LedgerStore>, LedgerError> {
    match (config.backend, config.path.as_ref()) {
        (LedgerBackend::File, Some(path)) => {
            info!("Using file ledger at {}", path.display());
            Ok(Arc::new(FileLedger::open(path)?))
        }
        (LedgerBackend::File, None) => Err(LedgerError::Io {
            path: PathBuf::new(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "file ledger requires a path",
            ),
        }),
        (LedgerBackend::Memory, _) => Ok(Arc::new(MemoryLedger::new())),
    }
}
