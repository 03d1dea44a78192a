//! Failure kinds of a dump run

use super::ledger::LedgerError;
use crate::query::QueryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end (or, for portal resolution, skip part of) a dump run
#[derive(Debug, Error)]
pub enum DumpError {
    /// Query endpoint unreachable after retries, or unable to answer the count
    #[error("triple store unavailable: {0}")]
    BackendUnavailable(String),

    /// A dataset's subgraph could not be constructed
    #[error("failed to fetch graph of {dataset}: {reason}")]
    GraphFetch { dataset: String, reason: String },

    /// A page returned an identifier count inconsistent with the total
    #[error(
        "page at offset {offset} returned {actual} datasets, expected {expected} \
         (collection changed during the run?)"
    )]
    PaginationIntegrity {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    /// The owning portal of a dataset could not be determined
    #[error("no unique portal for {dataset}: {reason}")]
    PortalResolution { dataset: String, reason: String },

    /// Disambiguation ledger failed
    #[error("title ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The pipeline could not be built from configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Writing a page file failed
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DumpError {
    /// Whether this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DumpError::PortalResolution { .. })
    }
}

impl From<QueryError> for DumpError {
    fn from(e: QueryError) -> Self {
        DumpError::BackendUnavailable(e.to_string())
    }
}
