//! Dataset enumeration: total count and ordered pages of identifiers

use super::{DatasetId, DumpError};
use crate::query::templates::{COUNT_VAR, DATASET_VAR};
use crate::query::{QueryClient, QueryTemplates};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lists typed, titled datasets in ascending identifier order.
///
/// The count query and every page query share one filter and one ordering,
/// so page boundaries are stable within a run.
#[derive(Debug, Clone)]
pub struct DatasetEnumerator {
    client: Arc<dyn QueryClient>,
    templates: QueryTemplates,
}

impl DatasetEnumerator {
    pub fn new(client: Arc<dyn QueryClient>, templates: QueryTemplates) -> Self {
        Self { client, templates }
    }

    /// Number of datasets to dump
    ///
    /// Fails with `BackendUnavailable` when the store cannot answer.
    pub fn total_count(&self) -> Result<u64, DumpError> {
        let query = self.templates.count_datasets();
        match self.client.count(&query, COUNT_VAR)? {
            Some(total) => {
                debug!("Store reports {} datasets", total);
                Ok(total)
            }
            None => Err(DumpError::BackendUnavailable(
                "dataset count query returned no solution".to_string(),
            )),
        }
    }

    /// Dataset identifiers `[offset, offset + limit)` in ascending order
    pub fn page(&self, offset: u64, limit: u64) -> Result<Vec<DatasetId>, DumpError> {
        let query = self.templates.list_datasets(offset, limit);
        let rows = self.client.select(&query)?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            match row.get(DATASET_VAR).and_then(|t| t.as_iri()) {
                Some(iri) => ids.push(iri.to_string()),
                None => warn!("Ignoring non-IRI dataset binding: {:?}", row.get(DATASET_VAR)),
            }
        }
        debug!("Page at offset {} has {} datasets", offset, ids.len());
        Ok(ids)
    }
}
