//! Title disambiguation
//!
//! A title is repetitive when more than one dataset in the whole store carries
//! the same title literal. Each dataset with a repetitive title gets
//! `"<title> (<portal>_<n>)"`, where `n` counts occurrences of that title
//! within the portal in dump order.

use super::fetcher::DatasetGraph;
use super::ledger::{LedgerStore, TitleLedgerEntry};
use super::portal::Portal;
use super::{DatasetId, DumpError};
use crate::query::templates::COUNT_VAR;
use crate::query::{QueryClient, QueryTemplates};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::trace;

/// A title rewritten during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleAssignment {
    pub dataset: DatasetId,
    /// Original title text
    pub title: String,
    /// Portal short name
    pub portal: String,
    pub counter: u64,
    pub generated_title: String,
}

/// Build the disambiguated title text
pub fn disambiguated_title(title: &str, portal: &str, counter: u64) -> String {
    format!("{} ({}_{})", title, portal, counter)
}

#[derive(Debug, Clone)]
pub struct TitleDeduplicator {
    client: Arc<dyn QueryClient>,
    templates: QueryTemplates,
    ledger: Arc<dyn LedgerStore>,
}

impl TitleDeduplicator {
    pub fn new(
        client: Arc<dyn QueryClient>,
        templates: QueryTemplates,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            client,
            templates,
            ledger,
        }
    }

    /// Forget all counters. Called once before the first page of a run.
    pub fn clear(&self) -> Result<(), DumpError> {
        self.ledger.clear_all()?;
        Ok(())
    }

    /// Rewrite the title of `dataset` if it is repetitive
    ///
    /// Returns the assignment made, or `None` when the title is unique and the
    /// graph was left untouched.
    pub fn process(
        &self,
        dataset: &mut DatasetGraph,
        portal: &Portal,
    ) -> Result<Option<TitleAssignment>, DumpError> {
        let title = dataset.title().cloned().ok_or_else(|| DumpError::GraphFetch {
            dataset: dataset.id.clone(),
            reason: "fetched graph has no title".to_string(),
        })?;

        let occurrences = self
            .client
            .count(&self.templates.count_title(&title), COUNT_VAR)?
            .unwrap_or(0);
        if occurrences <= 1 {
            return Ok(None);
        }

        let text = title.literal_value().unwrap_or_default().to_string();
        let entry = match self.ledger.find_by_key(&text, &portal.name)? {
            Some(mut entry) => {
                entry.counter += 1;
                entry
            }
            None => TitleLedgerEntry::first(text.as_str(), portal.name.as_str()),
        };
        let counter = entry.counter;
        self.ledger.save(entry)?;

        let generated_title = disambiguated_title(&text, &portal.name, counter);
        trace!(
            "Title {:?} shared by {} datasets; {} becomes {:?}",
            text, occurrences, dataset.id, generated_title
        );
        dataset.replace_title(&generated_title);

        Ok(Some(TitleAssignment {
            dataset: dataset.id.clone(),
            title: text,
            portal: portal.name.clone(),
            counter,
            generated_title,
        }))
    }
}
