//! Dump run driver
//!
//! State machine: `Idle -> Counting -> Paging -> Done`, with `Aborted`
//! reachable from `Counting` and `Paging` on any fatal error. Nothing already
//! written is retracted when a run aborts.

use super::dedup::{TitleAssignment, TitleDeduplicator};
use super::enumerator::DatasetEnumerator;
use super::fetcher::GraphFetcher;
use super::ledger::{create_ledger, LedgerStore};
use super::page::{PageAssembler, PageLayout, PageWriter};
use super::portal::{create_resolver, PortalError, PortalResolver};
use super::{DatasetId, DumpError};
use crate::config::{Config, DumpConfig};
use crate::query::{HttpQueryClient, QueryClient, QueryTemplates, RetryingClient};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DumpState {
    Idle,
    Counting,
    Paging { page: u64 },
    Done,
    Aborted,
}

/// Pagination and output settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSettings {
    pub page_size: u64,
    pub output_dir: PathBuf,
    pub base_address: String,
}

impl From<&DumpConfig> for DumpSettings {
    fn from(config: &DumpConfig) -> Self {
        Self {
            page_size: config.page_size,
            output_dir: config.output_dir.clone(),
            base_address: config.base_address.clone(),
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Dataset count observed while counting
    pub total_items: u64,
    /// Page files in page order
    pub pages: Vec<PathBuf>,
    pub datasets_written: u64,
    /// Datasets dropped because no unique portal was found
    pub skipped: Vec<DatasetId>,
    /// Title rewrites in dump order
    pub assignments: Vec<TitleAssignment>,
}

impl DumpReport {
    fn new(run_id: Uuid, started_at: DateTime<Utc>, total_items: u64) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: started_at,
            total_items,
            pages: Vec::new(),
            datasets_written: 0,
            skipped: Vec::new(),
            assignments: Vec::new(),
        }
    }
}

/// Drives a dump run over injected components
#[derive(Debug)]
pub struct DumpOrchestrator {
    enumerator: DatasetEnumerator,
    fetcher: GraphFetcher,
    resolver: Arc<dyn PortalResolver>,
    dedup: TitleDeduplicator,
    writer: PageWriter,
    settings: DumpSettings,
    state: Mutex<DumpState>,
}

impl DumpOrchestrator {
    pub fn new(
        client: Arc<dyn QueryClient>,
        templates: QueryTemplates,
        resolver: Arc<dyn PortalResolver>,
        ledger: Arc<dyn LedgerStore>,
        settings: DumpSettings,
    ) -> Self {
        Self {
            enumerator: DatasetEnumerator::new(client.clone(), templates),
            fetcher: GraphFetcher::new(client.clone(), templates),
            resolver,
            dedup: TitleDeduplicator::new(client, templates, ledger),
            writer: PageWriter::new(settings.output_dir.clone()),
            settings,
            state: Mutex::new(DumpState::Idle),
        }
    }

    /// Wire the HTTP client, retry policy, resolver and ledger from `config`
    pub fn from_config(config: &Config) -> Result<Self, DumpError> {
        let http = HttpQueryClient::new(config.endpoint.to_http_config())
            .map_err(|e| DumpError::Config(format!("cannot build HTTP client: {}", e)))?;
        let client: Arc<dyn QueryClient> =
            Arc::new(RetryingClient::new(http, config.retry.to_policy()));
        let templates = QueryTemplates::new(config.endpoint.dialect);
        let resolver = create_resolver(&config.portal, client.clone(), templates);
        let ledger = create_ledger(&config.ledger)?;

        Ok(Self::new(
            client,
            templates,
            resolver,
            ledger,
            DumpSettings::from(&config.dump),
        ))
    }

    pub fn state(&self) -> DumpState {
        *self.state.lock()
    }

    pub fn settings(&self) -> &DumpSettings {
        &self.settings
    }

    fn set_state(&self, state: DumpState) {
        debug!("Dump state -> {:?}", state);
        *self.state.lock() = state;
    }

    /// Execute one full dump
    pub fn run(&self) -> Result<DumpReport, DumpError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Starting dump run {}", run_id);

        match self.execute(run_id, started_at) {
            Ok(mut report) => {
                report.finished_at = Utc::now();
                self.set_state(DumpState::Done);
                info!(
                    "Dump run {} finished: {} datasets in {} pages, {} skipped, {} titles disambiguated",
                    run_id,
                    report.datasets_written,
                    report.pages.len(),
                    report.skipped.len(),
                    report.assignments.len()
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(DumpState::Aborted);
                Err(e)
            }
        }
    }

    /// Run and log the outcome instead of returning an error
    pub fn run_and_log(&self) -> Option<DumpReport> {
        match self.run() {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Dump run aborted: {}", e);
                None
            }
        }
    }

    fn execute(&self, run_id: Uuid, started_at: DateTime<Utc>) -> Result<DumpReport, DumpError> {
        self.dedup.clear()?;

        self.set_state(DumpState::Counting);
        let total = self.enumerator.total_count()?;
        let layout = PageLayout::new(
            self.settings.page_size,
            total,
            self.settings.base_address.as_str(),
            self.settings.output_dir.as_path(),
        );
        info!(
            "Dumping {} datasets in {} pages of up to {}",
            total,
            layout.last_page(),
            layout.page_size()
        );

        let mut report = DumpReport::new(run_id, started_at, total);
        let mut offset = 0;
        while offset < total {
            let page = layout.page_number(offset);
            self.set_state(DumpState::Paging { page });
            self.dump_page(&layout, page, offset, &mut report)?;
            offset += layout.page_size();
        }

        Ok(report)
    }

    fn dump_page(
        &self,
        layout: &PageLayout,
        page: u64,
        offset: u64,
        report: &mut DumpReport,
    ) -> Result<(), DumpError> {
        let ids = self.enumerator.page(offset, layout.page_size())?;
        let expected = layout.expected_len(offset);
        if ids.len() as u64 != expected {
            return Err(DumpError::PaginationIntegrity {
                offset,
                expected,
                actual: ids.len() as u64,
            });
        }

        let mut assembler = PageAssembler::new(layout, page);
        for id in ids {
            let portal = match self.resolver.resolve(&id) {
                Ok(portal) => portal,
                Err(PortalError::NotResolved(reason)) => {
                    let skip = DumpError::PortalResolution {
                        dataset: id.clone(),
                        reason,
                    };
                    warn!("Skipping dataset: {}", skip);
                    report.skipped.push(id);
                    continue;
                }
                Err(PortalError::Backend(e)) => return Err(e.into()),
            };

            let mut dataset = self.fetcher.fetch(&id)?;
            if let Some(assignment) = self.dedup.process(&mut dataset, &portal)? {
                report.assignments.push(assignment);
            }
            debug!("Adding {} from portal {}", id, portal.name);
            assembler.add_dataset(&portal, dataset);
        }

        let datasets = assembler.datasets() as u64;
        let graph = assembler.finish();
        let path = self.writer.write(page, &graph)?;
        info!(
            "Wrote page {}/{} ({} datasets, {} triples) to {}",
            page,
            layout.last_page(),
            datasets,
            graph.len(),
            path.display()
        );

        report.datasets_written += datasets;
        report.pages.push(path);
        Ok(())
    }
}
