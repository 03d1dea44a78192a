//! Integration tests for catalog-dump
//!
//! These tests drive full dump runs against an in-memory triple store that
//! answers the pipeline's query shapes.

use catalog_dump::{
    config::{LedgerBackend, LedgerConfig},
    dump::{
        create_ledger, DumpError, DumpOrchestrator, DumpSettings, DumpState, FixedPortalResolver,
        LedgerError, LedgerStore, MemoryLedger, Portal, PortalResolver, StorePortalResolver,
        TitleLedgerEntry, UriPortalResolver,
    },
    query::{
        Bindings, QueryClient, QueryError, QueryResult, QueryTemplates, RetryPolicy,
        RetryingClient,
    },
    rdf::{
        vocab::{dcat, dct, rdf, xsd},
        Graph, Term, Triple,
    },
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const BASE: &str = "http://dump.example.org";
const PORTALS: &str = "http://portals.example.org/";

// ============================================================================
// In-memory triple store
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CountAnswer {
    #[default]
    Actual,
    /// Zero solutions
    NoAnswer,
    /// Every count query fails
    Fail,
}

#[derive(Debug, Clone)]
struct FakeDataset {
    title: String,
    portals: Vec<String>,
}

#[derive(Debug, Default)]
struct FakeStore {
    datasets: BTreeMap<String, FakeDataset>,
    count_answer: CountAnswer,
    /// Offset whose page comes back one identifier short
    short_page_at: Option<u64>,
    /// Dataset whose CONSTRUCT yields nothing
    empty_graph: Option<String>,
    /// Number of leading requests that fail
    transient_failures: AtomicU32,
    /// Every portal lookup fails
    portal_fails: bool,
    /// Every title count fails
    title_fails: bool,
    log: Mutex<Vec<&'static str>>,
}

impl FakeStore {
    fn with(datasets: Vec<(String, &str, Vec<&str>)>) -> Self {
        Self {
            datasets: datasets
                .into_iter()
                .map(|(id, title, portals)| {
                    (
                        id,
                        FakeDataset {
                            title: title.to_string(),
                            portals: portals.iter().map(|p| format!("{}{}", PORTALS, p)).collect(),
                        },
                    )
                })
                .collect(),
            ..Self::default()
        }
    }

    fn calls(&self, kind: &str) -> usize {
        self.log.lock().iter().filter(|k| **k == kind).count()
    }

    fn record(&self, kind: &'static str) -> QueryResult<()> {
        self.log.lock().push(kind);
        let left = self.transient_failures.load(Ordering::SeqCst);
        if left > 0 {
            self.transient_failures.store(left - 1, Ordering::SeqCst);
            return Err(QueryError::Status {
                status: 503,
                body: "busy".to_string(),
            });
        }
        Ok(())
    }
}

fn count_row(n: usize) -> Vec<Bindings> {
    let mut row = Bindings::new();
    row.insert("num".to_string(), Term::typed(n.to_string(), xsd::INT));
    vec![row]
}

fn iri_after(query: &str, marker: &str) -> String {
    let start = query.find(marker).map(|i| i + marker.len()).unwrap_or(0);
    query[start..].split('>').next().unwrap_or_default().to_string()
}

fn number_after(query: &str, marker: &str) -> u64 {
    let start = query.find(marker).map(|i| i + marker.len()).unwrap_or(0);
    query[start..]
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

impl QueryClient for FakeStore {
    fn select(&self, query: &str) -> QueryResult<Vec<Bindings>> {
        if query.contains("?portal dcat:dataset") {
            self.record("portal")?;
            if self.portal_fails {
                return Err(QueryError::Status {
                    status: 500,
                    body: "portal lookup failed".to_string(),
                });
            }
            let id = iri_after(query, "dcat:dataset <");
            let portals = self
                .datasets
                .get(&id)
                .map(|d| d.portals.clone())
                .unwrap_or_default();
            return Ok(portals
                .into_iter()
                .map(|p| {
                    let mut row = Bindings::new();
                    row.insert("portal".to_string(), Term::iri(p));
                    row
                })
                .collect());
        }

        if query.contains("dct:title \"") {
            self.record("title")?;
            if self.title_fails {
                return Err(QueryError::Status {
                    status: 500,
                    body: "title count failed".to_string(),
                });
            }
            let start = query.find("dct:title ").map(|i| i + "dct:title ".len()).unwrap_or(0);
            let literal = query[start..].split(" .\n").next().unwrap_or_default();
            let n = self
                .datasets
                .values()
                .filter(|d| Term::string(d.title.as_str()).to_string() == literal)
                .count();
            return Ok(count_row(n));
        }

        if query.contains("OFFSET") {
            self.record("page")?;
            let offset = number_after(query, "OFFSET ");
            let limit = number_after(query, "LIMIT ");
            let mut ids: Vec<Bindings> = self
                .datasets
                .keys()
                .skip(offset as usize)
                .take(limit as usize)
                .map(|id| {
                    let mut row = Bindings::new();
                    row.insert("dataSet".to_string(), Term::iri(id.as_str()));
                    row
                })
                .collect();
            if self.short_page_at == Some(offset) {
                ids.pop();
            }
            return Ok(ids);
        }

        self.record("count")?;
        match self.count_answer {
            CountAnswer::Actual => Ok(count_row(self.datasets.len())),
            CountAnswer::NoAnswer => Ok(Vec::new()),
            CountAnswer::Fail => Err(QueryError::Status {
                status: 500,
                body: "store down".to_string(),
            }),
        }
    }

    fn construct(&self, query: &str) -> QueryResult<Graph> {
        self.record("construct")?;
        let id = iri_after(query, "CONSTRUCT {\n  <");
        let Some(dataset) = self.datasets.get(&id) else {
            return Ok(Graph::new());
        };
        if self.empty_graph.as_deref() == Some(id.as_str()) {
            return Ok(Graph::new());
        }

        let subject = Term::iri(id.as_str());
        let dist = Term::BlankNode("dist".to_string());
        Ok(vec![
            Triple::new(subject.clone(), rdf::TYPE, Term::iri(dcat::DATASET)),
            Triple::new(subject.clone(), dct::TITLE, Term::string(dataset.title.as_str())),
            Triple::new(subject, dcat::DISTRIBUTION, dist.clone()),
            Triple::new(dist, "http://purl.org/dc/terms/format", Term::string("CSV")),
        ]
        .into_iter()
        .collect())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Ledger that records every operation
#[derive(Debug, Default)]
struct RecordingLedger {
    inner: MemoryLedger,
    ops: Mutex<Vec<String>>,
}

impl LedgerStore for RecordingLedger {
    fn clear_all(&self) -> Result<(), LedgerError> {
        self.ops.lock().push("clear".to_string());
        self.inner.clear_all()
    }

    fn find_by_key(
        &self,
        title: &str,
        portal: &str,
    ) -> Result<Option<TitleLedgerEntry>, LedgerError> {
        self.ops.lock().push(format!("find {} {}", title, portal));
        self.inner.find_by_key(title, portal)
    }

    fn save(&self, entry: TitleLedgerEntry) -> Result<(), LedgerError> {
        self.ops
            .lock()
            .push(format!("save {} {} {}", entry.title, entry.portal, entry.counter));
        self.inner.save(entry)
    }

    fn len(&self) -> Result<usize, LedgerError> {
        self.inner.len()
    }
}

/// Ledger whose writes always fail
#[derive(Debug, Default)]
struct ReadOnlyLedger {
    inner: MemoryLedger,
}

impl LedgerStore for ReadOnlyLedger {
    fn clear_all(&self) -> Result<(), LedgerError> {
        self.inner.clear_all()
    }

    fn find_by_key(
        &self,
        title: &str,
        portal: &str,
    ) -> Result<Option<TitleLedgerEntry>, LedgerError> {
        self.inner.find_by_key(title, portal)
    }

    fn save(&self, _entry: TitleLedgerEntry) -> Result<(), LedgerError> {
        Err(LedgerError::Io {
            path: PathBuf::from("/read-only/ledger.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn len(&self) -> Result<usize, LedgerError> {
        self.inner.len()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ds(n: u32) -> String {
    format!("http://data.example.org/ds/{}", n)
}

fn build(
    store: Arc<FakeStore>,
    resolver: Option<Arc<dyn PortalResolver>>,
    ledger: Arc<dyn LedgerStore>,
    out: &Path,
    page_size: u64,
) -> DumpOrchestrator {
    let templates = QueryTemplates::default();
    let client: Arc<dyn QueryClient> = Arc::new(RetryingClient::new(
        store,
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        },
    ));
    let resolver: Arc<dyn PortalResolver> = match resolver {
        Some(resolver) => resolver,
        None => Arc::new(StorePortalResolver::new(client.clone(), templates)),
    };
    DumpOrchestrator::new(
        client,
        templates,
        resolver,
        ledger,
        DumpSettings {
            page_size,
            output_dir: out.to_path_buf(),
            base_address: BASE.to_string(),
        },
    )
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

fn page_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

/// "A" shared by portalX and portalY, "B" unique, page size 2
fn scenario_store() -> FakeStore {
    FakeStore::with(vec![
        (ds(1), "A", vec!["portalX"]),
        (ds(2), "A", vec!["portalY"]),
        (ds(3), "B", vec!["portalX"]),
    ])
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_end_to_end_three_datasets_two_pages() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let store = Arc::new(scenario_store());
    let orchestrator = build(store, None, Arc::new(MemoryLedger::new()), &out, 2);

    assert_eq!(orchestrator.state(), DumpState::Idle);
    let report = orchestrator.run().unwrap();
    assert_eq!(orchestrator.state(), DumpState::Done);

    assert_eq!(report.total_items, 3);
    assert_eq!(report.datasets_written, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.pages, vec![out.join("model1.ttl"), out.join("model2.ttl")]);

    let generated: Vec<_> = report
        .assignments
        .iter()
        .map(|a| (a.dataset.clone(), a.generated_title.clone()))
        .collect();
    assert_eq!(
        generated,
        vec![
            (ds(1), "A (portalX_1)".to_string()),
            (ds(2), "A (portalY_1)".to_string()),
        ]
    );

    let page1 = read(out.join("model1.ttl"));
    assert!(page1.contains("dct:title \"A (portalX_1)\""));
    assert!(page1.contains("dct:title \"A (portalY_1)\""));
    assert!(!page1.contains("dct:title \"A\""));
    assert!(page1.contains("<http://portals.example.org/portalX> a dcat:Catalog"));
    assert!(page1.contains(&format!("dcat:dataset <{}>", ds(1))));

    let page2 = read(out.join("model2.ttl"));
    assert!(page2.contains("dct:title \"B\""));
    assert!(page2.contains(&format!("<{}>", ds(3))));
    assert!(!page2.contains(&format!("<{}>", ds(1))));
}

#[test]
fn test_pagination_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path();
    let orchestrator = build(
        Arc::new(scenario_store()),
        None,
        Arc::new(MemoryLedger::new()),
        out,
        2,
    );
    orchestrator.run().unwrap();

    let page1 = read(out.join("model1.ttl"));
    let page2 = read(out.join("model2.ttl"));

    assert!(page1.contains("<http://dump.example.org/model1.ttl> a hydra:PagedCollection"));
    assert!(page1.contains("hydra:firstPage <http://dump.example.org/model1.ttl>"));
    assert!(page1.contains("hydra:nextPage <http://dump.example.org/model2.ttl>"));
    assert!(!page2.contains("hydra:nextPage"));

    for page in [&page1, &page2] {
        assert!(page.contains("hydra:firstPage <http://dump.example.org/model1.ttl>"));
        assert!(page.contains("hydra:lastPage <http://dump.example.org/model2.ttl>"));
        assert!(page.contains("hydra:totalItems \"3\"^^xsd:long"));
        assert!(page.contains("hydra:itemsPerPage \"2\"^^xsd:int"));
    }
}

#[test]
fn test_blank_nodes_do_not_merge_across_datasets() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path();
    let orchestrator = build(
        Arc::new(scenario_store()),
        None,
        Arc::new(MemoryLedger::new()),
        out,
        2,
    );
    orchestrator.run().unwrap();

    let page1 = read(out.join("model1.ttl"));
    assert!(page1.contains("_:d0_dist"));
    assert!(page1.contains("_:d1_dist"));
}

// ============================================================================
// Disambiguation ledger
// ============================================================================

#[test]
fn test_ledger_cleared_before_counting_and_unique_titles_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let ledger = Arc::new(RecordingLedger::default());
    ledger
        .inner
        .save(TitleLedgerEntry {
            title: "A".into(),
            portal: "portalX".into(),
            counter: 7,
        })
        .unwrap();

    let orchestrator = build(
        Arc::new(scenario_store()),
        None,
        ledger.clone(),
        temp_dir.path(),
        2,
    );
    let report = orchestrator.run().unwrap();

    // A stale entry from an earlier run must not leak into this one
    assert_eq!(report.assignments[0].counter, 1);
    assert_eq!(
        *ledger.ops.lock(),
        vec![
            "clear",
            "find A portalX",
            "save A portalX 1",
            "find A portalY",
            "save A portalY 1",
        ]
    );
}

#[test]
fn test_counters_follow_identifier_order_within_portal() {
    let temp_dir = TempDir::new().unwrap();
    let store = FakeStore::with(vec![
        (ds(3), "Trees", vec![]),
        (ds(1), "Trees", vec![]),
        (ds(2), "Trees", vec![]),
        (ds(4), "Lakes", vec![]),
    ]);
    let resolver: Arc<dyn PortalResolver> = Arc::new(FixedPortalResolver::new(Portal::new(
        "http://portals.example.org/berlin",
        "berlin",
    )));
    let orchestrator = build(
        Arc::new(store),
        Some(resolver),
        Arc::new(MemoryLedger::new()),
        temp_dir.path(),
        3,
    );

    let report = orchestrator.run().unwrap();
    let counters: Vec<_> = report
        .assignments
        .iter()
        .map(|a| (a.dataset.clone(), a.counter))
        .collect();
    assert_eq!(counters, vec![(ds(1), 1), (ds(2), 2), (ds(3), 3)]);
    assert_eq!(report.pages.len(), 2);
    assert!(read(temp_dir.path().join("model2.ttl")).contains("dct:title \"Lakes\""));
}

#[test]
fn test_rerun_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path();
    let orchestrator = build(
        Arc::new(scenario_store()),
        None,
        Arc::new(MemoryLedger::new()),
        out,
        2,
    );

    let first = orchestrator.run().unwrap();
    let first_pages: Vec<String> = first.pages.iter().map(read).collect();
    let second = orchestrator.run().unwrap();
    let second_pages: Vec<String> = second.pages.iter().map(read).collect();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first_pages, second_pages);
}

#[test]
fn test_file_ledger_records_last_run() {
    let temp_dir = TempDir::new().unwrap();
    let ledger_path = temp_dir.path().join("state").join("ledger.json");
    let ledger = create_ledger(&LedgerConfig {
        backend: LedgerBackend::File,
        path: Some(ledger_path.clone()),
    })
    .unwrap();

    let orchestrator = build(
        Arc::new(scenario_store()),
        None,
        ledger,
        &temp_dir.path().join("dump"),
        2,
    );
    orchestrator.run().unwrap();

    let saved: serde_json::Value = serde_json::from_str(&read(&ledger_path)).unwrap();
    let entries = saved["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .all(|e| e["title"] == "A" && e["counter"] == 1));
}

// ============================================================================
// Portal resolution
// ============================================================================

#[test]
fn test_unresolvable_portal_skips_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path();
    let store = FakeStore::with(vec![
        (ds(1), "A", vec!["portalX"]),
        (ds(2), "A", vec!["portalX", "portalY"]),
        (ds(3), "C", vec![]),
    ]);
    let orchestrator = build(Arc::new(store), None, Arc::new(MemoryLedger::new()), out, 2);

    let report = orchestrator.run().unwrap();
    assert_eq!(report.skipped, vec![ds(2), ds(3)]);
    assert_eq!(report.datasets_written, 1);
    assert_eq!(report.pages.len(), 2);

    let page1 = read(out.join("model1.ttl"));
    assert!(page1.contains("dct:title \"A (portalX_1)\""));
    assert!(!page1.contains(&format!("<{}>", ds(2))));

    // Skipped datasets still count toward the collection total
    let page2 = read(out.join("model2.ttl"));
    assert!(page2.contains("hydra:totalItems \"3\"^^xsd:long"));
    assert!(!page2.contains(&format!("<{}>", ds(3))));
}

#[test]
fn test_uri_resolver_covers_every_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path();
    let store = FakeStore::with(vec![
        ("http://berlin.example.org/ds/1".to_string(), "Trees", vec![]),
        ("http://hamburg.example.org/ds/1".to_string(), "Trees", vec![]),
        ("urn:uuid:4711".to_string(), "Trees", vec![]),
    ]);
    let resolver: Arc<dyn PortalResolver> = Arc::new(UriPortalResolver::new(PORTALS));
    let orchestrator = build(
        Arc::new(store),
        Some(resolver),
        Arc::new(MemoryLedger::new()),
        out,
        10,
    );

    let report = orchestrator.run().unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(report.datasets_written, 3);

    let titles: Vec<_> = report
        .assignments
        .iter()
        .map(|a| a.generated_title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["Trees (berlin_1)", "Trees (hamburg_1)", "Trees (unknown_1)"]
    );
    assert!(read(out.join("model1.ttl"))
        .contains("<http://portals.example.org/unknown> a dcat:Catalog"));
}

// ============================================================================
// Failure handling
// ============================================================================

#[test]
fn test_count_failure_aborts_without_writing() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let mut store = scenario_store();
    store.count_answer = CountAnswer::Fail;
    let store = Arc::new(store);

    let orchestrator = build(store.clone(), None, Arc::new(MemoryLedger::new()), &out, 2);
    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, DumpError::BackendUnavailable(_)));
    assert_eq!(orchestrator.state(), DumpState::Aborted);
    assert_eq!(store.calls("count"), 3);
    assert_eq!(store.calls("page"), 0);
    assert!(page_files(&out).is_empty());
}

#[test]
fn test_count_without_answer_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let mut store = scenario_store();
    store.count_answer = CountAnswer::NoAnswer;
    let store = Arc::new(store);

    let orchestrator = build(store.clone(), None, Arc::new(MemoryLedger::new()), &out, 2);
    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, DumpError::BackendUnavailable(_)));
    // An empty answer is not retried
    assert_eq!(store.calls("count"), 1);
    assert!(page_files(&out).is_empty());
}

#[test]
fn test_transient_failures_are_retried() {
    let temp_dir = TempDir::new().unwrap();
    let store = scenario_store();
    store.transient_failures.store(2, Ordering::SeqCst);
    let store = Arc::new(store);

    let orchestrator = build(
        store.clone(),
        None,
        Arc::new(MemoryLedger::new()),
        temp_dir.path(),
        2,
    );
    let report = orchestrator.run().unwrap();

    assert_eq!(report.datasets_written, 3);
    assert_eq!(store.calls("count"), 3);
}

#[test]
fn test_short_page_is_integrity_error() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let mut store = FakeStore::with(vec![
        (ds(1), "A", vec!["portalX"]),
        (ds(2), "B", vec!["portalX"]),
        (ds(3), "C", vec!["portalX"]),
        (ds(4), "D", vec!["portalX"]),
        (ds(5), "E", vec!["portalX"]),
    ]);
    store.short_page_at = Some(2);

    let orchestrator = build(Arc::new(store), None, Arc::new(MemoryLedger::new()), &out, 2);
    let err = orchestrator.run().unwrap_err();

    match err {
        DumpError::PaginationIntegrity {
            offset,
            expected,
            actual,
        } => {
            assert_eq!((offset, expected, actual), (2, 2, 1));
        }
        other => panic!("expected PaginationIntegrity, got {:?}", other),
    }
    assert_eq!(orchestrator.state(), DumpState::Aborted);
    assert_eq!(page_files(&out), vec![out.join("model1.ttl")]);

    let page1 = read(out.join("model1.ttl"));
    assert!(page1.contains("hydra:nextPage <http://dump.example.org/model2.ttl>"));
    assert!(page1.contains("hydra:lastPage <http://dump.example.org/model3.ttl>"));
}

#[test]
fn test_empty_dataset_graph_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let mut store = scenario_store();
    store.empty_graph = Some(ds(3));

    let orchestrator = build(Arc::new(store), None, Arc::new(MemoryLedger::new()), &out, 2);
    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, DumpError::GraphFetch { ref dataset, .. } if *dataset == ds(3)));
    assert_eq!(page_files(&out), vec![out.join("model1.ttl")]);
}

#[test]
fn test_ledger_write_failure_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let orchestrator = build(
        Arc::new(scenario_store()),
        None,
        Arc::new(ReadOnlyLedger::default()),
        &out,
        2,
    );

    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, DumpError::Ledger(LedgerError::Io { .. })));
    assert_eq!(orchestrator.state(), DumpState::Aborted);
    assert!(page_files(&out).is_empty());
}

#[test]
fn test_portal_lookup_failure_aborts_instead_of_skipping() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let mut store = scenario_store();
    store.portal_fails = true;
    let store = Arc::new(store);

    let orchestrator = build(store.clone(), None, Arc::new(MemoryLedger::new()), &out, 2);
    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, DumpError::BackendUnavailable(_)));
    assert_eq!(orchestrator.state(), DumpState::Aborted);
    assert_eq!(store.calls("portal"), 3);
    assert_eq!(store.calls("construct"), 0);
    assert!(page_files(&out).is_empty());
}

#[test]
fn test_title_count_failure_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let mut store = scenario_store();
    store.title_fails = true;
    let store = Arc::new(store);

    let orchestrator = build(store.clone(), None, Arc::new(MemoryLedger::new()), &out, 2);
    let err = orchestrator.run().unwrap_err();

    assert!(matches!(err, DumpError::BackendUnavailable(_)));
    assert_eq!(orchestrator.state(), DumpState::Aborted);
    assert_eq!(store.calls("title"), 3);
    assert_eq!(store.calls("construct"), 1);
    assert!(page_files(&out).is_empty());
}

#[test]
fn test_empty_collection_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dump");
    let orchestrator = build(
        Arc::new(FakeStore::default()),
        None,
        Arc::new(MemoryLedger::new()),
        &out,
        2,
    );

    let report = orchestrator.run().unwrap();
    assert_eq!(report.total_items, 0);
    assert!(report.pages.is_empty());
    assert_eq!(orchestrator.state(), DumpState::Done);
}
