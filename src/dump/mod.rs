//! Paginated dump of the dataset collection
//!
//! A run clears the title ledger, counts the datasets, then walks them page by
//! page: resolve the portal, fetch the subgraph, disambiguate the title,
//! assemble the page and write it as Turtle.

pub mod dedup;
pub mod enumerator;
pub mod error;
pub mod fetcher;
pub mod ledger;
pub mod orchestrator;
pub mod page;
pub mod portal;

pub use dedup::{TitleAssignment, TitleDeduplicator};
pub use enumerator::DatasetEnumerator;
pub use error::DumpError;
pub use fetcher::{DatasetGraph, GraphFetcher};
pub use ledger::{
    create_ledger, FileLedger, LedgerError, LedgerStore, MemoryLedger, TitleLedgerEntry,
};
pub use orchestrator::{DumpOrchestrator, DumpReport, DumpSettings, DumpState};
pub use page::{PageAssembler, PageLayout, PageWriter};
pub use portal::{
    create_resolver, FixedPortalResolver, Portal, PortalError, PortalResolver,
    StorePortalResolver, UriPortalResolver,
};

/// Dataset identifier (the dataset's IRI)
pub type DatasetId = String;
