//! catalog-dump: paginated Linked Data dump of a DCAT triple store
//!
//! Reads every titled `dcat:Dataset` from a SPARQL endpoint and writes the
//! collection as Hydra-paginated Turtle files, featuring:
//! - Stable, identifier-ordered enumeration with page integrity checks
//! - Bounded retry around every store query
//! - Per-portal disambiguation of titles shared across the store
//! - Pluggable portal resolution (store lookup, URI host, fixed portal)
//! - On-demand and scheduled runs

pub mod config;
pub mod dump;
pub mod query;
pub mod rdf;
pub mod schedule;
pub mod util;

pub use config::Config;
pub use dump::{DumpError, DumpOrchestrator, DumpReport};
