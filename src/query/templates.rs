//! Query shapes used by the dump
//!
//! Named-graph stores keep each harvested catalog in its own graph, so every
//! pattern is wrapped in `GRAPH ?g { ... }`. Flat stores use the bare pattern.

use crate::rdf::vocab;
use crate::rdf::Term;
use serde::{Deserialize, Serialize};

/// How the store lays out its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryDialect {
    /// Patterns are wrapped in a `GRAPH ?g` block
    #[default]
    NamedGraph,
    /// Patterns match the default graph
    Flat,
}

/// Variable bound by the count queries
pub const COUNT_VAR: &str = "num";
/// Variable bound by the dataset listing query
pub const DATASET_VAR: &str = "dataSet";
/// Variable bound by the portal lookup query
pub const PORTAL_VAR: &str = "portal";

/// Builds query text for one dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTemplates {
    dialect: QueryDialect,
}

impl QueryTemplates {
    pub fn new(dialect: QueryDialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> QueryDialect {
        self.dialect
    }

    /// Number of distinct typed datasets that have a title
    pub fn count_datasets(&self) -> String {
        format!(
            "{}SELECT (COUNT(DISTINCT ?{v}) AS ?{n})\nWHERE {{\n{}}}\n",
            prologue(),
            self.wrap(&typed_and_titled()),
            v = DATASET_VAR,
            n = COUNT_VAR,
        )
    }

    /// One page of dataset identifiers, ascending
    pub fn list_datasets(&self, offset: u64, limit: u64) -> String {
        format!(
            "{}SELECT DISTINCT ?{v}\nWHERE {{\n{}}}\nORDER BY ?{v}\nOFFSET {}\nLIMIT {}\n",
            prologue(),
            self.wrap(&typed_and_titled()),
            offset,
            limit,
            v = DATASET_VAR,
        )
    }

    /// The dataset's statements plus one optional hop from each object
    pub fn construct_dataset(&self, dataset: &str) -> String {
        let subject = sparql_iri(dataset);
        format!(
            "{}CONSTRUCT {{\n  {s} ?predicate ?object .\n  ?object ?p2 ?o2 .\n}}\nWHERE {{\n{}}}\n",
            prologue(),
            self.wrap(&format!(
                "    {subject} ?predicate ?object .\n    OPTIONAL {{ ?object ?p2 ?o2 }}\n"
            )),
            s = subject,
        )
    }

    /// Number of distinct datasets, anywhere in the store, carrying `title`
    pub fn count_title(&self, title: &Term) -> String {
        format!(
            "{}SELECT (COUNT(DISTINCT ?{v}) AS ?{n})\nWHERE {{\n{}}}\n",
            prologue(),
            self.wrap(&format!("    ?{} dct:title {} .\n", DATASET_VAR, title)),
            v = DATASET_VAR,
            n = COUNT_VAR,
        )
    }

    /// Catalogs that aggregate `dataset`
    pub fn select_portal(&self, dataset: &str) -> String {
        format!(
            "{}SELECT DISTINCT ?{p}\nWHERE {{\n{}}}\n",
            prologue(),
            self.wrap(&format!("    ?{} dcat:dataset {} .\n", PORTAL_VAR, sparql_iri(dataset))),
            p = PORTAL_VAR,
        )
    }

    fn wrap(&self, pattern: &str) -> String {
        match self.dialect {
            QueryDialect::NamedGraph => format!("  GRAPH ?g {{\n{}  }}\n", pattern),
            QueryDialect::Flat => pattern.to_string(),
        }
    }
}

fn prologue() -> String {
    vocab::PREFIXES
        .iter()
        .filter(|(prefix, _)| matches!(*prefix, "dcat" | "dct"))
        .map(|(prefix, ns)| format!("PREFIX {}: <{}>\n", prefix, ns))
        .collect()
}

fn typed_and_titled() -> String {
    format!(
        "    ?{v} a dcat:Dataset .\n    FILTER(EXISTS {{ ?{v} dct:title ?title . }})\n",
        v = DATASET_VAR
    )
}

/// IRI reference with characters illegal in SPARQL IRIs percent-encoded
fn sparql_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len() + 2);
    out.push('<');
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                out.push_str(&format!("%{:02X}", c as u32))
            }
            c if (c as u32) <= 0x20 => out.push_str(&format!("%{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('>');
    out
}
