//! Per-dataset subgraph retrieval

use super::{DatasetId, DumpError};
use crate::query::{QueryClient, QueryTemplates};
use crate::rdf::vocab::dct;
use crate::rdf::{Graph, Term, Triple};
use std::sync::Arc;
use tracing::debug;

/// The statements describing one dataset, with one hop of expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetGraph {
    pub id: DatasetId,
    pub graph: Graph,
}

impl DatasetGraph {
    pub fn new(id: impl Into<DatasetId>, graph: Graph) -> Self {
        Self {
            id: id.into(),
            graph,
        }
    }

    fn subject(&self) -> Term {
        Term::iri(self.id.as_str())
    }

    /// The dataset's title literal, if any
    pub fn title(&self) -> Option<&Term> {
        let subject = self.subject();
        self.graph
            .iter()
            .find(|t| {
                t.subject == subject
                    && t.predicate == dct::TITLE
                    && t.object.literal_value().is_some()
            })
            .map(|t| &t.object)
    }

    /// Swap the title statement for a plain literal `new_title`
    pub fn replace_title(&mut self, new_title: &str) {
        let subject = self.subject();
        if let Some(old) = self.title().cloned() {
            self.graph.remove(&Triple::new(subject.clone(), dct::TITLE, old));
        }
        self.graph.add(subject, dct::TITLE, Term::string(new_title));
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

/// Fetches dataset subgraphs with a CONSTRUCT query
#[derive(Debug, Clone)]
pub struct GraphFetcher {
    client: Arc<dyn QueryClient>,
    templates: QueryTemplates,
}

impl GraphFetcher {
    pub fn new(client: Arc<dyn QueryClient>, templates: QueryTemplates) -> Self {
        Self { client, templates }
    }

    /// Fetch the subgraph of `id`
    ///
    /// An empty result is an error: every enumerated dataset has a title.
    pub fn fetch(&self, id: &str) -> Result<DatasetGraph, DumpError> {
        let query = self.templates.construct_dataset(id);
        let graph = self
            .client
            .construct(&query)
            .map_err(|e| DumpError::GraphFetch {
                dataset: id.to_string(),
                reason: e.to_string(),
            })?;

        if graph.is_empty() {
            return Err(DumpError::GraphFetch {
                dataset: id.to_string(),
                reason: "construct query returned no triples".to_string(),
            });
        }

        debug!("Fetched {} triples for {}", graph.len(), id);
        Ok(DatasetGraph::new(id, graph))
    }
}
