//! Page assembly and serialization
//!
//! Each page becomes one Turtle file holding the page's dataset graphs, the
//! catalog statements linking them to their portals, and a Hydra
//! `PagedCollection` resource describing the page's place in the dump.

use super::fetcher::DatasetGraph;
use super::portal::Portal;
use super::DumpError;
use crate::rdf::vocab::{dcat, hydra, rdf, xsd};
use crate::rdf::{turtle, Graph, Term};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Page ordinals, file names and addresses for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    page_size: u64,
    total: u64,
    base_address: String,
    output_dir: PathBuf,
}

impl PageLayout {
    pub fn new(
        page_size: u64,
        total: u64,
        base_address: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            page_size: page_size.max(1),
            total,
            base_address: base_address.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ordinal of the final page: ceil(total / page_size), at least 1
    pub fn last_page(&self) -> u64 {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// 1-based ordinal of the page starting at `offset`
    pub fn page_number(&self, offset: u64) -> u64 {
        offset / self.page_size + 1
    }

    /// Number of identifiers the page at `offset` must contain
    pub fn expected_len(&self, offset: u64) -> u64 {
        self.page_size.min(self.total.saturating_sub(offset))
    }

    pub fn file_name(page: u64) -> String {
        format!("model{}.ttl", page)
    }

    pub fn address(&self, page: u64) -> String {
        format!(
            "{}/{}",
            self.base_address.trim_end_matches('/'),
            Self::file_name(page)
        )
    }

    pub fn path(&self, page: u64) -> PathBuf {
        self.output_dir.join(Self::file_name(page))
    }
}

/// Accumulates one page's triples
#[derive(Debug)]
pub struct PageAssembler<'a> {
    layout: &'a PageLayout,
    page: u64,
    graph: Graph,
    datasets: usize,
}

impl<'a> PageAssembler<'a> {
    pub fn new(layout: &'a PageLayout, page: u64) -> Self {
        Self {
            layout,
            page,
            graph: Graph::new(),
            datasets: 0,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// Number of datasets added so far
    pub fn datasets(&self) -> usize {
        self.datasets
    }

    /// Add a dataset graph and its catalog statements
    ///
    /// Blank node labels are prefixed with the dataset's position in the page
    /// so nodes from different datasets stay distinct.
    pub fn add_dataset(&mut self, portal: &Portal, dataset: DatasetGraph) {
        let scope = self.datasets;
        let id = dataset.id.clone();
        let graph = dataset
            .into_graph()
            .map_blank_nodes(|label| format!("d{}_{}", scope, label));

        let catalog = Term::iri(portal.iri.as_str());
        self.graph.add(catalog.clone(), rdf::TYPE, Term::iri(dcat::CATALOG));
        self.graph.extend(graph);
        self.graph.add(catalog, dcat::DATASET_PROP, Term::iri(id));
        self.datasets += 1;
    }

    /// Attach pagination metadata and return the page graph
    pub fn finish(mut self) -> Graph {
        let layout = self.layout;
        let this_page = Term::iri(layout.address(self.page));

        self.graph
            .add(this_page.clone(), rdf::TYPE, Term::iri(hydra::PAGED_COLLECTION));
        self.graph
            .add(this_page.clone(), hydra::FIRST_PAGE, Term::iri(layout.address(1)));
        if self.page < layout.last_page() {
            self.graph.add(
                this_page.clone(),
                hydra::NEXT_PAGE,
                Term::iri(layout.address(self.page + 1)),
            );
        }
        self.graph.add(
            this_page.clone(),
            hydra::LAST_PAGE,
            Term::iri(layout.address(layout.last_page())),
        );
        self.graph.add(
            this_page.clone(),
            hydra::ITEMS_PER_PAGE,
            Term::typed(layout.page_size().to_string(), xsd::INT),
        );
        self.graph.add(
            this_page,
            hydra::TOTAL_ITEMS,
            Term::typed(layout.total().to_string(), xsd::LONG),
        );
        self.graph
    }
}

/// Writes page graphs as Turtle files
#[derive(Debug, Clone)]
pub struct PageWriter {
    output_dir: PathBuf,
}

impl PageWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Serialize `graph` to `model{page}.ttl`, returning the file path
    pub fn write(&self, page: u64, graph: &Graph) -> Result<PathBuf, DumpError> {
        let path = self.output_dir.join(PageLayout::file_name(page));
        let io_err = |source| DumpError::Io {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.output_dir).map_err(|source| DumpError::Io {
            path: self.output_dir.clone(),
            source,
        })?;
        let file = File::create(&path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        turtle::write_turtle(graph, &mut out).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        debug!("Wrote {} triples to {}", graph.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab::dct;
    use crate::rdf::Triple;
    use tempfile::TempDir;

    fn layout(page_size: u64, total: u64) -> PageLayout {
        PageLayout::new(page_size, total, "http://dump.example.org/", "/tmp/unused")
    }

    #[test]
    fn last_page_rounds_up() {
        assert_eq!(layout(2, 3).last_page(), 2);
        assert_eq!(layout(2, 4).last_page(), 2);
        assert_eq!(layout(5000, 1).last_page(), 1);
        assert_eq!(layout(10, 0).last_page(), 1);
    }

    #[test]
    fn expected_len_covers_remainder() {
        let l = layout(2, 5);
        assert_eq!(l.expected_len(0), 2);
        assert_eq!(l.expected_len(2), 2);
        assert_eq!(l.expected_len(4), 1);
        assert_eq!(l.page_number(4), 3);
    }

    #[test]
    fn addresses_use_base_and_ordinal() {
        let l = layout(2, 3);
        assert_eq!(l.address(2), "http://dump.example.org/model2.ttl");
        assert_eq!(PageLayout::file_name(7), "model7.ttl");
    }

    fn dataset(id: &str, bnode: &str) -> DatasetGraph {
        let graph: Graph = vec![
            Triple::new(Term::iri(id), dct::TITLE, Term::string("T")),
            Triple::new(
                Term::iri(id),
                dcat::DISTRIBUTION,
                Term::BlankNode(bnode.to_string()),
            ),
        ]
        .into_iter()
        .collect();
        DatasetGraph::new(id, graph)
    }

    #[test]
    fn blank_nodes_are_scoped_per_dataset() {
        let l = layout(2, 2);
        let mut page = PageAssembler::new(&l, 1);
        let portal = Portal::new("http://ex.org/p/x", "x");
        page.add_dataset(&portal, dataset("http://ex.org/ds/1", "b0"));
        page.add_dataset(&portal, dataset("http://ex.org/ds/2", "b0"));
        let graph = page.finish();

        let bnodes: Vec<_> = graph
            .iter()
            .filter_map(|t| match &t.object {
                Term::BlankNode(label) => Some(label.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(bnodes.len(), 2);
        assert_ne!(bnodes[0], bnodes[1]);

        let catalog = Term::iri("http://ex.org/p/x");
        assert_eq!(graph.objects(&catalog, dcat::DATASET_PROP).count(), 2);
        assert_eq!(graph.objects(&catalog, rdf::TYPE).count(), 1);
    }

    #[test]
    fn last_page_has_no_next() {
        let l = layout(2, 3);
        let first = PageAssembler::new(&l, 1).finish();
        let last = PageAssembler::new(&l, 2).finish();

        let p1 = Term::iri(l.address(1));
        let p2 = Term::iri(l.address(2));
        assert_eq!(
            first.objects(&p1, hydra::NEXT_PAGE).collect::<Vec<_>>(),
            vec![&p2]
        );
        assert_eq!(first.objects(&p1, hydra::FIRST_PAGE).next(), Some(&p1));
        assert_eq!(last.objects(&p2, hydra::NEXT_PAGE).count(), 0);
        assert_eq!(last.objects(&p2, hydra::LAST_PAGE).next(), Some(&p2));
        assert_eq!(
            last.objects(&p2, hydra::TOTAL_ITEMS).next(),
            Some(&Term::typed("3", xsd::LONG))
        );
    }

    #[test]
    fn writer_creates_output_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("dump");
        let writer = PageWriter::new(&out);

        let l = PageLayout::new(1, 1, "http://dump.example.org", &out);
        let path = writer.write(1, &PageAssembler::new(&l, 1).finish()).unwrap();

        assert_eq!(path, out.join("model1.ttl"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("hydra:PagedCollection"));
    }
}
