//! SPARQL 1.1 Query Results JSON format

use super::{Bindings, QueryError, QueryResult};
use crate::rdf::vocab::xsd;
use crate::rdf::Term;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    results: ResultsBlock,
}

#[derive(Debug, Deserialize)]
struct ResultsBlock {
    bindings: Vec<HashMap<String, JsonTerm>>,
}

#[derive(Debug, Deserialize)]
struct JsonTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(rename = "xml:lang", default)]
    lang: Option<String>,
    #[serde(default)]
    datatype: Option<String>,
}

impl JsonTerm {
    fn into_term(self) -> QueryResult<Term> {
        match self.kind.as_str() {
            "uri" => Ok(Term::Iri(self.value)),
            "bnode" => Ok(Term::BlankNode(self.value)),
            // "typed-literal" is emitted by older Virtuoso releases
            "literal" | "typed-literal" => Ok(Term::Literal {
                value: self.value,
                datatype: self.datatype.filter(|dt| dt != xsd::STRING),
                language: self.lang,
            }),
            other => Err(QueryError::Malformed(format!("unknown term type '{}'", other))),
        }
    }
}

/// Parse a `application/sparql-results+json` body
pub fn parse_select_json(body: &str) -> QueryResult<Vec<Bindings>> {
    let doc: ResultsDocument = serde_json::from_str(body)
        .map_err(|e| QueryError::Malformed(format!("invalid SPARQL JSON results: {}", e)))?;

    doc.results
        .bindings
        .into_iter()
        .map(|solution| {
            solution
                .into_iter()
                .map(|(var, term)| term.into_term().map(|t| (var, t)))
                .collect::<QueryResult<Bindings>>()
        })
        .collect()
}
