//! N-Triples reader for CONSTRUCT responses

use super::vocab::xsd;
use super::{Graph, Term, Triple};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("N-Triples syntax error: {message}")]
pub struct NTriplesError {
    pub message: String,
}

/// Parse an N-Triples document into a graph
///
/// `"v"^^xsd:string` literals are normalized to plain literals. Blank node
/// labels are kept as written.
pub fn parse(input: &str) -> Result<Graph, NTriplesError> {
    let mut graph = Graph::new();
    for triple in oxttl::NTriplesParser::new().for_reader(input.as_bytes()) {
        let triple = triple.map_err(|e| NTriplesError {
            message: e.to_string(),
        })?;
        graph.insert(convert(triple));
    }
    Ok(graph)
}

fn convert(triple: oxrdf::Triple) -> Triple {
    let subject = match triple.subject {
        oxrdf::Subject::NamedNode(node) => Term::Iri(node.into_string()),
        oxrdf::Subject::BlankNode(node) => Term::BlankNode(node.as_str().to_string()),
    };
    let object = match triple.object {
        oxrdf::Term::NamedNode(node) => Term::Iri(node.into_string()),
        oxrdf::Term::BlankNode(node) => Term::BlankNode(node.as_str().to_string()),
        oxrdf::Term::Literal(literal) => literal_term(literal),
    };
    Triple::new(subject, triple.predicate.into_string(), object)
}

fn literal_term(literal: oxrdf::Literal) -> Term {
    if let Some(lang) = literal.language() {
        return Term::Literal {
            value: literal.value().to_string(),
            datatype: None,
            language: Some(lang.to_string()),
        };
    }
    let datatype = literal.datatype().as_str();
    if datatype == xsd::STRING {
        Term::string(literal.value())
    } else {
        Term::typed(literal.value(), datatype)
    }
}
