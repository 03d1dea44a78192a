//! Turtle serialization for page files
//!
//! Output is deterministic: prefixes in a fixed order, then one block per
//! subject in graph order, predicates in graph order.

use super::vocab::{self, rdf};
use super::{escape_iri, escape_literal, Graph, Term};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};

/// Serialize a graph as Turtle
pub fn write_turtle<W: Write>(graph: &Graph, out: &mut W) -> io::Result<()> {
    for (prefix, ns) in vocab::PREFIXES {
        writeln!(out, "@prefix {}: <{}> .", prefix, ns)?;
    }

    let labels = BlankLabels::for_graph(graph);
    let term = |t: &Term| render(t, &labels);

    let mut current: Option<&Term> = None;
    for triple in graph.iter() {
        if current == Some(&triple.subject) {
            write!(out, " ;\n    ")?;
        } else {
            if current.is_some() {
                writeln!(out, " .")?;
            }
            write!(out, "\n{} ", term(&triple.subject))?;
            current = Some(&triple.subject);
        }

        let predicate = if triple.predicate == rdf::TYPE {
            "a".to_string()
        } else {
            iri(&triple.predicate)
        };
        write!(out, "{} {}", predicate, term(&triple.object))?;
    }
    if current.is_some() {
        writeln!(out, " .")?;
    }
    Ok(())
}

/// Serialize a graph to a Turtle string
pub fn to_turtle_string(graph: &Graph) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_turtle(graph, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn render(t: &Term, labels: &BlankLabels) -> String {
    match t {
        Term::Iri(value) => iri(value),
        Term::BlankNode(label) => format!("_:{}", labels.get(label)),
        Term::Literal {
            value,
            datatype,
            language,
        } => {
            let quoted = format!("\"{}\"", escape_literal(value));
            match (language, datatype) {
                (Some(lang), _) => format!("{}@{}", quoted, lang),
                (None, Some(dt)) => format!("{}^^{}", quoted, iri(dt)),
                (None, None) => quoted,
            }
        }
    }
}

/// Prefixed name when the local part is simple, full IRI otherwise
fn iri(value: &str) -> String {
    for (prefix, ns) in vocab::PREFIXES {
        if let Some(local) = value.strip_prefix(ns) {
            if is_simple_local(local) {
                return format!("{}:{}", prefix, local);
            }
        }
    }
    format!("<{}>", escape_iri(value))
}

fn is_simple_local(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Output labels for the blank nodes of one graph
///
/// Labels that are valid Turtle are written unchanged. Any other label gets a
/// fresh `genid{n}` that no label in the graph already uses.
struct BlankLabels {
    renamed: BTreeMap<String, String>,
}

impl BlankLabels {
    fn for_graph(graph: &Graph) -> Self {
        let used: BTreeSet<&str> = graph
            .iter()
            .flat_map(|t| [&t.subject, &t.object])
            .filter_map(|t| match t {
                Term::BlankNode(label) => Some(label.as_str()),
                _ => None,
            })
            .collect();

        let mut renamed = BTreeMap::new();
        let mut next = 0usize;
        for label in used.iter().filter(|l| !is_valid_blank_label(l)) {
            let fresh = loop {
                let candidate = format!("genid{}", next);
                next += 1;
                if !used.contains(candidate.as_str()) {
                    break candidate;
                }
            };
            renamed.insert(label.to_string(), fresh);
        }
        Self { renamed }
    }

    fn get<'a>(&'a self, label: &'a str) -> &'a str {
        self.renamed.get(label).map(String::as_str).unwrap_or(label)
    }
}

/// `BLANK_NODE_LABEL` without the `_:` prefix
fn is_valid_blank_label(label: &str) -> bool {
    let mut chars = label.chars();
    match chars.next() {
        Some(c) if is_pn_chars_u(c) || c.is_ascii_digit() => {}
        _ => return false,
    }
    !label.ends_with('.') && chars.all(|c| is_pn_chars(c) || c == '.')
}

fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || c.is_ascii_digit()
        || matches!(c, '-' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}
