//! XGMML graph export for Cytoscape.
//!
//! Nodes are the terms the reduction kept; edges connect the most similar
//! pairs among them.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use revigo_core::defaults::GRAPH_EDGE_FRACTION;
use revigo_core::{AspectResult, Error, Ontology, Result, TermProperties};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const XGMML_NAMESPACE: &str = "http://www.cs.rpi.edu/XGMML";

#[derive(Debug, Serialize)]
#[serde(rename = "graph")]
struct Graph {
    #[serde(rename = "@label")]
    label: String,
    #[serde(rename = "@directed")]
    directed: u8,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    node: Vec<Node>,
    edge: Vec<Edge>,
}

#[derive(Debug, Serialize)]
struct Node {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(rename = "@label")]
    label: String,
    att: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct Edge {
    #[serde(rename = "@source")]
    source: u32,
    #[serde(rename = "@target")]
    target: u32,
    #[serde(rename = "@label")]
    label: String,
    att: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct Attribute {
    #[serde(rename = "@name")]
    name: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@value")]
    value: String,
}

impl Attribute {
    fn real(name: &'static str, value: f64) -> Self {
        Self {
            name,
            kind: "real",
            value: value.to_string(),
        }
    }

    fn string(name: &'static str, value: &str) -> Self {
        Self {
            name,
            kind: "string",
            value: value.to_string(),
        }
    }
}

/// Write the aspect's graph as an XGMML document.
pub fn write_xgmml<W: Write>(writer: &mut W, ontology: &Ontology, aspect: &AspectResult) -> Result<()> {
    let retained: Vec<&TermProperties> = aspect
        .terms
        .iter()
        .filter(|t| t.is_representative())
        .collect();
    if retained.is_empty() {
        return Ok(());
    }

    let nodes = retained
        .iter()
        .map(|t| {
            let name = ontology.term(t.term_id).map(|g| g.name.as_str()).unwrap_or("");
            Node {
                id: t.term_id.0,
                label: t.term_id.to_string(),
                att: vec![
                    Attribute::string("description", name),
                    Attribute::real("value", t.value),
                    Attribute::real("log_size", t.log_annotation_size),
                    Attribute::real("frequency", t.annotation_frequency * 100.0),
                    Attribute::real("uniqueness", t.uniqueness),
                ],
            }
        })
        .collect();

    let edges: Vec<Edge> = strongest_pairs(aspect, &retained)
        .into_iter()
        .map(|(a, b, similarity)| Edge {
            source: a.term_id.0,
            target: b.term_id.0,
            label: format!("{} (similar to) {}", a.term_id, b.term_id),
            att: vec![Attribute::real("similarity", similarity)],
        })
        .collect();

    debug!(
        aspect = aspect.aspect.code(),
        nodes = retained.len(),
        edges = edges.len(),
        "XGMML graph built"
    );

    let graph = Graph {
        label: format!("Revigo {}", aspect.aspect.code()),
        directed: 0,
        xmlns: XGMML_NAMESPACE,
        node: nodes,
        edge: edges,
    };
    let body = quick_xml::se::to_string(&graph).map_err(|e| Error::Export(e.to_string()))?;
    writeln!(writer, "{}", XML_DECLARATION)?;
    writeln!(writer, "{}", body)?;
    Ok(())
}

/// The top [`GRAPH_EDGE_FRACTION`] of pairs by similarity, at least one.
fn strongest_pairs<'a>(
    aspect: &AspectResult,
    nodes: &[&'a TermProperties],
) -> Vec<(&'a TermProperties, &'a TermProperties, f64)> {
    let mut pairs = Vec::new();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            if let Some(similarity) = aspect.similarity.between(a.term_id, b.term_id) {
                pairs.push((*a, *b, similarity));
            }
        }
    }
    if pairs.is_empty() {
        return pairs;
    }
    let keep = ((pairs.len() as f64 * GRAPH_EDGE_FRACTION).ceil() as usize).max(1);
    pairs.sort_by(|x, y| {
        y.2.total_cmp(&x.2)
            .then_with(|| x.0.term_id.cmp(&y.0.term_id))
            .then_with(|| x.1.term_id.cmp(&y.1.term_id))
    });
    pairs.truncate(keep);
    pairs
}
