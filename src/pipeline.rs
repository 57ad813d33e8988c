//! End-to-end stages from source text to a render-ready graph.

use crate::ast::Clause;
use crate::extract::extract_graph;
use crate::grammar::Grammar;
use crate::graph::{Edge, Graph, GraphNode, NodeShape};
use crate::normalize::split_clauses;
use crate::order::order_nodes;
use crate::parser::{ClauseParser, GrammarParser, ParseError};
use crate::reorder::promote_output_list;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// A graph node annotated for drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    #[serde(flatten)]
    pub node: GraphNode,
    pub label: String,
    pub radius: f32,
    #[serde(serialize_with = "serialize_shape")]
    pub shape: NodeShape,
}

impl From<GraphNode> for VisualNode {
    fn from(node: GraphNode) -> Self {
        Self {
            label: node.label().to_string(),
            radius: node.radius(),
            shape: node.shape(),
            node,
        }
    }
}

fn serialize_shape<S: serde::Serializer>(shape: &NodeShape, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(match shape {
        NodeShape::Rectangle => "rect",
        NodeShape::Circle => "circle",
    })
}

/// Ordered nodes plus the edges between them; every edge endpoint is the id
/// of a node in `nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisualGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<Edge>,
}

impl VisualGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ParsedProgram {
    pub clauses: Vec<Clause>,
    pub failures: Vec<ParseError>,
}

/// Parses every clause of `source`, skipping (and logging) those that fail,
/// and groups the rest by predicate.
pub fn parse_program(source: &str, parser: &dyn ClauseParser) -> ParsedProgram {
    let started = Instant::now();
    let mut program = ParsedProgram::default();
    for text in split_clauses(source) {
        debug!(clause = %text, "parsing clause");
        match parser.parse(&text) {
            Ok(clause) => program.clauses.push(clause),
            Err(err) => {
                warn!(%err, "error parsing clause");
                program.failures.push(err);
            }
        }
    }
    program.clauses = group_by_predicate(std::mem::take(&mut program.clauses));
    debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        parsed = program.clauses.len(),
        failed = program.failures.len(),
        "time taken for parsing"
    );
    program
}

/// Gathers clauses of the same `name/arity` together, each predicate placed
/// where its first clause appeared. Headless clauses stay in their own slot.
pub fn group_by_predicate(clauses: Vec<Clause>) -> Vec<Clause> {
    let mut slots: HashMap<(String, usize), usize> = HashMap::new();
    let mut groups: Vec<Vec<Clause>> = Vec::new();
    for clause in clauses {
        let slot = match clause.predicate_key() {
            Some((name, arity)) => *slots
                .entry((name.to_string(), arity))
                .or_insert(groups.len()),
            None => groups.len(),
        };
        if slot == groups.len() {
            groups.push(Vec::new());
        }
        groups[slot].push(clause);
    }
    groups.into_iter().flatten().collect()
}

/// Extracts the graph and applies the `OutputList` swap.
pub fn build_graph(clauses: &[Clause]) -> Graph {
    let mut graph = extract_graph(clauses);
    promote_output_list(&mut graph);
    debug_assert!(graph.validate().is_ok(), "{:?}", graph.validate());
    graph
}

/// Orders nodes for presentation and annotates labels, radii and shapes.
pub fn prepare(graph: Graph) -> VisualGraph {
    let Graph { nodes, edges } = graph;
    let nodes = order_nodes(nodes).into_iter().map(VisualNode::from).collect();
    VisualGraph { nodes, edges }
}

pub fn visualize_clauses(clauses: &[Clause]) -> VisualGraph {
    prepare(build_graph(clauses))
}

pub fn visualize_source(source: &str, grammar: &Grammar) -> VisualGraph {
    let started = Instant::now();
    let parser = GrammarParser::new(grammar.clone());
    let program = parse_program(source, &parser);
    let graph = visualize_clauses(&program.clauses);
    debug!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "total time taken for visualisation"
    );
    graph
}
