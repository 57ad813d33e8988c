//! Flattens a forest of clause trees into an id-bearing node/edge graph.
//!
//! Traversal is depth-first in source order. Every new node takes the next
//! 1-based id; variables are shared across the whole forest, so a repeated
//! variable only contributes an edge to the node created at its first
//! occurrence.

use crate::ast::{Clause, Term};
use crate::graph::{Edge, Graph, GraphNode, NodeBody, NodeId};
use std::collections::HashMap;
use tracing::{debug, trace};

pub fn extract_graph(clauses: &[Clause]) -> Graph {
    let mut acc = Extraction::new();
    for clause in clauses {
        for goal in &clause.body {
            acc.visit(goal, None);
        }
    }
    debug!(
        clauses = clauses.len(),
        nodes = acc.nodes.len(),
        edges = acc.edges.len(),
        "extracted clause graph"
    );
    acc.finish()
}

/// Running state of one extraction.
struct Extraction {
    nodes: Vec<GraphNode>,
    edges: Vec<Edge>,
    next_id: u32,
    variables: HashMap<String, NodeId>,
}

impl Extraction {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_id: 1,
            variables: HashMap::new(),
        }
    }

    fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    fn push(&mut self, body: NodeBody, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        trace!(%id, parent = ?parent.map(|p| p.0), "node");
        self.nodes.push(GraphNode::new(id, body));
        if let Some(parent) = parent {
            self.edges.push(Edge::new(parent, id));
        }
        id
    }

    fn visit(&mut self, term: &Term, parent: Option<NodeId>) {
        match term {
            Term::Sequence { items } => {
                for item in items {
                    self.visit(item, parent);
                }
            }
            Term::Variable { value } => {
                if let Some(&existing) = self.variables.get(value) {
                    if let Some(parent) = parent {
                        self.edges.push(Edge::new(parent, existing));
                    }
                    return;
                }
                let id = self.push(NodeBody::Term(term.clone()), parent);
                self.variables.insert(value.clone(), id);
            }
            Term::ListLiteral { list } => {
                let id = self.push(NodeBody::Term(term.clone()), parent);
                let container = self.push(NodeBody::ListContainer { list: list.clone() }, Some(id));
                for element in list {
                    self.visit(element, Some(container));
                }
            }
            Term::Predicate { arguments, .. } => {
                let id = self.push(NodeBody::Term(term.clone()), parent);
                for argument in arguments {
                    self.visit(argument, Some(id));
                }
            }
            Term::Condition {
                left_operand,
                right_operand,
                ..
            } => {
                let id = self.push(NodeBody::Term(term.clone()), parent);
                self.visit(left_operand, Some(id));
                self.visit(right_operand, Some(id));
            }
            Term::Atom { .. } => {
                self.push(NodeBody::Term(term.clone()), parent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(graph: &Graph) -> Vec<u32> {
        graph.nodes.iter().map(|node| node.id.0).collect()
    }

    fn edges(graph: &Graph) -> Vec<(u32, u32)> {
        graph
            .edges
            .iter()
            .map(|edge| (edge.source.0, edge.target.0))
            .collect()
    }

    #[test]
    fn fact_with_two_atoms() {
        let clause = Clause::new(vec![Term::predicate(
            "parent",
            vec![Term::atom("tom"), Term::atom("bob")],
        )]);
        let graph = extract_graph(&[clause]);
        assert_eq!(ids(&graph), vec![1, 2, 3]);
        assert_eq!(edges(&graph), vec![(1, 2), (1, 3)]);
        assert_eq!(graph.nodes[0].label(), "parent");
    }

    #[test]
    fn repeated_variable_is_shared() {
        let clause = Clause::new(vec![Term::predicate(
            "same",
            vec![Term::variable("X"), Term::variable("X")],
        )]);
        let graph = extract_graph(&[clause]);
        assert_eq!(ids(&graph), vec![1, 2]);
        assert_eq!(edges(&graph), vec![(1, 2), (1, 2)]);
    }

    #[test]
    fn variables_are_shared_across_clauses() {
        let first = Clause::new(vec![Term::predicate("p", vec![Term::variable("X")])]);
        let second = Clause::new(vec![Term::predicate("q", vec![Term::variable("X")])]);
        let graph = extract_graph(&[first, second]);
        assert_eq!(ids(&graph), vec![1, 2, 3]);
        assert_eq!(edges(&graph), vec![(1, 2), (3, 2)]);
    }

    #[test]
    fn top_level_repeated_variable_adds_nothing() {
        let clause = Clause::new(vec![Term::variable("X"), Term::variable("X")]);
        let graph = extract_graph(&[clause]);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn list_literal_gets_a_container() {
        let clause = Clause::new(vec![Term::predicate(
            "p",
            vec![Term::list(vec![Term::atom("a"), Term::atom("b")])],
        )]);
        let graph = extract_graph(&[clause]);
        // p=1, literal=2, container=3, a=4, b=5
        assert_eq!(ids(&graph), vec![1, 2, 3, 4, 5]);
        assert_eq!(edges(&graph), vec![(1, 2), (2, 3), (3, 4), (3, 5)]);
        assert!(matches!(
            graph.nodes[2].body,
            NodeBody::ListContainer { ref list } if list.len() == 2
        ));
    }

    #[test]
    fn condition_expands_left_then_right() {
        let clause = Clause::new(vec![Term::condition(
            ">",
            Term::variable("X"),
            Term::atom("3"),
        )]);
        let graph = extract_graph(&[clause]);
        assert_eq!(edges(&graph), vec![(1, 2), (1, 3)]);
        assert_eq!(graph.nodes[1].label(), "X");
        assert_eq!(graph.nodes[2].label(), "3");
    }

    #[test]
    fn sequences_are_transparent() {
        let clause = Clause::new(vec![Term::predicate(
            "p",
            vec![Term::Sequence {
                items: vec![Term::atom("a"), Term::atom("b")],
            }],
        )]);
        let graph = extract_graph(&[clause]);
        assert_eq!(ids(&graph), vec![1, 2, 3]);
        assert_eq!(edges(&graph), vec![(1, 2), (1, 3)]);
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        assert!(extract_graph(&[]).is_empty());
        let graph = extract_graph(&[Clause::default()]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }
}
