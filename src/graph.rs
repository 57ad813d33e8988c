use crate::ast::Term;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// 1-based node identity, unique within one extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeBody {
    Term(Term),
    /// Synthetic holder for the elements of a list literal.
    ListContainer { list: Vec<Term> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    #[serde(flatten)]
    pub body: NodeBody,
    pub id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Rectangle,
    Circle,
}

impl GraphNode {
    pub fn new(id: NodeId, body: NodeBody) -> Self {
        Self { body, id }
    }

    pub fn term(&self) -> Option<&Term> {
        match &self.body {
            NodeBody::Term(term) => Some(term),
            NodeBody::ListContainer { .. } => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self.term() {
            Some(Term::Predicate { name, .. }) => Some(name),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self.term() {
            Some(Term::Variable { value }) | Some(Term::Atom { value }) => Some(value),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<&str> {
        match self.term() {
            Some(Term::Condition { operator, .. }) => Some(operator),
            _ => None,
        }
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self.term(), Some(Term::Predicate { .. }))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.term(), Some(Term::Variable { .. }))
    }

    /// Structurally composite nodes: predicates, list literals and the
    /// synthetic list containers.
    pub fn is_container(&self) -> bool {
        match &self.body {
            NodeBody::ListContainer { .. } => true,
            NodeBody::Term(Term::Predicate { .. }) | NodeBody::Term(Term::ListLiteral { .. }) => {
                true
            }
            NodeBody::Term(_) => false,
        }
    }

    /// Display label: name, then value, then operator, then `"List"`.
    /// Empty strings count as absent.
    pub fn label(&self) -> &str {
        [self.name(), self.value(), self.operator()]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .unwrap_or("List")
    }

    pub fn radius(&self) -> f32 {
        label_radius(self.label())
    }

    pub fn shape(&self) -> NodeShape {
        if self.is_predicate() {
            NodeShape::Rectangle
        } else {
            NodeShape::Circle
        }
    }
}

pub fn label_radius(label: &str) -> f32 {
    match label.chars().count() {
        1 => 15.0,
        2 => 25.0,
        len => len as f32 * 6.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge {from} -> {to} references a missing node")]
    DanglingEdge { from: NodeId, to: NodeId },
    #[error("node id {0} is used more than once")]
    DuplicateId(NodeId),
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.edges
            .iter()
            .map(|edge| usize::from(edge.source == id) + usize::from(edge.target == id))
            .sum()
    }

    /// Checks that ids are unique and every edge endpoint exists.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(node.id) {
                return Err(GraphError::DuplicateId(node.id));
            }
        }
        for edge in &self.edges {
            if !ids.contains(&edge.source) || !ids.contains(&edge.target) {
                return Err(GraphError::DanglingEdge {
                    from: edge.source,
                    to: edge.target,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u32, term: Term) -> GraphNode {
        GraphNode::new(NodeId(id), NodeBody::Term(term))
    }

    #[test]
    fn label_falls_back_in_order() {
        assert_eq!(node(1, Term::predicate("parent", vec![])).label(), "parent");
        assert_eq!(node(2, Term::variable("X")).label(), "X");
        let cond = Term::condition("is", Term::variable("X"), Term::atom("1"));
        assert_eq!(node(3, cond).label(), "is");
        assert_eq!(node(4, Term::list(vec![])).label(), "List");
        let container = GraphNode::new(NodeId(5), NodeBody::ListContainer { list: vec![] });
        assert_eq!(container.label(), "List");
    }

    #[test]
    fn empty_strings_fall_through_to_list() {
        assert_eq!(node(1, Term::atom("")).label(), "List");
    }

    #[test]
    fn radius_follows_label_length() {
        assert_eq!(label_radius("X"), 15.0);
        assert_eq!(label_radius("is"), 25.0);
        assert_eq!(label_radius("parent"), 36.0);
        assert_eq!(label_radius("List"), 24.0);
    }

    #[test]
    fn only_predicates_are_rectangles() {
        assert_eq!(node(1, Term::predicate("p", vec![])).shape(), NodeShape::Rectangle);
        assert_eq!(node(2, Term::atom("a")).shape(), NodeShape::Circle);
        assert_eq!(node(3, Term::list(vec![])).shape(), NodeShape::Circle);
    }

    #[test]
    fn validate_reports_dangling_edges() {
        let mut graph = Graph::new();
        graph.nodes.push(node(1, Term::atom("a")));
        graph.edges.push(Edge::new(NodeId(1), NodeId(2)));
        assert_eq!(
            graph.validate(),
            Err(GraphError::DanglingEdge {
                from: NodeId(1),
                to: NodeId(2)
            })
        );
    }

    #[test]
    fn serializes_flat_with_id() {
        let graph_node = node(7, Term::atom("tom"));
        let json = serde_json::to_value(&graph_node).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "Atom");
        assert_eq!(json["value"], "tom");

        let container = GraphNode::new(NodeId(3), NodeBody::ListContainer { list: vec![] });
        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json["list"].is_array());
        assert!(json.get("type").is_none());
    }
}
