use crate::graph::GraphNode;

/// Presentation order used to seed the force layout.
///
/// Containers (predicates, list literals, list containers) come first sorted
/// by id, followed by every other node in its original order. Edge direction
/// plays no part; this is a structural partition, not a topological sort.
pub fn order_nodes(nodes: Vec<GraphNode>) -> Vec<GraphNode> {
    let (mut containers, others): (Vec<_>, Vec<_>) =
        nodes.into_iter().partition(GraphNode::is_container);
    containers.sort_by_key(|node| node.id);
    containers.extend(others);
    containers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Term;
    use crate::graph::{NodeBody, NodeId};

    fn node(id: u32, term: Term) -> GraphNode {
        GraphNode::new(NodeId(id), NodeBody::Term(term))
    }

    #[test]
    fn containers_precede_leaves() {
        let nodes = vec![
            node(2, Term::atom("tom")),
            node(1, Term::predicate("parent", vec![])),
            node(3, Term::atom("bob")),
        ];
        let ordered: Vec<_> = order_nodes(nodes).into_iter().map(|n| n.id.0).collect();
        assert_eq!(ordered, vec![1, 2, 3]);
    }

    #[test]
    fn containers_sorted_by_id_leaves_keep_order() {
        let nodes = vec![
            node(5, Term::variable("Y")),
            node(4, Term::list(vec![])),
            node(1, Term::variable("X")),
            GraphNode::new(NodeId(6), NodeBody::ListContainer { list: vec![] }),
            node(2, Term::predicate("p", vec![])),
            node(3, Term::condition("=", Term::variable("X"), Term::variable("Y"))),
        ];
        let ordered: Vec<_> = order_nodes(nodes).into_iter().map(|n| n.id.0).collect();
        assert_eq!(ordered, vec![2, 4, 6, 5, 1, 3]);
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(order_nodes(Vec::new()).is_empty());
    }
}
