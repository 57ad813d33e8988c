use crate::graph::{Graph, NodeId};
use tracing::debug;

pub const OUTPUT_LIST_NAME: &str = "OutputList";

/// Moves a trailing `OutputList` node to the very end of the node list.
///
/// When the second-to-last node is named `OutputList`, the last two nodes
/// trade places and ids, and every edge endpoint is remapped both ways so each
/// node keeps its neighbours. Returns `true` when a swap happened.
pub fn promote_output_list(graph: &mut Graph) -> bool {
    let len = graph.nodes.len();
    if len < 2 || graph.nodes[len - 2].name() != Some(OUTPUT_LIST_NAME) {
        return false;
    }

    let output_id = graph.nodes[len - 2].id;
    let last_id = graph.nodes[len - 1].id;
    graph.nodes.swap(len - 2, len - 1);
    graph.nodes[len - 2].id = output_id;
    graph.nodes[len - 1].id = last_id;

    let remap = |id: NodeId| {
        if id == output_id {
            last_id
        } else if id == last_id {
            output_id
        } else {
            id
        }
    };
    for edge in &mut graph.edges {
        edge.source = remap(edge.source);
        edge.target = remap(edge.target);
    }

    debug!(%output_id, %last_id, "moved OutputList node last");
    true
}
