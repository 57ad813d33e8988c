use crate::graph::Edge;
use crate::layout::Layout;
use crate::pipeline::{VisualGraph, VisualNode};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// JSON form of a laid-out graph, for renderers that draw it themselves.
#[derive(Debug, Serialize)]
pub struct GraphDump<'a> {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump<'a>>,
    pub edges: &'a [Edge],
}

#[derive(Debug, Serialize)]
pub struct NodeDump<'a> {
    #[serde(flatten)]
    pub node: &'a VisualNode,
    pub x: f32,
    pub y: f32,
}

impl<'a> GraphDump<'a> {
    pub fn new(graph: &'a VisualGraph, layout: &Layout) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .zip(&layout.nodes)
            .map(|(node, placed)| NodeDump {
                node,
                x: placed.x,
                y: placed.y,
            })
            .collect();
        GraphDump {
            width: layout.width,
            height: layout.height,
            nodes,
            edges: &graph.edges,
        }
    }
}

pub fn write_graph_dump(output: Option<&Path>, graph: &VisualGraph, layout: &Layout) -> anyhow::Result<()> {
    let dump = GraphDump::new(graph, layout);
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
