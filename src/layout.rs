//! Deterministic force-directed placement.
//!
//! Mirrors the d3-force defaults the graph was designed around: nodes start on
//! a phyllotaxis spiral in presentation order, links pull towards a fixed
//! distance, every pair repels, and the system cools with a decaying alpha.

use crate::config::LayoutConfig;
use crate::graph::{NodeId, NodeShape};
use crate::pipeline::VisualGraph;
use std::collections::HashMap;
use std::f32::consts::PI;

const INITIAL_RADIUS: f32 = 10.0;
const DISTANCE_MIN_SQ: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: NodeId,
    pub label: String,
    pub shape: NodeShape,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub source: NodeId,
    pub target: NodeId,
    pub from: (f32, f32),
    pub to: (f32, f32),
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub width: f32,
    pub height: f32,
    pub ticks: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct Body {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

struct Link {
    source: usize,
    target: usize,
    strength: f32,
    bias: f32,
}

pub fn compute_layout(graph: &VisualGraph, config: &LayoutConfig) -> Layout {
    let index_by_id: HashMap<NodeId, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.node.id, idx))
        .collect();

    let mut bodies: Vec<Body> = (0..graph.nodes.len()).map(phyllotaxis).collect();
    let links = build_links(graph, &index_by_id);

    let mut alpha = 1.0f32;
    let mut ticks = 0;
    while ticks < config.iterations && alpha >= config.alpha_min {
        alpha += (0.0 - alpha) * config.alpha_decay;
        apply_links(&mut bodies, &links, config.link_distance, alpha);
        apply_charge(&mut bodies, config.charge_strength, alpha);
        for body in &mut bodies {
            body.vx *= 1.0 - config.velocity_decay;
            body.vy *= 1.0 - config.velocity_decay;
            body.x += body.vx;
            body.y += body.vy;
        }
        recenter(&mut bodies);
        ticks += 1;
    }

    place(graph, &bodies, &index_by_id, config.padding, ticks)
}

fn phyllotaxis(index: usize) -> Body {
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * PI * (3.0 - 5f32.sqrt());
    Body {
        x: radius * angle.cos(),
        y: radius * angle.sin(),
        ..Body::default()
    }
}

fn build_links(graph: &VisualGraph, index_by_id: &HashMap<NodeId, usize>) -> Vec<Link> {
    let pairs: Vec<(usize, usize)> = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let source = *index_by_id.get(&edge.source)?;
            let target = *index_by_id.get(&edge.target)?;
            (source != target).then_some((source, target))
        })
        .collect();

    let mut count = vec![0usize; graph.nodes.len()];
    for &(source, target) in &pairs {
        count[source] += 1;
        count[target] += 1;
    }

    pairs
        .into_iter()
        .map(|(source, target)| {
            let (cs, ct) = (count[source] as f32, count[target] as f32);
            Link {
                source,
                target,
                strength: 1.0 / cs.min(ct),
                bias: cs / (cs + ct),
            }
        })
        .collect()
}

/// Small deterministic offset for coincident points.
fn jiggle(seed: usize) -> f32 {
    ((seed as f32 * 0.618_034).fract() - 0.5) * 1e-6
}

fn apply_links(bodies: &mut [Body], links: &[Link], distance: f32, alpha: f32) {
    for (idx, link) in links.iter().enumerate() {
        let (s, t) = (bodies[link.source], bodies[link.target]);
        let mut dx = t.x + t.vx - s.x - s.vx;
        let mut dy = t.y + t.vy - s.y - s.vy;
        if dx == 0.0 {
            dx = jiggle(idx * 2 + 1);
        }
        if dy == 0.0 {
            dy = jiggle(idx * 2 + 2);
        }
        let len = (dx * dx + dy * dy).sqrt();
        let scale = (len - distance) / len * alpha * link.strength;
        dx *= scale;
        dy *= scale;

        bodies[link.target].vx -= dx * link.bias;
        bodies[link.target].vy -= dy * link.bias;
        bodies[link.source].vx += dx * (1.0 - link.bias);
        bodies[link.source].vy += dy * (1.0 - link.bias);
    }
}

fn apply_charge(bodies: &mut [Body], strength: f32, alpha: f32) {
    let count = bodies.len();
    for i in 0..count {
        let (mut fx, mut fy) = (0.0, 0.0);
        for j in 0..count {
            if i == j {
                continue;
            }
            let mut dx = bodies[j].x - bodies[i].x;
            let mut dy = bodies[j].y - bodies[i].y;
            if dx == 0.0 {
                dx = jiggle(i * count + j);
            }
            if dy == 0.0 {
                dy = jiggle(j * count + i);
            }
            let mut dist_sq = dx * dx + dy * dy;
            if dist_sq < DISTANCE_MIN_SQ {
                dist_sq = (DISTANCE_MIN_SQ * dist_sq).sqrt();
            }
            fx += dx * strength * alpha / dist_sq;
            fy += dy * strength * alpha / dist_sq;
        }
        bodies[i].vx += fx;
        bodies[i].vy += fy;
    }
}

fn recenter(bodies: &mut [Body]) {
    if bodies.is_empty() {
        return;
    }
    let n = bodies.len() as f32;
    let cx = bodies.iter().map(|b| b.x).sum::<f32>() / n;
    let cy = bodies.iter().map(|b| b.y).sum::<f32>() / n;
    for body in bodies {
        body.x -= cx;
        body.y -= cy;
    }
}

fn place(
    graph: &VisualGraph,
    bodies: &[Body],
    index_by_id: &HashMap<NodeId, usize>,
    padding: f32,
    ticks: usize,
) -> Layout {
    if graph.nodes.is_empty() {
        return Layout {
            width: padding * 2.0,
            height: padding * 2.0,
            ticks,
            ..Layout::default()
        };
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for (node, body) in graph.nodes.iter().zip(bodies) {
        min_x = min_x.min(body.x - node.radius);
        min_y = min_y.min(body.y - node.radius);
        max_x = max_x.max(body.x + node.radius);
        max_y = max_y.max(body.y + node.radius);
    }
    let shift_x = padding - min_x;
    let shift_y = padding - min_y;

    let nodes: Vec<NodeLayout> = graph
        .nodes
        .iter()
        .zip(bodies)
        .map(|(node, body)| NodeLayout {
            id: node.node.id,
            label: node.label.clone(),
            shape: node.shape,
            radius: node.radius,
            x: body.x + shift_x,
            y: body.y + shift_y,
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let from = &nodes[*index_by_id.get(&edge.source)?];
            let to = &nodes[*index_by_id.get(&edge.target)?];
            Some(EdgeLayout {
                source: edge.source,
                target: edge.target,
                from: (from.x, from.y),
                to: (to.x, to.y),
            })
        })
        .collect();

    Layout {
        nodes,
        edges,
        width: max_x - min_x + padding * 2.0,
        height: max_y - min_y + padding * 2.0,
        ticks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::visualize_source;
    use crate::grammar::Grammar;

    fn layout_for(source: &str) -> Layout {
        let graph = visualize_source(source, &Grammar::default());
        compute_layout(&graph, &LayoutConfig::default())
    }

    #[test]
    fn empty_graph_has_padding_only() {
        let layout = layout_for("");
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
        assert_eq!(layout.width, LayoutConfig::default().padding * 2.0);
    }

    #[test]
    fn nodes_stay_inside_bounds() {
        let layout = layout_for("grand(X, Z) :- parent(X, Y), parent(Y, Z).");
        assert_eq!(layout.nodes.len(), 6);
        for node in &layout.nodes {
            assert!(node.x.is_finite() && node.y.is_finite());
            assert!(node.x - node.radius >= -0.01);
            assert!(node.y - node.radius >= -0.01);
            assert!(node.x + node.radius <= layout.width + 0.01);
            assert!(node.y + node.radius <= layout.height + 0.01);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let source = "p(X, [a, b]) :- q(X), X > 3.";
        let first = layout_for(source);
        let second = layout_for(source);
        let coords = |layout: &Layout| -> Vec<(f32, f32)> {
            layout.nodes.iter().map(|n| (n.x, n.y)).collect()
        };
        assert_eq!(coords(&first), coords(&second));
    }

    #[test]
    fn linked_nodes_settle_near_link_distance() {
        let layout = layout_for("p(a).");
        assert_eq!(layout.edges.len(), 1);
        let edge = &layout.edges[0];
        let dist = ((edge.to.0 - edge.from.0).powi(2) + (edge.to.1 - edge.from.1).powi(2)).sqrt();
        assert!(dist > 200.0, "distance {dist}");
    }

    #[test]
    fn phyllotaxis_starts_near_origin_in_order() {
        let first = phyllotaxis(0);
        let later = phyllotaxis(10);
        let r0 = (first.x.powi(2) + first.y.powi(2)).sqrt();
        let r10 = (later.x.powi(2) + later.y.powi(2)).sqrt();
        assert!(r0 < r10);
    }
}
