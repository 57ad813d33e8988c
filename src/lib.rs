pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod extract;
pub mod grammar;
pub mod graph;
pub mod graph_dump;
pub mod layout;
pub mod normalize;
pub mod order;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod reorder;
pub mod theme;

pub use ast::{Clause, Term};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use extract::extract_graph;
pub use grammar::{Grammar, GrammarError, load_grammar};
pub use graph::{Edge, Graph, GraphNode, NodeBody, NodeId, NodeShape};
pub use layout::compute_layout;
pub use normalize::split_clauses;
pub use order::order_nodes;
pub use parser::{ClauseParser, GrammarParser, ParseError, parse_clause};
pub use pipeline::{VisualGraph, VisualNode, visualize_clauses, visualize_source};
pub use render::{Drawing, Surface, draw_program, render_svg};
pub use reorder::promote_output_list;
pub use theme::Theme;
