use crate::config::{Config, RenderConfig};
use crate::grammar::{GrammarError, load_grammar};
use crate::graph::NodeShape;
use crate::layout::{Layout, compute_layout};
use crate::pipeline::{VisualGraph, visualize_source};
use crate::theme::Theme;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Draws `layout` on a `render.width` x `render.height` canvas. The layout is
/// scaled to fit and centred; the view box grows on the slack axis so the
/// background covers the whole canvas.
pub fn render_svg(layout: &Layout, theme: &Theme, render: &RenderConfig) -> String {
    let mut svg = String::new();
    let (width, height) = (render.width.max(1.0), render.height.max(1.0));
    let scale = (width / layout.width.max(1.0)).min(height / layout.height.max(1.0));
    let (view_w, view_h) = (width / scale, height / scale);
    let view_x = (layout.width - view_w) / 2.0;
    let view_y = (layout.height - view_h) / 2.0;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{view_x:.2} {view_y:.2} {view_w:.2} {view_h:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect class=\"background\" x=\"{view_x:.2}\" y=\"{view_y:.2}\" width=\"{view_w:.2}\" height=\"{view_h:.2}\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<g class=\"links\">");
    for edge in &layout.edges {
        svg.push_str(&format!(
            "<line class=\"link\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            edge.from.0, edge.from.1, edge.to.0, edge.to.1, theme.line_color, theme.line_width
        ));
    }
    svg.push_str("</g>");

    for node in &layout.nodes {
        svg.push_str(&format!(
            "<g class=\"shape\" data-id=\"{}\" transform=\"translate({:.2},{:.2})\">",
            node.id, node.x, node.y
        ));
        let r = node.radius;
        match node.shape {
            NodeShape::Rectangle => svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                -r,
                -r,
                r * 2.0,
                r * 2.0,
                theme.node_fill,
                theme.node_stroke,
                theme.node_stroke_width
            )),
            NodeShape::Circle => svg.push_str(&format!(
                "<circle r=\"{r:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                theme.node_fill, theme.node_stroke, theme.node_stroke_width
            )),
        }
        svg.push_str(&format!(
            "<text text-anchor=\"middle\" dy=\"0.3em\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&node.label)
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

/// One finished rendering of a program.
#[derive(Debug, Clone)]
pub struct Drawing {
    pub graph: VisualGraph,
    pub layout: Layout,
    pub svg: String,
}

/// Owner of the drawing currently on display. Presenting a new drawing
/// disposes the previous one first.
#[derive(Debug, Default)]
pub struct Surface {
    current: Option<Drawing>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Drawing> {
        self.current.as_ref()
    }

    pub fn present(&mut self, drawing: Drawing) -> &Drawing {
        self.dispose();
        self.current.insert(drawing)
    }

    /// Removes every element of the current drawing, if any.
    pub fn dispose(&mut self) -> Option<Drawing> {
        let previous = self.current.take();
        if let Some(drawing) = &previous {
            debug!(
                nodes = drawing.layout.nodes.len(),
                edges = drawing.layout.edges.len(),
                "disposed previous graph"
            );
        }
        previous
    }
}

/// Runs the whole pipeline for `source` and presents the result on `surface`.
///
/// A grammar that fails to load aborts the request before anything is drawn,
/// leaving the surface's current drawing in place.
pub fn draw_program<'s>(
    surface: &'s mut Surface,
    source: &str,
    grammar_path: Option<&Path>,
    config: &Config,
) -> Result<&'s Drawing, GrammarError> {
    let grammar = load_grammar(grammar_path)?;
    let graph = visualize_source(source, &grammar);
    let layout = compute_layout(&graph, &config.layout);
    debug!(ticks = layout.ticks, "layout settled");
    let svg = render_svg(&layout, &config.theme, &config.render);
    Ok(surface.present(Drawing { graph, layout, svg }))
}

/// Writes the SVG to `output`, or to stdout when no path is given.
pub fn write_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    let Some(path) = output else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(svg.as_bytes())?;
        return Ok(stdout.flush()?);
    };
    std::fs::write(path, svg).with_context(|| format!("writing {}", path.display()))
}

/// Rasterizes the SVG at the size its root element declares.
#[cfg(feature = "png")]
pub fn write_png(svg: &str, output: &Path) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "monospace".to_string();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("cannot allocate a {}x{} canvas", size.width(), size.height()))?;
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .save_png(output)
        .with_context(|| format!("writing {}", output.display()))
}

#[cfg(not(feature = "png"))]
pub fn write_png(_svg: &str, _output: &Path) -> Result<()> {
    anyhow::bail!("this build has no PNG support; enable the `png` feature")
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
