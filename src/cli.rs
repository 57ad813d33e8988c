use crate::config::load_config;
use crate::graph_dump::write_graph_dump;
use crate::render::{Surface, draw_program, write_png, write_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "clause-graph",
    version,
    about = "Draw the structure of logic-program clauses as a force-directed graph"
)]
pub struct Args {
    /// Input file (.pl, or .md with ```prolog blocks) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, render)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Grammar JSON5 file with the operator tables; built-in when omitted
    #[arg(short = 'g', long = "grammar")]
    pub grammar: Option<PathBuf>,

    /// Canvas width; overrides `render.width` from the config (default 1200)
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height; overrides `render.height` from the config (default 800)
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Log pipeline stages at debug level (RUST_LOG overrides)
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let source = read_source(args.input.as_deref())?;

    let mut surface = Surface::new();
    let drawing = draw_program(&mut surface, &source, args.grammar.as_deref(), &config)?;
    info!(
        nodes = drawing.graph.nodes.len(),
        edges = drawing.graph.edges.len(),
        "graph ready"
    );

    match args.output_format {
        OutputFormat::Svg => write_svg(&drawing.svg, args.output.as_deref())?,
        OutputFormat::Png => write_png(&drawing.svg, png_path(args.output.as_deref())?)?,
        OutputFormat::Json => {
            write_graph_dump(args.output.as_deref(), &drawing.graph, &drawing.layout)?
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Program text from `path` (stdin for `-` or none). Markdown files
/// contribute only their prolog code blocks.
fn read_source(path: Option<&Path>) -> Result<String> {
    let path = path.filter(|path| *path != Path::new("-"));
    let Some(path) = path else {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("reading program from stdin")?;
        return Ok(source);
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading program {}", path.display()))?;
    let markdown = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("md" | "markdown")
    );
    Ok(if markdown {
        extract_prolog_blocks(&text).join("\n")
    } else {
        text
    })
}

fn png_path(output: Option<&Path>) -> Result<&Path> {
    output.context("PNG output is binary; give a file with -o/--output")
}

fn extract_prolog_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut in_block = false;
    let mut current = Vec::new();
    let mut fence = String::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if !in_block {
            if let Some(start_fence) = detect_prolog_fence(trimmed) {
                in_block = true;
                fence = start_fence;
            }
            continue;
        }
        let closes = trimmed
            .strip_prefix(fence.as_str())
            .is_some_and(|rest| rest.trim().is_empty());
        if closes {
            in_block = false;
            blocks.push(current.join("\n"));
            current.clear();
            continue;
        }
        current.push(line.to_string());
    }

    blocks
}

fn detect_prolog_fence(line: &str) -> Option<String> {
    for marker in ["```", "~~~"] {
        if let Some(rest) = line.strip_prefix(marker) {
            let lang = rest.trim_start_matches(marker.chars().next()?).trim();
            if matches!(lang, "prolog" | "pl") {
                return Some(marker.to_string());
            }
        }
    }
    None
}
