//! spangraph CLI tool
//!
//! Command-line interface for inspecting span annotation graphs stored in the JSON interchange
//! format.
//!
//! ## Commands
//!
//! - `inspect <file>`: Summarize nodes, relations and indexed spans
//! - `labels <file> <begin> <end>`: List the labels sitting on exactly one span
//! - `follow <file> <id>`: Walk the relation chain from a node
//! - `check <file>`: Validate the file against a graph config (cycles, label collisions)

use clap::{Parser, Subcommand};
use spangraph_core::{
    config::{get_content, AcyclicityPolicy, GraphConfig},
    graph::SpanAnnotationGraph,
    label::{ImmutableSpanTextLabel, SpanTextLabel},
    properties::{NodeId, Span},
};
use std::path::{Path, PathBuf};

type Graph = SpanAnnotationGraph<ImmutableSpanTextLabel>;

#[derive(Parser)]
#[command(name = "spangraph")]
#[command(author, version, about = "A tool for inspecting span annotation graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a graph file
    Inspect {
        /// Path to the interchange JSON file
        path: PathBuf,

        /// Print every node and its relation target
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the labels at an exact span
    Labels {
        /// Path to the interchange JSON file
        path: PathBuf,

        /// Begin offset (inclusive)
        begin: usize,

        /// End offset (exclusive)
        end: usize,
    },

    /// Follow relations starting from a node id
    Follow {
        /// Path to the interchange JSON file
        path: PathBuf,

        /// Id of the starting node
        id: usize,
    },

    /// Validate a graph file
    Check {
        /// Path to the interchange JSON file
        path: PathBuf,

        /// Configuration file path (defaults to strict checking)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_graph(path: &Path, config: &GraphConfig) -> Result<Graph, Box<dyn std::error::Error>> {
    let json = get_content(path)?;
    Ok(Graph::from_json_with_config(&json, config)?)
}

fn describe(id: NodeId, node: &ImmutableSpanTextLabel) -> String {
    match node.covered_text() {
        Some(text) => format!("#{id} {} {} {:?}", node.label(), node.span(), text),
        None => format!("#{id} {} {}", node.label(), node.span()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { path, verbose } => {
            let graph = load_graph(&path, &GraphConfig::default())?;
            println!("Nodes:          {}", graph.len());
            println!("Relations:      {}", graph.relations().edges().count());
            println!("Indexed spans:  {}", graph.span_index().span_count());
            match graph.find_cycle() {
                Some(node) => println!("Cycle through:  #{node}"),
                None => println!("Cycle through:  none"),
            }
            if verbose {
                for (id, node) in graph.iter() {
                    match graph.relation_target_id(id)? {
                        Some(target) => println!("{} -> #{target}", describe(id, node)),
                        None => println!("{}", describe(id, node)),
                    }
                }
            }
        }
        Commands::Labels { path, begin, end } => {
            let graph = load_graph(&path, &GraphConfig::default())?;
            let span = Span::new(begin, end)?;
            match graph.labels_at(&span) {
                Ok(labels) => {
                    for node in labels.values() {
                        let id = graph.id_of(node).ok_or("indexed node missing from registry")?;
                        println!("{}", describe(id, node));
                    }
                }
                Err(err) if err.is_recoverable() => println!("{err}"),
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Follow { path, id } => {
            let graph = load_graph(&path, &GraphConfig::default())?;
            let start = graph.get(NodeId::new(id))?;
            println!("{}", describe(NodeId::new(id), start));
            for (next, node) in graph.relation_chain(start)? {
                println!("  -> {}", describe(next, node));
            }
        }
        Commands::Check { path, config } => {
            let config = match config {
                Some(config_path) => GraphConfig::load(config_path)?,
                None => GraphConfig::strict(),
            };
            let graph = load_graph(&path, &config)?;
            if config.acyclicity == AcyclicityPolicy::Trust {
                if let Some(node) = graph.find_cycle() {
                    tracing::warn!("Relation table has a cycle through node {}", node);
                }
            }
            println!("OK: {} nodes in {:?}", graph.len(), path);
        }
    }

    Ok(())
}
