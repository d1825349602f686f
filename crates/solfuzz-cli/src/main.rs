//! solfuzz solver CLI.
//!
//! Provides the `solfuzz` binary for exercising the type-dependency solver
//! on a hand-written graph. `solve` runs one resolution attempt per head-type
//! combination and prints each outcome as a JSON line; `dot` prints the
//! classified graph in Graphviz format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use solfuzz_core::{NodeId, Type};
use solfuzz_solver::{
    EdgeRank, HeadAssignment, HeadCandidates, SolverConfig, SolverError, TypeDependencyDag,
};

/// Type-dependency solver tools.
#[derive(Parser)]
#[command(name = "solfuzz", about = "Type-dependency solver tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve every head-type combination of a graph.
    Solve {
        /// Path to the graph description (JSON).
        #[arg(short, long)]
        graph: PathBuf,

        /// Solver configuration file (JSON). Missing fields take defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// PRNG seed for weak-edge choices; overrides the config file.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum number of combinations to attempt.
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Print the graph in DOT format after head detection.
    Dot {
        /// Path to the graph description (JSON).
        #[arg(short, long)]
        graph: PathBuf,
    },
}

/// Graph description read from disk.
#[derive(Debug, Deserialize)]
struct GraphSpec {
    /// Node count; ids are `0..nodes`.
    nodes: u32,
    #[serde(default)]
    edges: Vec<EdgeSpec>,
    /// Candidate types per real head, keyed by node id.
    #[serde(default)]
    candidates: IndexMap<u32, Vec<Type>>,
}

#[derive(Debug, Deserialize)]
struct EdgeSpec {
    from: u32,
    to: u32,
    #[serde(default)]
    weak: bool,
}

/// One line of `solve` output.
#[derive(Debug, Serialize)]
struct AttemptReport<'a> {
    attempt: usize,
    heads: &'a HeadAssignment,
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    types: Option<&'a BTreeMap<NodeId, Type>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Solve {
            graph,
            config,
            seed,
            limit,
        } => run_solve(&graph, config.as_deref(), seed, limit),
        Commands::Dot { graph } => run_dot(&graph),
    };
    process::exit(exit_code);
}

/// Execute the solve subcommand.
///
/// Returns exit code: 0 = at least one attempt verified, 1 = input error,
/// 2 = no attempt verified.
fn run_solve(
    graph_path: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
    limit: Option<usize>,
) -> i32 {
    let mut config = match config_path.map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };
    if let Some(seed) = seed {
        config.random_seed = seed;
    }
    let limit = limit.unwrap_or(config.max_head_combinations);

    let spec = match load_graph(graph_path) {
        Ok(spec) => spec,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };
    let mut dag = match build_dag(&spec, config) {
        Ok(dag) => dag,
        Err(e) => {
            eprintln!("Error: invalid graph '{}': {}", graph_path.display(), e);
            return 1;
        }
    };

    let candidates: HeadCandidates = spec
        .candidates
        .iter()
        .map(|(&id, types)| (NodeId(id), types.clone()))
        .collect();
    let combinations = match dag.head_combinations(&candidates) {
        Ok(combinations) => combinations,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let total = combinations.total();
    if total > limit as u128 {
        warn!(total = %total, limit, "attempting only the first combinations");
    }
    info!(
        nodes = dag.dag().len(),
        real_heads = dag.dag().real_heads().len(),
        nominal_heads = dag.dag().nominal_heads().len(),
        total = %total,
        "solving"
    );

    let mut verified = 0usize;
    for (attempt, heads) in combinations.take(limit).enumerate() {
        dag.init_resolution();
        let outcome = run_attempt(&mut dag, &heads);
        let report = match &outcome {
            Ok(()) => {
                verified += 1;
                AttemptReport {
                    attempt,
                    heads: &heads,
                    verified: true,
                    types: Some(dag.resolved_types()),
                    error: None,
                }
            }
            Err(e) => AttemptReport {
                attempt,
                heads: &heads,
                verified: false,
                types: None,
                error: Some(e.to_string()),
            },
        };
        let json = serde_json::to_string(&report).unwrap_or_else(|e| {
            format!("{{\"error\": \"failed to serialize attempt: {}\"}}", e)
        });
        println!("{}", json);
    }

    info!(verified, "done");
    if verified > 0 {
        0
    } else {
        2
    }
}

/// Execute the dot subcommand. Returns 0 on success, 1 on input error.
fn run_dot(graph_path: &Path) -> i32 {
    let spec = match load_graph(graph_path) {
        Ok(spec) => spec,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };
    match build_dag(&spec, SolverConfig::default()) {
        Ok(dag) => {
            println!("{}", dag.to_dot());
            0
        }
        Err(e) => {
            eprintln!("Error: invalid graph '{}': {}", graph_path.display(), e);
            1
        }
    }
}

/// One resolution attempt on a freshly reset DAG.
fn run_attempt(dag: &mut TypeDependencyDag, heads: &HeadAssignment) -> Result<(), SolverError> {
    dag.seed_heads(heads)?;
    dag.resolve()?;
    dag.verify()
}

/// Builds the DAG described by `spec` and classifies its heads.
fn build_dag(spec: &GraphSpec, config: SolverConfig) -> Result<TypeDependencyDag, SolverError> {
    let mut dag = TypeDependencyDag::new(config);
    for _ in 0..spec.nodes {
        dag.new_node()?;
    }
    for edge in &spec.edges {
        let rank = if edge.weak {
            EdgeRank::Weak
        } else {
            EdgeRank::Hard
        };
        dag.connect(NodeId(edge.from), NodeId(edge.to), rank)?;
    }
    dag.get_heads()?;
    Ok(dag)
}

fn load_graph(path: &Path) -> Result<GraphSpec, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read graph '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse graph '{}': {}", path.display(), e))
}

fn load_config(path: &Path) -> Result<SolverConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config '{}': {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("failed to parse config '{}': {}", path.display(), e))
}
