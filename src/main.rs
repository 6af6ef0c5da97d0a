//! # Butterfly-rail CLI
//!
//! Command-line interface for the butterfly-rail library.
//! Reads a railway network document, connects coincident ports, resolves
//! navigabilities and writes the augmented document back.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use butterfly_rail::{
    ConnectionStrategy, CrossingMode, FailurePolicy, InferenceConfig, Network, NetworkDocument,
    RunSummary, NAVIGABILITY_THRESHOLD_DEG,
};
use clap::{Parser, ValueEnum};
use log::{error, info};

mod cli;

/// Command-line interface for butterfly-rail
#[derive(Parser)]
#[command(name = "butterfly-rail")]
#[command(about = "Port connection and navigability inference for railway networks")]
#[command(long_about = "Infers port connections and navigabilities of a railway network:
  butterfly-rail network.json                 # Writes network-topology.json
  butterfly-rail network.json out.json        # Writes out.json
  butterfly-rail network.json - --diamond     # Crossings as diamonds, to stdout

Crossings (4 ports at one location) are read as double slip crossings unless
--diamond is given. A junction of 5 or more ports stops the run unless
--best-effort is given.")]
#[command(version = env!("BUTTERFLY_VERSION"))]
struct Cli {
    /// Network document (JSON)
    input: PathBuf,

    /// Output file path, or "-" for stdout
    #[arg(default_value = "")]
    output: String,

    /// Treat every crossing as a diamond crossing
    #[arg(long)]
    diamond: bool,

    /// Report unsupported junctions and keep going instead of stopping
    #[arg(long)]
    best_effort: bool,

    /// Coincidence detection algorithm
    #[arg(long, value_enum, default_value_t = StrategyArg::Grouped)]
    strategy: StrategyArg,

    /// Maximum deviation from a straight path, in degrees
    #[arg(long, default_value_t = NAVIGABILITY_THRESHOLD_DEG)]
    threshold: f64,

    /// Also write the run summary as JSON to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Only connect ports, do not resolve navigabilities
    #[arg(long)]
    connections_only: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Pairwise,
    Grouped,
    Parallel,
}

impl From<StrategyArg> for ConnectionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Pairwise => ConnectionStrategy::Pairwise,
            StrategyArg::Grouped => ConnectionStrategy::Grouped,
            StrategyArg::Parallel => ConnectionStrategy::Parallel,
        }
    }
}

/// Output destination types
#[derive(Debug, PartialEq)]
enum OutputDestination {
    File(PathBuf),
    Stdout,
}

/// Resolve output destination from CLI arguments
fn resolve_output(input: &Path, output: &str) -> OutputDestination {
    if output == "-" {
        OutputDestination::Stdout
    } else if output.is_empty() {
        // Auto-generate filename next to the input
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "network".to_string());
        OutputDestination::File(input.with_file_name(format!("{stem}-topology.json")))
    } else {
        OutputDestination::File(PathBuf::from(output))
    }
}

/// Whether two paths name the same file, however they are spelled.
/// The output may not exist yet, so its parent directory is resolved instead.
fn same_file(a: &Path, b: &Path) -> bool {
    fn resolve(path: &Path) -> Option<PathBuf> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        Some(std::fs::canonicalize(parent).ok()?.join(path.file_name()?))
    }

    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn main() {
    if let Err(e) = run() {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🦋 Butterfly-rail v{} starting...", env!("BUTTERFLY_VERSION"));
    }

    let output = resolve_output(&cli.input, &cli.output);
    if let OutputDestination::File(path) = &output {
        if same_file(&cli.input, path) {
            bail!("refusing to overwrite the input file {}", cli.input.display());
        }
    }

    let document = NetworkDocument::from_path(&cli.input)
        .with_context(|| format!("Failed to read network from {}", cli.input.display()))?;
    let mut network = Network::from_document(&document).context("Invalid network document")?;
    info!(
        "📂 Loaded {} elements and {} ports from {}",
        network.element_count(),
        network.port_count(),
        cli.input.display()
    );

    let mut config = InferenceConfig {
        crossing_mode: if cli.diamond {
            CrossingMode::Diamond
        } else {
            CrossingMode::DoubleSlip
        },
        failure_policy: if cli.best_effort {
            FailurePolicy::BestEffort
        } else {
            FailurePolicy::FailFast
        },
        connection_strategy: cli.strategy.into(),
        threshold_deg: cli.threshold,
        progress: None,
    };

    let summary = if cli.connections_only {
        butterfly_rail::connect(&mut network, &config)?
    } else {
        let progress_manager = cli::ProgressManager::new(
            network.port_count() as u64,
            "🚦 Resolving navigabilities",
        );
        config.progress = Some(progress_manager.callback());
        let result = butterfly_rail::infer(&mut network, &config);
        progress_manager.finish();
        result?
    };

    let augmented = NetworkDocument::from_network(&network);
    match &output {
        OutputDestination::File(path) => {
            augmented
                .to_path(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("💾 All data saved to {}", path.display());
        }
        OutputDestination::Stdout => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            augmented.to_writer(&mut handle)?;
            writeln!(handle)?;
        }
    }

    if let Some(path) = &cli.summary {
        write_summary(path, &summary)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    report(&summary);
    Ok(())
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    Ok(())
}

/// Human-readable run summary on stderr
fn report(summary: &RunSummary) {
    info!(
        "✅ {} ports, {} new connections, {} switches, {} crossings, {} dead ends",
        summary.ports_found,
        summary.connections_made,
        summary.switches,
        summary.crossings,
        summary.dead_ends
    );
    info!(
        "   {} navigable, {} non-navigable, {} warnings, {} errors",
        summary.navigable_edges,
        summary.non_navigable_edges,
        summary.warnings(),
        summary.errors()
    );
}
