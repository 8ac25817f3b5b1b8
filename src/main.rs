//! treebench - parallel directory walk and hashing benchmark.
//!
//! Usage:
//!   treebench PATH                    Sweep 1, 2, 4 and all cores, without then with hashing
//!   treebench PATH -t 8 -t 16         Sweep explicit pool sizes
//!   treebench PATH --hash-only        Only the hashing runs
//!   treebench PATH --format json      Emit the run reports as JSON
//!   treebench --help                  Show help

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use treebench_walk::{BenchmarkHarness, DEFAULT_SMALL_FILE_THRESHOLD, WalkConfig, WalkReport};

#[derive(Parser)]
#[command(
    name = "treebench",
    version,
    about = "Measure how directory walking and hashing scale with parallelism",
    long_about = "treebench walks a directory tree with one task per directory on a \
                  work-stealing pool, counting files and optionally hashing them, and \
                  reports how long each pool size takes."
)]
struct Cli {
    /// Directory to walk
    path: Option<PathBuf>,

    /// Print every computed digest next to its file path
    #[arg(long, env = "TREEBENCH_PRINT_DIGESTS")]
    print_digests: bool,

    /// Print every directory as it is visited
    #[arg(long, env = "TREEBENCH_PRINT_DIRS")]
    print_dirs: bool,

    /// Pool sizes to sweep (repeatable; defaults to 1, 2, 4 and all cores)
    #[arg(short, long = "threads")]
    threads: Vec<usize>,

    /// Files smaller than this are read whole; larger ones are streamed in chunks of this size
    #[arg(long, default_value_t = DEFAULT_SMALL_FILE_THRESHOLD)]
    threshold: u64,

    /// Additional directory suffix to skip (repeatable)
    #[arg(short, long)]
    exclude: Vec<PathBuf>,

    /// Do not skip the built-in suffixes (.git, out/classes, ...)
    #[arg(long)]
    no_default_excludes: bool,

    /// Only run with hashing enabled
    #[arg(long, conflicts_with = "walk_only")]
    hash_only: bool,

    /// Only run without hashing
    #[arg(long)]
    walk_only: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let Some(path) = cli.path.as_ref() else {
        println!("Choose a directory where to go");
        return Ok(());
    };

    check_output(&cli)?;
    let root = path.canonicalize().context("Invalid path")?;
    let config = build_config(&cli, root.clone())?;
    debug!(root = %root.display(), levels = ?cli.threads, "Starting benchmark");

    let harness = BenchmarkHarness::new(config).with_hash_modes(hash_modes(&cli));
    let harness = if cli.threads.is_empty() {
        harness
    } else {
        harness.with_levels(cli.threads.iter().copied())
    };

    match cli.format {
        OutputFormat::Text => {
            println!("Walking on {}", root.display());
            harness
                .run_with(print_report)
                .context("Benchmark failed")?;
        }
        OutputFormat::Json => {
            let reports = harness.run().context("Benchmark failed")?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    Ok(())
}

/// Digest and directory printing write to stdout, which JSON output owns.
fn check_output(cli: &Cli) -> Result<()> {
    if matches!(cli.format, OutputFormat::Json) && (cli.print_digests || cli.print_dirs) {
        bail!("--print-digests and --print-dirs cannot be combined with --format json");
    }
    Ok(())
}

fn build_config(cli: &Cli, root: PathBuf) -> Result<WalkConfig> {
    let mut exclude = if cli.no_default_excludes {
        Vec::new()
    } else {
        treebench_core::default_excludes()
    };
    exclude.extend(cli.exclude.iter().cloned());

    WalkConfig::builder()
        .root(root)
        .small_file_threshold(cli.threshold)
        .exclude(exclude)
        .print_digests(cli.print_digests)
        .print_dirs(cli.print_dirs)
        .build()
        .context("Invalid configuration")
}

fn hash_modes(cli: &Cli) -> Vec<bool> {
    match (cli.walk_only, cli.hash_only) {
        (true, _) => vec![false],
        (_, true) => vec![true],
        _ => vec![false, true],
    }
}

fn print_report(report: &WalkReport) {
    if report.root_failed {
        eprintln!("Walk of {} failed at the root", report.root.display());
    }
    println!("{}", report.summary_line());
}

fn log_directives(verbose: bool) -> &'static str {
    if verbose {
        "treebench=debug,warn"
    } else {
        "treebench=info,warn"
    }
}

fn setup_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directives(verbose)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
