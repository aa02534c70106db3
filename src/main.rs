// sparkscan - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading (optional TOML file, CLI flags win)
// 3. Logging initialisation (debug mode support)
// 4. Running the scan pipeline and writing the report deliverables

use clap::Parser;
use sparkscan::app::{config, scan};
use sparkscan::util::{constants, logging};
use std::path::PathBuf;
use std::process;

/// sparkscan - batch analyser for extracted Spark-on-YARN log trees.
///
/// Point sparkscan at the root of an extracted log archive (the directory
/// holding application_<clusterId>_<appNumber> folders) to produce CSV and
/// plain-text deliverables: the global log-level distribution, a uniform
/// sample of level-bearing lines, per-application timelines, and
/// per-cluster usage summaries.
#[derive(Parser, Debug)]
#[command(name = "sparkscan", version, about)]
struct Cli {
    /// Root directory of the extracted log tree.
    root: PathBuf,

    /// Directory where the report files are written.
    #[arg(short = 'o', long = "output-dir", default_value = "output")]
    output_dir: PathBuf,

    /// Reservoir capacity for the sampled-lines table.
    #[arg(short = 'k', long = "sample-size")]
    sample_size: Option<usize>,

    /// RNG seed for a reproducible sample.
    #[arg(long)]
    seed: Option<u64>,

    /// Optional TOML configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Also write the full report as JSON.
    #[arg(long)]
    json: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Load config before logging init so the configured level can apply;
    // warnings are carried over and logged once tracing is up.
    let (mut cfg, config_warnings) = config::load_config(cli.config.as_deref());

    logging::init(cli.debug, cfg.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        root = %cli.root.display(),
        debug = cli.debug,
        "sparkscan starting"
    );

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // CLI flags win over config file values.
    if let Some(size) = cli.sample_size {
        cfg.sample_capacity = size.min(constants::ABSOLUTE_MAX_SAMPLE_CAPACITY);
    }
    if let Some(seed) = cli.seed {
        cfg.seed = Some(seed);
    }

    let outcome = match scan::run_scan(&cli.root, &cfg) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Scan failed");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    for warning in &outcome.warnings {
        tracing::warn!(warning = %warning, "Scan warning");
    }

    let written = match scan::write_reports(
        &outcome.report,
        &cli.output_dir,
        cfg.top_clusters,
        cli.json,
    ) {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(error = %e, "Writing reports failed");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    tracing::info!(
        applications = outcome.applications,
        files = outcome.files,
        lines = outcome.report.totals.lines_seen,
        elapsed_ms = outcome.duration.as_millis() as u64,
        "Scan complete"
    );

    println!(
        "Scanned {} applications ({} log files, {} lines) in {:.2?}",
        outcome.applications,
        outcome.files,
        outcome.report.totals.lines_seen,
        outcome.duration
    );
    println!("Wrote:");
    for path in &written {
        println!("  {}", path.display());
    }
}
