// sparkscan - app/scan.rs
//
// Scan pipeline driver. Orchestrates discovery and the two analysis
// passes, then owns file creation for the report deliverables.
//
// Pass structure:
//   1. Per-application aggregation -- embarrassingly parallel by entity,
//      partitioned with rayon and combined with Aggregate::merge (which is
//      associative and commutative, so the partitioning cannot change the
//      result).
//   2. Reservoir sampling -- strictly sequential over the same files in
//      discovery order, because the sampler consumes RNG state in stream
//      order and a fixed seed must reproduce the sample exactly.
//
// Per-line and per-file problems are absorbed as warnings; only a bad
// scan root or an unwritable output directory is fatal.

use crate::app::config::ScanConfig;
use crate::core::aggregate::Aggregate;
use crate::core::classify;
use crate::core::discovery::{self, DiscoveredApp};
use crate::core::model::ScanReport;
use crate::core::report;
use crate::core::sample::ReservoirSampler;
use crate::util::constants;
use crate::util::error::{Result, SparkscanError};
use rayon::prelude::*;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Result of a completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Finished aggregates, ready for the emitters.
    pub report: ScanReport,
    /// Non-fatal problems encountered along the way.
    pub warnings: Vec<String>,
    /// Application directories scanned.
    pub applications: usize,
    /// Log files scanned.
    pub files: usize,
    /// Wall-clock scan duration.
    pub duration: Duration,
}

/// Full scan pipeline: discovery, aggregation pass, sampling pass,
/// finalisation.
pub fn run_scan(root: &Path, config: &ScanConfig) -> Result<ScanOutcome> {
    let started = Instant::now();

    let (apps, mut warnings) =
        discovery::discover_applications(root, &config.discovery_config())?;
    let file_count: usize = apps.iter().map(|a| a.log_files.len()).sum();

    tracing::info!(
        applications = apps.len(),
        files = file_count,
        "Discovery complete, aggregating"
    );

    // Pass 1: per-application timestamp ranges and global level counts.
    // Partial aggregates are collected in application order and folded
    // with merge, so warnings and results are deterministic.
    let partials: Vec<(Aggregate, Vec<String>)> =
        apps.par_iter().map(aggregate_application).collect();

    let mut aggregate = Aggregate::new();
    for (partial, mut partial_warnings) in partials {
        aggregate = aggregate.merge(partial);
        warnings.append(&mut partial_warnings);
    }

    // Pass 2: uniform sample of level-bearing lines, sequential so the
    // seeded RNG replays identically run to run.
    let mut sampler = ReservoirSampler::new(config.sample_capacity, config.seed);
    for app in &apps {
        for file in &app.log_files {
            let lines = match read_lines_lossy(file) {
                Ok(lines) => lines,
                Err(e) => {
                    // Already reported by the aggregation pass; keep the
                    // sampling pass quiet about it.
                    tracing::debug!(file = %file.display(), error = %e, "Sampling pass skip");
                    continue;
                }
            };
            for line in &lines {
                if let Some(severity) = classify::detect_severity(line) {
                    sampler.observe(line, severity);
                }
            }
        }
    }

    tracing::info!(
        lines = aggregate.totals.lines_seen,
        level_lines = aggregate.totals.level_lines,
        sampled = sampler.snapshot().len(),
        "Aggregation complete"
    );

    let report = aggregate.finalize(sampler.into_sample());

    Ok(ScanOutcome {
        report,
        warnings,
        applications: apps.len(),
        files: file_count,
        duration: started.elapsed(),
    })
}

/// Scans one application directory into a partial aggregate.
///
/// Unreadable files become warnings; lines that classify to nothing
/// still count toward the line total but contribute nothing else.
fn aggregate_application(app: &DiscoveredApp) -> (Aggregate, Vec<String>) {
    let mut aggregate = Aggregate::new();
    let mut warnings = Vec::new();

    for file in &app.log_files {
        let lines = match read_lines_lossy(file) {
            Ok(lines) => lines,
            Err(e) => {
                let msg = format!("Cannot read '{}': {e}", file.display());
                tracing::warn!(warning = %msg, "Log file read failed");
                warnings.push(msg);
                continue;
            }
        };
        for line in &lines {
            aggregate.update(&app.id, &classify::classify(line));
        }
    }

    (aggregate, warnings)
}

/// Reads a log file as lines, replacing invalid UTF-8 rather than
/// failing: Spark worker logs occasionally embed odd bytes and a single
/// bad sequence must not discard the file.
fn read_lines_lossy(path: &Path) -> std::io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

// =============================================================================
// Report writing
// =============================================================================

/// Writes the report deliverables under `out_dir`, creating it if needed.
/// Returns the paths written, in a fixed order.
pub fn write_reports(
    report: &ScanReport,
    out_dir: &Path,
    top_clusters: usize,
    include_json: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| SparkscanError::Io {
        path: out_dir.to_path_buf(),
        operation: "create output directory",
        source: e,
    })?;

    let mut written: Vec<PathBuf> = Vec::new();

    let path = out_dir.join(constants::LEVEL_COUNTS_FILE);
    report::write_severity_counts(report, create_writer(&path)?, &path)?;
    written.push(path);

    let path = out_dir.join(constants::LEVEL_SAMPLE_FILE);
    report::write_sample(report, create_writer(&path)?, &path)?;
    written.push(path);

    let path = out_dir.join(constants::TIMELINE_FILE);
    report::write_timeline(report, create_writer(&path)?, &path)?;
    written.push(path);

    let path = out_dir.join(constants::CLUSTER_SUMMARY_FILE);
    report::write_cluster_summary(report, create_writer(&path)?, &path)?;
    written.push(path);

    let path = out_dir.join(constants::LEVEL_SUMMARY_FILE);
    report::write_level_summary(report, create_writer(&path)?, &path)?;
    written.push(path);

    let path = out_dir.join(constants::USAGE_STATS_FILE);
    report::write_usage_stats(report, top_clusters, create_writer(&path)?, &path)?;
    written.push(path);

    if include_json {
        let path = out_dir.join(constants::REPORT_JSON_FILE);
        report::write_report_json(report, create_writer(&path)?, &path)?;
        written.push(path);
    }

    tracing::info!(files = written.len(), dir = %out_dir.display(), "Reports written");
    Ok(written)
}

fn create_writer(path: &Path) -> Result<BufWriter<fs::File>> {
    let file = fs::File::create(path).map_err(|e| SparkscanError::Io {
        path: path.to_path_buf(),
        operation: "create report file",
        source: e,
    })?;
    Ok(BufWriter::new(file))
}
