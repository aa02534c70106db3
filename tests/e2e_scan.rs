// sparkscan - tests/e2e_scan.rs
//
// End-to-end tests for the scan pipeline.
//
// These tests exercise the real filesystem, real walkdir traversal, real
// chrono timestamp parsing, and the real emitters -- no mocks, no stubs.
// This covers the full path from raw log files on disk to the CSV and
// plain-text deliverables.

use sparkscan::app::config::ScanConfig;
use sparkscan::app::scan::{run_scan, write_reports};
use sparkscan::core::report;
use sparkscan::util::constants;
use sparkscan::util::error::{DiscoveryError, SparkscanError};
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Helpers
// =============================================================================

/// Creates an application directory with one log file per (name, content).
fn write_app(root: &Path, cluster: &str, number: &str, files: &[(&str, &str)]) {
    let dir = root.join(format!("application_{cluster}_{number}"));
    fs::create_dir_all(&dir).expect("create app dir");
    for (name, content) in files {
        fs::write(dir.join(name), content).expect("write log file");
    }
}

fn seeded(seed: u64) -> ScanConfig {
    ScanConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

/// Renders every deliverable of a report into one concatenated string.
fn render_all(report: &sparkscan::core::model::ScanReport) -> String {
    let path = PathBuf::from("e2e");
    let mut out = Vec::new();
    report::write_severity_counts(report, &mut out, &path).unwrap();
    report::write_sample(report, &mut out, &path).unwrap();
    report::write_timeline(report, &mut out, &path).unwrap();
    report::write_cluster_summary(report, &mut out, &path).unwrap();
    report::write_level_summary(report, &mut out, &path).unwrap();
    report::write_usage_stats(report, 10, &mut out, &path).unwrap();
    report::write_report_json(report, &mut out, &path).unwrap();
    String::from_utf8(out).unwrap()
}

// =============================================================================
// Timeline semantics
// =============================================================================

/// Two stamped lines, 149 seconds apart, under application_123_0007 must
/// produce exactly that timeline row with canonicalised timestamps.
#[test]
fn e2e_timeline_duration_from_two_stamped_lines() {
    let dir = tempfile::tempdir().unwrap();
    write_app(
        dir.path(),
        "123",
        "0007",
        &[(
            "container.log",
            "17/03/14 20:56:01 INFO start app_0007\n\
             17/03/14 20:58:30 INFO end app_0007\n",
        )],
    );

    let outcome = run_scan(dir.path(), &seeded(42)).unwrap();
    let report = &outcome.report;

    assert_eq!(report.timeline.len(), 1);
    let row = &report.timeline[0];
    assert_eq!(row.id.cluster_id, "123");
    assert_eq!(row.id.app_number, "0007");
    assert_eq!(row.duration_seconds, 149);

    let mut csv = Vec::new();
    report::write_timeline(report, &mut csv, Path::new("timeline.csv")).unwrap();
    assert_eq!(
        String::from_utf8(csv).unwrap(),
        "cluster_id,app_number,start_time,end_time,duration_seconds\n\
         123,0007,2017-03-14 20:56:01,2017-03-14 20:58:30,149\n"
    );
}

/// Out-of-order timestamps across several files still yield the
/// min..max range, and earliest <= latest for every row.
#[test]
fn e2e_timeline_range_spans_all_files() {
    let dir = tempfile::tempdir().unwrap();
    write_app(
        dir.path(),
        "1485248649253",
        "0052",
        &[
            ("c2.log", "17/03/14 12:00:00 INFO middle\n"),
            ("c1.log", "17/03/14 18:30:00 INFO late\n17/03/14 08:15:00 INFO early\n"),
        ],
    );

    let outcome = run_scan(dir.path(), &seeded(0)).unwrap();
    let row = &outcome.report.timeline[0];
    assert_eq!(
        row.start.format("%H:%M:%S").to_string(),
        "08:15:00",
        "earliest across all files"
    );
    assert_eq!(row.end.format("%H:%M:%S").to_string(), "18:30:00");
    assert!(row.start <= row.end);
    assert!(row.duration_seconds >= 0);
}

/// An application with no parseable timestamps is excluded from the
/// timeline and the cluster roll-up, but its lines still count.
#[test]
fn e2e_unstamped_application_excluded_from_duration_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write_app(
        dir.path(),
        "123",
        "0001",
        &[("c.log", "17/03/14 10:00:00 INFO stamped\n")],
    );
    write_app(
        dir.path(),
        "999",
        "0001",
        &[("c.log", "INFO no timestamp on this line\nnor on this one\n")],
    );

    let outcome = run_scan(dir.path(), &seeded(0)).unwrap();
    let report = &outcome.report;

    assert_eq!(report.timeline.len(), 1);
    assert_eq!(report.clusters.len(), 1);
    assert_eq!(report.clusters[0].cluster_id, "123");
    assert_eq!(report.totals.lines_seen, 3);
    assert_eq!(report.totals.level_lines, 2);
}

// =============================================================================
// Cluster summary semantics
// =============================================================================

/// Six distinct clusters produce exactly six rows, sorted by application
/// count descending with cluster id ascending as tiebreak.
#[test]
fn e2e_six_clusters_sorted_by_usage() {
    let dir = tempfile::tempdir().unwrap();
    // Cluster ids with descending app counts 6,5,...,1; two of the counts
    // collide with none so ordering is purely by count here.
    let clusters: [(&str, usize); 6] = [
        ("1111", 2),
        ("2222", 6),
        ("3333", 1),
        ("4444", 4),
        ("5555", 3),
        ("6666", 5),
    ];
    for (cluster, apps) in clusters {
        for n in 0..apps {
            write_app(
                dir.path(),
                cluster,
                &format!("{:04}", n + 1),
                &[("c.log", "17/05/01 00:00:00 INFO tick\n")],
            );
        }
    }

    let outcome = run_scan(dir.path(), &seeded(0)).unwrap();
    let summary: Vec<(String, usize)> = outcome
        .report
        .clusters
        .iter()
        .map(|c| (c.cluster_id.clone(), c.app_count))
        .collect();

    assert_eq!(summary.len(), 6);
    assert_eq!(
        summary,
        [
            ("2222".to_string(), 6),
            ("6666".to_string(), 5),
            ("4444".to_string(), 4),
            ("5555".to_string(), 3),
            ("1111".to_string(), 2),
            ("3333".to_string(), 1),
        ]
    );
}

/// The cluster summary must reconstruct exactly from the timeline table:
/// counting timeline rows per cluster gives each cluster's app_count.
#[test]
fn e2e_cluster_summary_reconstructs_from_timeline() {
    let dir = tempfile::tempdir().unwrap();
    write_app(dir.path(), "10", "0001", &[("c.log", "17/01/01 01:00:00 INFO x\n")]);
    write_app(dir.path(), "10", "0002", &[("c.log", "17/01/02 01:00:00 INFO x\n")]);
    write_app(dir.path(), "10", "0003", &[("c.log", "17/01/03 01:00:00 INFO x\n")]);
    write_app(dir.path(), "20", "0001", &[("c.log", "17/02/01 01:00:00 INFO x\n")]);

    let outcome = run_scan(dir.path(), &seeded(0)).unwrap();
    let report = &outcome.report;

    let mut from_timeline: std::collections::HashMap<&str, usize> =
        std::collections::HashMap::new();
    for row in &report.timeline {
        *from_timeline.entry(row.id.cluster_id.as_str()).or_default() += 1;
    }

    assert_eq!(report.clusters.len(), from_timeline.len());
    for cluster in &report.clusters {
        assert_eq!(
            cluster.app_count,
            from_timeline[cluster.cluster_id.as_str()],
            "cluster {} count mismatch",
            cluster.cluster_id
        );
    }

    // First/last activity: cluster 10 spans Jan 1 to Jan 3.
    let c10 = report
        .clusters
        .iter()
        .find(|c| c.cluster_id == "10")
        .unwrap();
    assert_eq!(c10.first_app.format("%Y-%m-%d").to_string(), "2017-01-01");
    assert_eq!(c10.last_app.format("%Y-%m-%d").to_string(), "2017-01-03");
}

// =============================================================================
// Counts and sampling
// =============================================================================

/// The severity counts are bounded by the line total, with equality only
/// when every line carries a token; the sample is capped at its capacity.
#[test]
fn e2e_counts_and_sample_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let mut content = String::new();
    for i in 0..100 {
        content.push_str(&format!("17/03/14 10:00:{:02} INFO line {i}\n", i % 60));
    }
    content.push_str("a line with no level at all\n");
    write_app(dir.path(), "123", "0001", &[("c.log", &content)]);

    let outcome = run_scan(dir.path(), &seeded(9)).unwrap();
    let report = &outcome.report;

    assert_eq!(report.totals.lines_seen, 101);
    assert_eq!(report.totals.level_lines, 100);
    let count_sum: u64 = report.level_counts.iter().map(|lc| lc.count).sum();
    assert!(count_sum <= report.totals.lines_seen);
    assert_eq!(count_sum, 100);

    assert_eq!(
        report.sample.len(),
        constants::DEFAULT_SAMPLE_CAPACITY,
        "sample capped at the reservoir capacity"
    );
}

/// Re-running the full scan on identical input yields byte-identical
/// deliverables when the seed is fixed.
#[test]
fn e2e_outputs_are_idempotent_under_fixed_seed() {
    let dir = tempfile::tempdir().unwrap();
    for n in 1..=5 {
        let mut content = String::new();
        for i in 0..30 {
            let level = ["INFO", "WARN", "ERROR"][i % 3];
            content.push_str(&format!("17/06/{:02} 12:00:00 {level} event {i}\n", n));
        }
        write_app(dir.path(), "777", &format!("{n:04}"), &[("c.log", &content)]);
    }

    let first = run_scan(dir.path(), &seeded(1234)).unwrap();
    let second = run_scan(dir.path(), &seeded(1234)).unwrap();
    assert_eq!(render_all(&first.report), render_all(&second.report));

    // A different seed may legitimately pick a different sample, but the
    // tables that do not depend on the RNG must not move.
    let other = run_scan(dir.path(), &seeded(4321)).unwrap();
    assert_eq!(first.report.level_counts, other.report.level_counts);
    assert_eq!(first.report.timeline, other.report.timeline);
    assert_eq!(first.report.clusters, other.report.clusters);
}

// =============================================================================
// Error taxonomy
// =============================================================================

/// A missing scan root is the one fatal input condition.
#[test]
fn e2e_missing_root_is_fatal() {
    let result = run_scan(
        Path::new("/nonexistent/sparkscan-e2e-root"),
        &ScanConfig::default(),
    );
    assert!(
        matches!(
            result,
            Err(SparkscanError::Discovery(DiscoveryError::RootNotFound { .. }))
        ),
        "expected RootNotFound, got {result:?}"
    );
}

/// Malformed application directory names are warnings, not errors, and
/// do not contaminate the aggregates.
#[test]
fn e2e_malformed_application_dir_warns_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_app(dir.path(), "123", "0001", &[("c.log", "17/03/14 10:00:00 INFO ok\n")]);
    let odd = dir.path().join("application_weird");
    fs::create_dir(&odd).unwrap();
    fs::write(odd.join("c.log"), "17/03/14 10:00:00 ERROR ignored\n").unwrap();

    let outcome = run_scan(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(outcome.applications, 1);
    assert!(
        outcome.warnings.iter().any(|w| w.contains("application_weird")),
        "warnings: {:?}",
        outcome.warnings
    );
    // The malformed directory's lines were never ingested.
    assert_eq!(outcome.report.totals.lines_seen, 1);
    let errors = outcome
        .report
        .level_counts
        .iter()
        .find(|lc| lc.level.token() == "ERROR")
        .unwrap();
    assert_eq!(errors.count, 0);
}

/// An empty tree is valid: header-only tables, empty summaries, no error.
#[test]
fn e2e_empty_root_writes_header_only_tables() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = run_scan(dir.path(), &ScanConfig::default()).unwrap();
    assert_eq!(outcome.applications, 0);

    let out = tempfile::tempdir().unwrap();
    let written = write_reports(&outcome.report, out.path(), 10, false).unwrap();
    assert_eq!(written.len(), 6);

    let counts = fs::read_to_string(out.path().join(constants::LEVEL_COUNTS_FILE)).unwrap();
    assert_eq!(counts, "log_level,count\nINFO,0\nWARN,0\nERROR,0\nDEBUG,0\n");
    let timeline = fs::read_to_string(out.path().join(constants::TIMELINE_FILE)).unwrap();
    assert_eq!(
        timeline,
        "cluster_id,app_number,start_time,end_time,duration_seconds\n"
    );
    let stats = fs::read_to_string(out.path().join(constants::USAGE_STATS_FILE)).unwrap();
    assert!(stats.contains("Total unique clusters: 0"));
}

/// Full disk round trip: write all deliverables and spot-check them.
#[test]
fn e2e_deliverables_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_app(
        dir.path(),
        "42",
        "0001",
        &[(
            "c.log",
            "17/03/14 08:00:00 INFO up\n\
             17/03/14 08:00:01 WARN wobbly, with \"quotes\" inside\n\
             17/03/14 08:00:02 ERROR down\n",
        )],
    );

    let outcome = run_scan(dir.path(), &seeded(5)).unwrap();
    let out = tempfile::tempdir().unwrap();
    let written = write_reports(&outcome.report, out.path(), 10, true).unwrap();
    assert_eq!(written.len(), 7);

    let sample = fs::read_to_string(out.path().join(constants::LEVEL_SAMPLE_FILE)).unwrap();
    assert!(
        sample.contains(r#""17/03/14 08:00:01 WARN wobbly, with ""quotes"" inside",WARN"#),
        "quoted sample row expected:\n{sample}"
    );

    let json = fs::read_to_string(out.path().join(constants::REPORT_JSON_FILE)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["timeline"][0]["duration_seconds"], 2);
    assert_eq!(value["clusters"][0]["cluster_id"], "42");

    let summary = fs::read_to_string(out.path().join(constants::LEVEL_SUMMARY_FILE)).unwrap();
    assert!(summary.contains("Total log lines processed: 3"));
    assert!(summary.contains("Unique log levels found: 3"));
}
