// sparkscan - core/report.rs
//
// Serialisation of finished aggregates to CSV, plain-text, and JSON
// deliverables. Core layer: writes to any Write trait object; the app
// layer owns file creation. All emitters are pure and order-preserving.

use crate::core::model::ScanReport;
use crate::util::constants;
use crate::util::error::ReportError;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::Path;

/// Canonical timestamp rendering used by every table and summary.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format(constants::TIMESTAMP_OUTPUT_FORMAT).to_string()
}

/// Percentage of `x` in `denom`, `0.00%` when the denominator is zero.
fn percent(x: u64, denom: u64) -> String {
    if denom == 0 {
        "0.00%".to_string()
    } else {
        format!("{:.2}%", (x as f64 / denom as f64) * 100.0)
    }
}

// =============================================================================
// CSV tables
// =============================================================================

/// Global level distribution: one row per severity in canonical order,
/// zero-count levels included.
pub fn write_severity_counts<W: Write>(
    report: &ScanReport,
    writer: W,
    path: &Path,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["log_level", "count"])
        .map_err(|e| ReportError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for lc in &report.level_counts {
        csv_writer
            .write_record([lc.level.token(), &lc.count.to_string()])
            .map_err(|e| ReportError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Reservoir sample: rows in reservoir order (not input order). The csv
/// writer performs RFC-4180 quoting of embedded quotes and separators.
pub fn write_sample<W: Write>(
    report: &ScanReport,
    writer: W,
    path: &Path,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["log_entry", "log_level"])
        .map_err(|e| ReportError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for line in &report.sample {
        csv_writer
            .write_record([line.text.as_str(), line.severity.token()])
            .map_err(|e| ReportError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Per-application timeline, sorted by cluster id then app number.
pub fn write_timeline<W: Write>(
    report: &ScanReport,
    writer: W,
    path: &Path,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record([
            "cluster_id",
            "app_number",
            "start_time",
            "end_time",
            "duration_seconds",
        ])
        .map_err(|e| ReportError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for row in &report.timeline {
        csv_writer
            .write_record([
                row.id.cluster_id.as_str(),
                row.id.app_number.as_str(),
                &format_ts(&row.start),
                &format_ts(&row.end),
                &row.duration_seconds.to_string(),
            ])
            .map_err(|e| ReportError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

/// Per-cluster usage summary, sorted by application count descending
/// (ties broken by cluster id ascending).
pub fn write_cluster_summary<W: Write>(
    report: &ScanReport,
    writer: W,
    path: &Path,
) -> Result<usize, ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["cluster_id", "app_count", "first_app", "last_app"])
        .map_err(|e| ReportError::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut count = 0;
    for cluster in &report.clusters {
        csv_writer
            .write_record([
                cluster.cluster_id.as_str(),
                &cluster.app_count.to_string(),
                &format_ts(&cluster.first_app),
                &format_ts(&cluster.last_app),
            ])
            .map_err(|e| ReportError::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
        count += 1;
    }

    csv_writer.flush().map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(count)
}

// =============================================================================
// Plain-text summaries
// =============================================================================

/// Level distribution summary with percentages of level-bearing lines.
pub fn write_level_summary<W: Write>(
    report: &ScanReport,
    mut writer: W,
    path: &Path,
) -> Result<(), ReportError> {
    let io_err = |e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let totals = &report.totals;
    let unique = report.level_counts.iter().filter(|lc| lc.count > 0).count();

    writeln!(writer, "Total log lines processed: {}", totals.lines_seen).map_err(io_err)?;
    writeln!(writer, "Total lines with log levels: {}", totals.level_lines).map_err(io_err)?;
    writeln!(writer, "Unique log levels found: {unique}").map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;
    writeln!(writer, "Log level distribution:").map_err(io_err)?;
    for lc in &report.level_counts {
        writeln!(
            writer,
            "  {:<5}: {:>10} ({})",
            lc.level.token(),
            lc.count,
            percent(lc.count, totals.level_lines)
        )
        .map_err(io_err)?;
    }

    Ok(())
}

/// Cluster usage stats: totals, the per-cluster average, and the
/// most heavily used clusters (at most `top_n` of them).
pub fn write_usage_stats<W: Write>(
    report: &ScanReport,
    top_n: usize,
    mut writer: W,
    path: &Path,
) -> Result<(), ReportError> {
    let io_err = |e| ReportError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    let num_clusters = report.clusters.len();
    let num_apps: usize = report.clusters.iter().map(|c| c.app_count).sum();
    let avg = if num_clusters == 0 {
        0.0
    } else {
        num_apps as f64 / num_clusters as f64
    };

    writeln!(writer, "Total unique clusters: {num_clusters}").map_err(io_err)?;
    writeln!(writer, "Total applications: {num_apps}").map_err(io_err)?;
    writeln!(writer, "Average applications per cluster: {avg:.2}").map_err(io_err)?;
    writeln!(writer).map_err(io_err)?;
    writeln!(writer, "Most heavily used clusters:").map_err(io_err)?;
    for cluster in report.clusters.iter().take(top_n) {
        writeln!(
            writer,
            "  Cluster {}: {} applications",
            cluster.cluster_id, cluster.app_count
        )
        .map_err(io_err)?;
    }

    Ok(())
}

// =============================================================================
// JSON
// =============================================================================

/// Full report as a machine-readable JSON document.
pub fn write_report_json<W: Write>(
    report: &ScanReport,
    writer: W,
    path: &Path,
) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, report).map_err(|e| ReportError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{
        ApplicationId, ClusterSummary, LevelCount, LineTotals, SampledLine, ScanReport, Severity,
        TimelineRow,
    };
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn ts(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 14, h, m, s).unwrap()
    }

    fn out_path() -> PathBuf {
        PathBuf::from("out.csv")
    }

    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), ReportError>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample_report() -> ScanReport {
        ScanReport {
            totals: LineTotals {
                lines_seen: 8,
                level_lines: 4,
            },
            level_counts: vec![
                LevelCount { level: Severity::Info, count: 3 },
                LevelCount { level: Severity::Warn, count: 0 },
                LevelCount { level: Severity::Error, count: 1 },
                LevelCount { level: Severity::Debug, count: 0 },
            ],
            sample: vec![
                SampledLine {
                    text: "plain line".to_string(),
                    severity: Severity::Info,
                },
                SampledLine {
                    text: r#"said "hi", twice"#.to_string(),
                    severity: Severity::Error,
                },
            ],
            timeline: vec![
                TimelineRow {
                    id: ApplicationId {
                        cluster_id: "123".to_string(),
                        app_number: "0007".to_string(),
                    },
                    start: ts(20, 56, 1),
                    end: ts(20, 58, 30),
                    duration_seconds: 149,
                },
                TimelineRow {
                    id: ApplicationId {
                        cluster_id: "456".to_string(),
                        app_number: "0001".to_string(),
                    },
                    start: ts(9, 0, 0),
                    end: ts(9, 0, 0),
                    duration_seconds: 0,
                },
            ],
            clusters: vec![
                ClusterSummary {
                    cluster_id: "123".to_string(),
                    app_count: 1,
                    first_app: ts(20, 56, 1),
                    last_app: ts(20, 58, 30),
                },
                ClusterSummary {
                    cluster_id: "456".to_string(),
                    app_count: 1,
                    first_app: ts(9, 0, 0),
                    last_app: ts(9, 0, 0),
                },
            ],
        }
    }

    #[test]
    fn test_severity_counts_canonical_order_with_zeros() {
        let report = sample_report();
        let out = emit(|buf| write_severity_counts(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(out, "log_level,count\nINFO,3\nWARN,0\nERROR,1\nDEBUG,0\n");
    }

    #[test]
    fn test_sample_rows_are_quoted_per_rfc_4180() {
        let report = sample_report();
        let out = emit(|buf| write_sample(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(
            out,
            "log_entry,log_level\nplain line,INFO\n\"said \"\"hi\"\", twice\",ERROR\n"
        );
    }

    #[test]
    fn test_timeline_rows_and_canonical_timestamps() {
        let report = sample_report();
        let out = emit(|buf| write_timeline(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(
            out,
            "cluster_id,app_number,start_time,end_time,duration_seconds\n\
             123,0007,2017-03-14 20:56:01,2017-03-14 20:58:30,149\n\
             456,0001,2017-03-14 09:00:00,2017-03-14 09:00:00,0\n"
        );
    }

    #[test]
    fn test_cluster_summary_rows() {
        let report = sample_report();
        let out = emit(|buf| write_cluster_summary(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(
            out,
            "cluster_id,app_count,first_app,last_app\n\
             123,1,2017-03-14 20:56:01,2017-03-14 20:58:30\n\
             456,1,2017-03-14 09:00:00,2017-03-14 09:00:00\n"
        );
    }

    #[test]
    fn test_level_summary_text() {
        let report = sample_report();
        let out = emit(|buf| write_level_summary(&report, buf, &out_path()));
        assert!(out.contains("Total log lines processed: 8"));
        assert!(out.contains("Total lines with log levels: 4"));
        assert!(out.contains("Unique log levels found: 2"));
        assert!(out.contains("INFO : "));
        assert!(out.contains("(75.00%)"), "3 of 4 level lines are INFO:\n{out}");
        assert!(out.contains("(0.00%)"), "zero-count levels show 0.00%:\n{out}");
    }

    #[test]
    fn test_level_summary_zero_denominator() {
        let report = ScanReport::default();
        let out = emit(|buf| write_level_summary(&report, buf, &out_path()));
        assert!(out.contains("Total log lines processed: 0"));
        assert!(!out.contains("NaN"));
    }

    #[test]
    fn test_usage_stats_text_and_top_n_cap() {
        let report = sample_report();
        let out = emit(|buf| write_usage_stats(&report, 10, buf, &out_path()));
        assert!(out.contains("Total unique clusters: 2"));
        assert!(out.contains("Total applications: 2"));
        assert!(out.contains("Average applications per cluster: 1.00"));
        assert!(out.contains("Cluster 123: 1 applications"));

        let capped = emit(|buf| write_usage_stats(&report, 1, buf, &out_path()));
        assert!(capped.contains("Cluster 123"));
        assert!(!capped.contains("Cluster 456"), "top_n=1 lists one cluster");
    }

    #[test]
    fn test_empty_report_yields_header_only_tables() {
        let report = ScanReport::default();
        let counts = emit(|buf| write_severity_counts(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(counts, "log_level,count\n");
        let timeline = emit(|buf| write_timeline(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(
            timeline,
            "cluster_id,app_number,start_time,end_time,duration_seconds\n"
        );
        let clusters = emit(|buf| write_cluster_summary(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(clusters, "cluster_id,app_count,first_app,last_app\n");
        let sample = emit(|buf| write_sample(&report, buf, &out_path()).map(|_| ()));
        assert_eq!(sample, "log_entry,log_level\n");
    }

    #[test]
    fn test_json_report_contains_all_sections() {
        let report = sample_report();
        let out = emit(|buf| write_report_json(&report, buf, &out_path()));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("totals").is_some());
        assert_eq!(value["level_counts"][0]["level"], "INFO");
        assert_eq!(value["timeline"][0]["duration_seconds"], 149);
        assert_eq!(value["clusters"].as_array().unwrap().len(), 2);
    }
}
