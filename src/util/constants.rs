// sparkscan - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "sparkscan";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth below an application directory when
/// collecting log files.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 32;

/// Maximum number of log files collected in a single scan.
pub const DEFAULT_MAX_FILES: usize = 50_000;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 1_000_000;

/// Default include glob patterns for log file collection.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.log"];

/// Default exclude glob patterns for log file collection.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.gz", "*.zip", "*.tmp", "*.bak"];

// =============================================================================
// Classification
// =============================================================================

/// Input timestamp layout at the head of Spark log lines: `17/03/14 20:56:01`.
/// Two-digit years are always mapped into the 2000s (the dataset spans
/// 2015-2017); see `core::classify::parse_timestamp_prefix`.
pub const TIMESTAMP_INPUT_FORMAT: &str = "%y/%m/%d %H:%M:%S";

/// Canonical output timestamp layout, applied uniformly to every table and
/// summary: ISO-8601 date, a space, then the time of day.
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Sampling limits
// =============================================================================

/// Default reservoir capacity for the level-bearing line sample.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 10;

/// Hard upper bound on the reservoir capacity.
pub const ABSOLUTE_MAX_SAMPLE_CAPACITY: usize = 10_000;

/// Maximum bytes of a single sampled line retained in the reservoir.
/// Longer lines are truncated so a pathological single-line file cannot
/// grow the sample without bound.
pub const MAX_SAMPLED_LINE_BYTES: usize = 4 * 1024; // 4 KB

// =============================================================================
// Reporting
// =============================================================================

/// Default number of clusters listed in the usage stats summary.
pub const DEFAULT_TOP_CLUSTERS: usize = 10;

/// Hard upper bound on the top-clusters list length.
pub const ABSOLUTE_MAX_TOP_CLUSTERS: usize = 1_000;

/// Output file names, relative to the output directory.
pub const LEVEL_COUNTS_FILE: &str = "level_counts.csv";
pub const LEVEL_SAMPLE_FILE: &str = "level_sample.csv";
pub const TIMELINE_FILE: &str = "timeline.csv";
pub const CLUSTER_SUMMARY_FILE: &str = "cluster_summary.csv";
pub const LEVEL_SUMMARY_FILE: &str = "level_summary.txt";
pub const USAGE_STATS_FILE: &str = "usage_stats.txt";
pub const REPORT_JSON_FILE: &str = "report.json";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
