// sparkscan - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// filesystem dependencies; these types are the shared vocabulary across
// classification, aggregation, and reporting.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// Recognised log levels, in canonical emission order.
///
/// Only these four whole-word tokens count as levels; anything else on a
/// line (including near-misses like "INFORMATION") is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Debug,
}

impl Severity {
    /// All variants in canonical emission order: INFO, WARN, ERROR, DEBUG.
    pub fn all() -> &'static [Severity] {
        &[
            Severity::Info,
            Severity::Warn,
            Severity::Error,
            Severity::Debug,
        ]
    }

    /// The exact token as it appears in log lines.
    pub fn token(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Debug => "DEBUG",
        }
    }

    /// Maps a matched token back to its variant. Case-sensitive.
    pub fn from_token(raw: &str) -> Option<Severity> {
        match raw {
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "DEBUG" => Some(Severity::Debug),
            _ => None,
        }
    }

    /// Stable slot index for `SeverityCounts`.
    fn index(&self) -> usize {
        match self {
            Severity::Info => 0,
            Severity::Warn => 1,
            Severity::Error => 2,
            Severity::Debug => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// =============================================================================
// Classified line
// =============================================================================

/// The derived fields of a single log line: an optional recognised level
/// and an optional parsed timestamp prefix. Both absent is the expected
/// outcome for many lines and carries no error meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifiedLine {
    pub severity: Option<Severity>,
    pub timestamp: Option<DateTime<Utc>>,
}

// =============================================================================
// Application identity
// =============================================================================

/// Identity of one application run, extracted from a directory named
/// `application_<clusterId>_<appNumber>`.
///
/// Both components are digit strings. `app_number` keeps its zero padding
/// so emitted rows match the on-disk directory names, but ordering is
/// numeric (see `cmp_digit_strings`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ApplicationId {
    pub cluster_id: String,
    pub app_number: String,
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "application_{}_{}", self.cluster_id, self.app_number)
    }
}

impl Ord for ApplicationId {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_digit_strings(&self.cluster_id, &other.cluster_id)
            .then_with(|| cmp_digit_strings(&self.app_number, &other.app_number))
    }
}

impl PartialOrd for ApplicationId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric ordering of digit strings without parsing: shorter strings are
/// smaller, equal lengths fall back to lexicographic comparison. Immune to
/// integer overflow for arbitrarily long ids.
pub fn cmp_digit_strings(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

// =============================================================================
// Application record
// =============================================================================

/// Timestamp range observed for one application.
///
/// `earliest` only ever decreases and `latest` only ever increases once
/// set, so `earliest <= latest` holds whenever at least one timestamp has
/// been observed. A record with no timestamps has an undefined duration
/// and is excluded from duration-based outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl ApplicationRecord {
    /// Folds one observed timestamp into the range.
    pub fn observe(&mut self, ts: DateTime<Utc>) {
        self.earliest = Some(match self.earliest {
            Some(e) if e <= ts => e,
            _ => ts,
        });
        self.latest = Some(match self.latest {
            Some(l) if l >= ts => l,
            _ => ts,
        });
    }

    /// Component-wise min/max combination with another record.
    pub fn merge_from(&mut self, other: &ApplicationRecord) {
        if let Some(ts) = other.earliest {
            self.observe(ts);
        }
        if let Some(ts) = other.latest {
            self.observe(ts);
        }
    }

    /// End-to-end duration in whole seconds, or None when no timestamp
    /// was ever observed.
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.earliest, self.latest) {
            (Some(e), Some(l)) => Some((l - e).num_seconds()),
            _ => None,
        }
    }
}

// =============================================================================
// Severity counts
// =============================================================================

/// Fixed-slot counters, one per recognised level, global across a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    counts: [u64; 4],
}

impl SeverityCounts {
    pub fn record(&mut self, severity: Severity) {
        self.counts[severity.index()] += 1;
    }

    pub fn get(&self, severity: Severity) -> u64 {
        self.counts[severity.index()]
    }

    /// Sum across all levels.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Number of levels with at least one occurrence.
    pub fn distinct_levels(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }

    pub fn merge_from(&mut self, other: &SeverityCounts) {
        for (slot, add) in self.counts.iter_mut().zip(other.counts.iter()) {
            *slot += add;
        }
    }

    /// (level, count) pairs in canonical order, zero counts included.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        Severity::all().iter().map(move |s| (*s, self.get(*s)))
    }
}

// =============================================================================
// Report rows (finalized, ready for emission)
// =============================================================================

/// One sampled line together with the level that matched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampledLine {
    pub text: String,
    pub severity: Severity,
}

/// One (level, count) pair of the global distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelCount {
    pub level: Severity,
    pub count: u64,
}

/// One timeline row: an application with at least one observed timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    pub id: ApplicationId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_seconds: i64,
}

/// Per-cluster roll-up: how many applications ran and when the cluster
/// was first and last active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub app_count: usize,
    pub first_app: DateTime<Utc>,
    pub last_app: DateTime<Utc>,
}

/// Global line counters for the stats summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineTotals {
    /// Every line read during the scan.
    pub lines_seen: u64,
    /// Lines carrying a recognised level token.
    pub level_lines: u64,
}

/// Finished aggregates of a complete scan, ready for the emitters.
///
/// `timeline` is sorted by cluster id then app number ascending;
/// `clusters` by app count descending with cluster id as tiebreak;
/// `level_counts` is in canonical level order with zero rows included.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub totals: LineTotals,
    pub level_counts: Vec<LevelCount>,
    pub sample: Vec<SampledLine>,
    pub timeline: Vec<TimelineRow>,
    pub clusters: Vec<ClusterSummary>,
}
