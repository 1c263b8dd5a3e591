//! Rendering of registry snapshots and decoded readings.
//!
//! Payloads go to the writer handed in (stdout for the CLI); nothing here
//! logs or touches stderr.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use tw_common::{OutputFormat, Result};

use crate::collect::ReadEvent;
use crate::registry::{RegistryCounters, TagSnapshot, VisibilityStatus};

/// One tag as reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagReport {
    #[serde(flatten)]
    pub snapshot: TagSnapshot,
    pub status: VisibilityStatus,
    pub seconds_since_read: f64,
}

impl TagReport {
    pub fn new(snapshot: TagSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            status: snapshot.status(),
            seconds_since_read: snapshot.seconds_since_read(now),
            snapshot,
        }
    }
}

/// Registry state at a point in a tracking run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub capacity: usize,
    pub counters: RegistryCounters,
    pub tags: Vec<TagReport>,
}

impl TrackReport {
    pub fn new(
        run_id: impl Into<String>,
        generated_at: DateTime<Utc>,
        capacity: usize,
        counters: RegistryCounters,
        snapshot: Vec<TagSnapshot>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            generated_at,
            capacity,
            counters,
            tags: snapshot
                .into_iter()
                .map(|s| TagReport::new(s, generated_at))
                .collect(),
        }
    }

    pub fn visible_count(&self) -> usize {
        self.tags
            .iter()
            .filter(|t| t.status == VisibilityStatus::Visible)
            .count()
    }
}

/// Write one tracking report in the requested format.
pub fn write_report<W: Write>(out: &mut W, report: &TrackReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            serde_json::to_writer(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Summary => write_summary(out, report)?,
    }
    out.flush()?;
    Ok(())
}

fn write_summary<W: Write>(out: &mut W, report: &TrackReport) -> Result<()> {
    writeln!(
        out,
        "cycle {}: {}/{} tags, {} visible (dropped {}, malformed {})",
        report.counters.cycles,
        report.tags.len(),
        report.capacity,
        report.visible_count(),
        report.counters.dropped,
        report.counters.malformed,
    )?;
    for tag in &report.tags {
        let s = &tag.snapshot;
        writeln!(
            out,
            "  #{:<3} {:<24} {:<7} p={:.3} reads={:<6} avg={:.3}s var={:.4} last={:.1}s ago",
            s.sequence_id.0,
            s.tag_id.as_str(),
            tag.status.to_string(),
            s.visibility_probability,
            s.read_count,
            s.average_interval,
            s.interval_variance,
            tag.seconds_since_read,
        )?;
    }
    Ok(())
}

/// One decoded line as printed by `tagwatch decode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedLine {
    pub line: u64,
    #[serde(flatten)]
    pub reading: ReadEvent,
}

/// Write a decoded reading as a single JSON line.
pub fn write_decoded<W: Write>(out: &mut W, decoded: &DecodedLine) -> Result<()> {
    serde_json::to_writer(&mut *out, decoded)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tw_common::{SequenceId, TagId};

    fn report() -> TrackReport {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let snapshot = vec![
            TagSnapshot {
                sequence_id: SequenceId(0),
                tag_id: TagId::from("ABC123"),
                last_read_at: t0,
                signal_strength: -40,
                frequency: 915,
                read_count: 3,
                average_interval: 0.1,
                interval_variance: 0.001,
                visibility_probability: 0.93,
            },
            TagSnapshot {
                sequence_id: SequenceId(1),
                tag_id: TagId::from("DEF456"),
                last_read_at: t0,
                signal_strength: -61,
                frequency: 915,
                read_count: 0,
                average_interval: 0.0,
                interval_variance: 0.0,
                visibility_probability: 0.41,
            },
        ];
        let counters = RegistryCounters {
            cycles: 7,
            ..Default::default()
        };
        TrackReport::new("run-test", t0 + Duration::seconds(2), 10, counters, snapshot)
    }

    #[test]
    fn report_derives_status_and_age() {
        let r = report();
        assert_eq!(r.tags[0].status, VisibilityStatus::Visible);
        assert_eq!(r.tags[1].status, VisibilityStatus::Covered);
        assert!((r.tags[0].seconds_since_read - 2.0).abs() < 1e-12);
        assert_eq!(r.visible_count(), 1);
    }

    #[test]
    fn json_flattens_snapshot_fields() {
        let mut buf = Vec::new();
        write_report(&mut buf, &report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["tags"][0]["tag_id"], "ABC123");
        assert_eq!(value["tags"][0]["status"], "visible");
        assert_eq!(value["counters"]["cycles"], 7);
    }

    #[test]
    fn jsonl_is_single_line() {
        let mut buf = Vec::new();
        write_report(&mut buf, &report(), OutputFormat::Jsonl).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn summary_lists_every_tag() {
        let mut buf = Vec::new();
        write_report(&mut buf, &report(), OutputFormat::Summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("cycle 7: 2/10 tags, 1 visible"));
        assert!(text.contains("ABC123"));
        assert!(text.contains("covered"));
    }

    #[test]
    fn decoded_line_includes_device_timestamp() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let reading = crate::collect::decode_line("TAG,-40,915,1234567,ABC123", t0).unwrap();
        let mut buf = Vec::new();
        write_decoded(&mut buf, &DecodedLine { line: 3, reading }).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["line"], 3);
        assert_eq!(value["device_timestamp"], 1234567);
        assert_eq!(value["tag_id"], "ABC123");
    }
}
