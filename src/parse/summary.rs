use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use super::numeric::{parse_decimal_loose, parse_integer_loose};
use super::read_artifact_text;
use crate::error::GateError;
use crate::model::{SummaryMetadata, VehicleStats};

const PREVIEW_LINES: usize = 10;

/// A `Vehicle:` block that has not reached its `Avg Error:` line yet.
#[derive(Debug)]
struct PendingVehicle {
    vehicle_id: String,
    samples: Option<u64>,
}

#[derive(Debug, PartialEq)]
enum SummaryLine<'a> {
    GeneratedAt(&'a str),
    TotalEntries(&'a str),
    ActiveVehicles(&'a str),
    OverallMean(&'a str),
    OverallMax(&'a str),
    Vehicle(&'a str),
    Samples(&'a str),
    AvgError(&'a str),
    Other,
}

fn vehicle_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^vehicle:\s*(.+)$").expect("vehicle line regex"))
}

/// Reads pre-aggregated per-vehicle statistics from a logger summary report.
pub fn load_vehicle_stats_from_summary(
    path: &Path,
) -> Result<(Vec<VehicleStats>, SummaryMetadata), GateError> {
    let text = read_artifact_text(path)?;
    debug!(path = %path.display(), size_bytes = text.len(), "loading summary report");

    if text.trim().is_empty() {
        debug!(path = %path.display(), "summary report is empty");
    } else {
        let preview = text.lines().take(PREVIEW_LINES).collect::<Vec<_>>().join("\n");
        debug!(path = %path.display(), "summary preview (first lines):\n{preview}");
    }

    parse_summary_text(&text, path)
}

pub fn parse_summary_text(
    text: &str,
    path: &Path,
) -> Result<(Vec<VehicleStats>, SummaryMetadata), GateError> {
    let mut metadata = SummaryMetadata::default();
    let mut stats = BTreeMap::<String, VehicleStats>::new();
    let mut pending: Option<PendingVehicle> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = idx + 1;

        match classify_line(line) {
            SummaryLine::GeneratedAt(value) => {
                metadata.generated_at = Some(value.trim().to_string());
            }
            SummaryLine::TotalEntries(value) => {
                let total = parse_integer_loose(value)
                    .map_err(|e| in_field(e, "total entries", line_no))?;
                metadata.total_entries = Some(total);
            }
            SummaryLine::ActiveVehicles(value) => {
                let active = parse_integer_loose(value)
                    .map_err(|e| in_field(e, "active vehicles", line_no))?;
                metadata.active_vehicles = Some(active);
            }
            SummaryLine::OverallMean(value) => {
                let mean = parse_decimal_loose(value)
                    .map_err(|e| in_field(e, "average position error", line_no))?;
                metadata.overall_mean = Some(mean);
            }
            SummaryLine::OverallMax(value) => {
                let max = parse_decimal_loose(value)
                    .map_err(|e| in_field(e, "maximum position error", line_no))?;
                metadata.overall_max = Some(max);
            }
            SummaryLine::Vehicle(name) => {
                if let Some(open) = pending.take() {
                    debug!(
                        vehicle = %open.vehicle_id,
                        line = line_no,
                        "vehicle block closed without avg error"
                    );
                }
                pending = Some(PendingVehicle {
                    vehicle_id: name.trim().to_string(),
                    samples: None,
                });
            }
            SummaryLine::Samples(value) => {
                if let Some(open) = pending.as_mut() {
                    let samples =
                        parse_integer_loose(value).map_err(|e| in_field(e, "samples", line_no))?;
                    open.samples = Some(samples);
                }
            }
            SummaryLine::AvgError(value) => {
                if let Some(open) = pending.take() {
                    let mean_error =
                        parse_decimal_loose(value).map_err(|e| in_field(e, "avg error", line_no))?;
                    let record = VehicleStats {
                        vehicle_id: open.vehicle_id.clone(),
                        mean_error,
                        sample_count: open.samples.unwrap_or(0),
                    };
                    if stats.insert(open.vehicle_id, record).is_some() {
                        warn!(
                            path = %path.display(),
                            line = line_no,
                            "duplicate vehicle block in summary; keeping the later one"
                        );
                    }
                }
            }
            SummaryLine::Other => {}
        }
    }

    if stats.is_empty() {
        return Err(GateError::EmptyDataset {
            path: path.to_path_buf(),
        });
    }

    if metadata.active_vehicles.is_none() {
        metadata.active_vehicles = Some(stats.len() as u64);
    }

    Ok((stats.into_values().collect(), metadata))
}

fn classify_line(line: &str) -> SummaryLine<'_> {
    if let Some(value) = strip_prefix_ignore_case(line, "generated:") {
        return SummaryLine::GeneratedAt(value);
    }
    if let Some(value) = strip_prefix_ignore_case(line, "total entries logged:") {
        return SummaryLine::TotalEntries(value);
    }
    if let Some(value) = strip_prefix_ignore_case(line, "active vehicles:") {
        return SummaryLine::ActiveVehicles(value);
    }
    if let Some(value) = strip_prefix_ignore_case(line, "average position error:") {
        return SummaryLine::OverallMean(value);
    }
    if let Some(value) = strip_prefix_ignore_case(line, "maximum position error:") {
        return SummaryLine::OverallMax(value);
    }
    if let Some(captures) = vehicle_line_regex().captures(line) {
        let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        return SummaryLine::Vehicle(name);
    }
    if let Some(value) = strip_prefix_ignore_case(line, "samples:") {
        return SummaryLine::Samples(value);
    }
    if let Some(value) = strip_prefix_ignore_case(line, "avg error:") {
        return SummaryLine::AvgError(value);
    }
    SummaryLine::Other
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}

fn in_field(error: GateError, field: &str, line_no: usize) -> GateError {
    match error {
        GateError::MalformedNumber { text, .. } => GateError::MalformedNumber {
            field: format!("{field} (line {line_no})"),
            text,
        },
        other => other,
    }
}
