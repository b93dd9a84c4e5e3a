use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::{ArtifactKind, LoadedArtifact, SummaryMetadata, VehicleStats};
use crate::util::{now_utc_string, sha256_file};

const REPORT_VERSION: u32 = 1;
const RULE_WIDTH: usize = 60;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleStatus {
    Ok,
    Fail,
}

impl VehicleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleVerdict {
    #[serde(flatten)]
    pub stats: VehicleStats,
    pub status: VehicleStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub threshold: f64,
    pub vehicles: Vec<VehicleVerdict>,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn failing(&self) -> impl Iterator<Item = &VehicleStats> {
        self.vehicles
            .iter()
            .filter(|item| item.status == VehicleStatus::Fail)
            .map(|item| &item.stats)
    }
}

/// A vehicle passes only when its mean error is strictly below `threshold`.
pub fn evaluate(stats: &[VehicleStats], threshold: f64) -> Evaluation {
    let vehicles: Vec<VehicleVerdict> = stats
        .iter()
        .map(|item| VehicleVerdict {
            stats: item.clone(),
            status: if item.mean_error < threshold {
                VehicleStatus::Ok
            } else {
                VehicleStatus::Fail
            },
        })
        .collect();

    let verdict = if vehicles.iter().any(|item| item.status == VehicleStatus::Fail) {
        Verdict::Fail
    } else {
        Verdict::Pass
    };

    Evaluation {
        threshold,
        vehicles,
        verdict,
    }
}

pub fn write_text_report<W: Write>(
    output: &mut W,
    artifact: &LoadedArtifact,
    evaluation: &Evaluation,
) -> Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(output, "{rule}")?;
    writeln!(output, "Analyzed log: {}", artifact.path.display())?;
    if let Some(summary) = &artifact.fallback_from {
        writeln!(output, "Fallback from: {}", summary.display())?;
    }
    writeln!(
        output,
        "Threshold (mean error per vehicle): {:.3} m",
        evaluation.threshold
    )?;
    writeln!(output, "{rule}")?;

    write_metadata(output, &artifact.metadata)?;
    writeln!(output, "Vehicles analyzed: {}", evaluation.vehicles.len())?;
    writeln!(output)?;

    writeln!(output, "{:<25}{:>12}{:>18}", "Vehicle", "Samples", "Mean Error (m)")?;
    writeln!(output, "{}", "-".repeat(RULE_WIDTH))?;
    for item in &evaluation.vehicles {
        writeln!(
            output,
            "{:<25}{:>12}{:>14.4}  {}",
            item.stats.vehicle_id,
            item.stats.sample_count,
            item.stats.mean_error,
            item.status.as_str()
        )?;
    }
    writeln!(output, "{rule}")?;

    if evaluation.verdict == Verdict::Fail {
        writeln!(output, "Failing vehicles:")?;
        for item in evaluation.failing() {
            writeln!(
                output,
                "  {}: mean error {:.4} m (samples={})",
                item.vehicle_id, item.mean_error, item.sample_count
            )?;
        }
    }
    writeln!(output, "Result: {}", evaluation.verdict.as_str())?;

    Ok(())
}

fn write_metadata<W: Write>(output: &mut W, metadata: &SummaryMetadata) -> Result<()> {
    let generated_at = metadata.generated_at.as_deref().filter(|value| !value.is_empty());
    if let Some(generated_at) = generated_at {
        writeln!(output, "Generated: {generated_at}")?;
    }
    if let Some(total_entries) = metadata.total_entries {
        writeln!(output, "Total entries: {total_entries}")?;
    }
    if let Some(active_vehicles) = metadata.active_vehicles {
        writeln!(output, "Active vehicles: {active_vehicles}")?;
    }
    if let Some(overall_mean) = metadata.overall_mean {
        writeln!(output, "Overall mean error: {overall_mean:.4} m")?;
    }
    if let Some(overall_max) = metadata.overall_max {
        writeln!(output, "Maximum error: {overall_max:.4} m")?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ArtifactProvenance {
    pub path: String,
    pub kind: ArtifactKind,
    pub size_bytes: u64,
    pub sha256: String,
    pub fallback_from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GateReport<'a> {
    pub report_version: u32,
    pub evaluated_at: String,
    pub artifact: ArtifactProvenance,
    pub metadata: &'a SummaryMetadata,
    pub threshold: f64,
    pub vehicles: &'a [VehicleVerdict],
    pub failing_vehicles: Vec<&'a str>,
    pub verdict: Verdict,
}

pub fn build_gate_report<'a>(
    artifact: &'a LoadedArtifact,
    evaluation: &'a Evaluation,
) -> Result<GateReport<'a>> {
    Ok(GateReport {
        report_version: REPORT_VERSION,
        evaluated_at: now_utc_string(),
        artifact: provenance(artifact)?,
        metadata: &artifact.metadata,
        threshold: evaluation.threshold,
        vehicles: &evaluation.vehicles,
        failing_vehicles: evaluation
            .failing()
            .map(|item| item.vehicle_id.as_str())
            .collect(),
        verdict: evaluation.verdict,
    })
}

fn provenance(artifact: &LoadedArtifact) -> Result<ArtifactProvenance> {
    let size_bytes = std::fs::metadata(&artifact.path)
        .with_context(|| format!("failed to stat {}", artifact.path.display()))?
        .len();

    Ok(ArtifactProvenance {
        path: display_path(&artifact.path),
        kind: artifact.kind,
        size_bytes,
        sha256: sha256_file(&artifact.path)?,
        fallback_from: artifact.fallback_from.as_deref().map(display_path),
    })
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

pub fn write_json_report<W: Write>(output: &mut W, report: &GateReport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *output, report)
        .context("failed to serialize gate report json")?;
    writeln!(output)?;
    Ok(())
}
