use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::GateError;

pub const CSV_PREFIX: &str = "position_accuracy_";
pub const SUMMARY_PREFIX: &str = "statistics_summary_";
pub const DEFAULT_CSV_GLOB: &str = "position_accuracy_*.csv";
pub const DEFAULT_SUMMARY_GLOB: &str = "statistics_summary_*.txt";

/// Vehicle id to error samples in row order. Iterates ids ascending.
pub type RawSampleTable = BTreeMap<String, Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleStats {
    pub vehicle_id: String,
    pub mean_error: f64,
    pub sample_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryMetadata {
    pub generated_at: Option<String>,
    pub total_entries: Option<u64>,
    pub active_vehicles: Option<u64>,
    pub overall_mean: Option<f64>,
    pub overall_max: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Csv,
    SummaryText,
}

impl ArtifactKind {
    pub fn detect(path: &Path) -> Result<Self, GateError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("txt") => Ok(Self::SummaryText),
            _ => Err(GateError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::SummaryText => "summary_text",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a format-specific parse, before reduction to vehicle stats.
#[derive(Debug, Clone)]
pub enum ParsedArtifact {
    Csv(RawSampleTable),
    Summary {
        stats: Vec<VehicleStats>,
        metadata: SummaryMetadata,
    },
}

/// The artifact whose statistics were actually evaluated.
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
    pub fallback_from: Option<PathBuf>,
    pub stats: Vec<VehicleStats>,
    pub metadata: SummaryMetadata,
}
