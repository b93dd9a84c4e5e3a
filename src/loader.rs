use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::aggregate;
use crate::discovery::latest_match;
use crate::error::GateError;
use crate::model::{
    ArtifactKind, CSV_PREFIX, DEFAULT_CSV_GLOB, LoadedArtifact, ParsedArtifact, SUMMARY_PREFIX,
    SummaryMetadata, VehicleStats,
};
use crate::parse::csv_log::load_vehicle_errors;
use crate::parse::summary::load_vehicle_stats_from_summary;

impl ParsedArtifact {
    pub fn into_stats(self) -> (Vec<VehicleStats>, SummaryMetadata) {
        match self {
            Self::Csv(errors) => aggregate::reduce(&errors),
            Self::Summary { stats, metadata } => (stats, metadata),
        }
    }
}

pub fn parse_artifact(path: &Path, kind: ArtifactKind) -> Result<ParsedArtifact, GateError> {
    match kind {
        ArtifactKind::Csv => load_vehicle_errors(path).map(ParsedArtifact::Csv),
        ArtifactKind::SummaryText => {
            let (stats, metadata) = load_vehicle_stats_from_summary(path)?;
            Ok(ParsedArtifact::Summary { stats, metadata })
        }
    }
}

/// Loads vehicle statistics from `path`, falling back to the matching CSV log
/// when a summary report holds no vehicle blocks.
///
/// The returned artifact path is the file whose data was evaluated, which is
/// the CSV when the fallback kicked in.
pub fn load_vehicle_stats(path: &Path) -> Result<LoadedArtifact, GateError> {
    let kind = ArtifactKind::detect(path)?;

    match parse_artifact(path, kind) {
        Ok(parsed) => {
            let (stats, metadata) = parsed.into_stats();
            Ok(LoadedArtifact {
                path: path.to_path_buf(),
                kind,
                fallback_from: None,
                stats,
                metadata,
            })
        }
        Err(error) if kind == ArtifactKind::SummaryText && error.is_empty_dataset() => {
            debug!(path = %path.display(), error = %error, "summary report yielded no vehicles");
            let Some(csv_path) = find_matching_csv(path)? else {
                debug!(path = %path.display(), "no CSV fallback available");
                return Err(error);
            };

            info!(
                summary = %path.display(),
                csv = %csv_path.display(),
                "falling back to CSV log"
            );
            let (stats, metadata) = parse_artifact(&csv_path, ArtifactKind::Csv)?.into_stats();
            debug!(csv = %csv_path.display(), vehicles = stats.len(), "CSV fallback succeeded");

            Ok(LoadedArtifact {
                path: csv_path,
                kind: ArtifactKind::Csv,
                fallback_from: Some(path.to_path_buf()),
                stats,
                metadata,
            })
        }
        Err(error) => Err(error),
    }
}

/// The CSV log written alongside a summary report: first the one sharing its
/// timestamp token, otherwise the newest CSV log in the same directory.
pub fn find_matching_csv(summary_path: &Path) -> Result<Option<PathBuf>, GateError> {
    let dir = match summary_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let token = summary_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix(SUMMARY_PREFIX))
        .filter(|token| !token.is_empty());

    if let Some(token) = token {
        let candidate = dir.join(format!("{CSV_PREFIX}{token}.csv"));
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
        debug!(candidate = %candidate.display(), "no CSV log shares the summary timestamp");
    }

    latest_match(dir, DEFAULT_CSV_GLOB)
}
