use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::Pattern;
use tracing::{debug, warn};

use crate::error::GateError;
use crate::model::{DEFAULT_CSV_GLOB, DEFAULT_SUMMARY_GLOB};

#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    modified: SystemTime,
}

/// Picks the newest artifact in `log_dir`.
///
/// A custom `pattern` is the only pattern tried. Without one, summary reports
/// are preferred over raw CSV logs: the CSV glob is only consulted when no
/// summary matches.
pub fn find_latest_log(log_dir: &Path, pattern: Option<&str>) -> Result<PathBuf, GateError> {
    if !log_dir.is_dir() {
        return Err(GateError::DirectoryNotFound {
            dir: log_dir.to_path_buf(),
        });
    }

    let patterns: Vec<String> = match pattern {
        Some(pattern) => vec![pattern.to_string()],
        None => vec![DEFAULT_SUMMARY_GLOB.to_string(), DEFAULT_CSV_GLOB.to_string()],
    };

    for glob_pattern in &patterns {
        let matches = matching_files(log_dir, glob_pattern)?;
        let match_count = matches.len();

        match select_latest(matches) {
            Some(chosen) => {
                debug!(
                    pattern = %glob_pattern,
                    matches = match_count,
                    selected = %chosen.display(),
                    "discovery matched log files"
                );
                return Ok(chosen);
            }
            None => debug!(pattern = %glob_pattern, "discovery found no files"),
        }
    }

    Err(GateError::NoLogsFound {
        dir: log_dir.to_path_buf(),
        patterns,
    })
}

/// Newest regular file in `dir` matching `pattern`, if any.
pub fn latest_match(dir: &Path, pattern: &str) -> Result<Option<PathBuf>, GateError> {
    Ok(select_latest(matching_files(dir, pattern)?))
}

fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<Candidate>, GateError> {
    let escaped_dir = PathBuf::from(Pattern::escape(&dir.to_string_lossy()));
    let full_pattern = escaped_dir.join(pattern);

    let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|error| {
        GateError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: error.to_string(),
        }
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(error) => {
                warn!(error = %error, "skipping unreadable discovery entry");
                continue;
            }
        };

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "skipping file without metadata");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push(Candidate { path, modified });
    }

    Ok(candidates)
}

/// Latest modification time wins; ties go to the lexicographically last file
/// name, then the last full path.
fn select_latest(candidates: Vec<Candidate>) -> Option<PathBuf> {
    candidates
        .into_iter()
        .max_by(|a, b| {
            a.modified
                .cmp(&b.modified)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
                .then_with(|| a.path.cmp(&b.path))
        })
        .map(|candidate| candidate.path)
}
