use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while locating or reading an accuracy artifact.
///
/// Every variant terminates the run with exit status 2, except
/// `EmptyDataset` coming out of a summary text, which the loader may
/// recover from by switching to a CSV artifact.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("log directory not found: {}", .dir.display())]
    DirectoryNotFound { dir: PathBuf },

    #[error("no log files found in {} using patterns: {}", .dir.display(), .patterns.join(", "))]
    NoLogsFound { dir: PathBuf, patterns: Vec<String> },

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{} is missing required column(s): {}", .path.display(), .missing.join(", "))]
    SchemaError { path: PathBuf, missing: Vec<String> },

    #[error("no usable vehicle data found in {}", .path.display())]
    EmptyDataset { path: PathBuf },

    #[error("could not parse {field} from '{text}'")]
    MalformedNumber { field: String, text: String },

    #[error("unsupported file format: {}", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode CSV header in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl GateError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::MalformedNumber {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Only an empty summary scan may be recovered through a CSV artifact.
    pub fn is_empty_dataset(&self) -> bool {
        matches!(self, Self::EmptyDataset { .. })
    }
}
