use std::fs;
use std::path::Path;

use crate::error::GateError;

pub mod csv_log;
pub mod numeric;
pub mod summary;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads an artifact fully into memory, releasing the handle before any
/// parsing starts. A leading UTF-8 byte-order marker is dropped.
fn read_artifact_bytes(path: &Path) -> Result<Vec<u8>, GateError> {
    let mut raw = fs::read(path).map_err(|source| GateError::io(path, source))?;
    if raw.starts_with(UTF8_BOM) {
        raw.drain(..UTF8_BOM.len());
    }
    Ok(raw)
}

fn read_artifact_text(path: &Path) -> Result<String, GateError> {
    let raw = read_artifact_bytes(path)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
