use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::read_artifact_bytes;
use crate::error::GateError;
use crate::model::RawSampleTable;

pub const VEHICLE_COLUMN: &str = "VehicleID";
pub const ERROR_COLUMN: &str = "PositionError";

/// Collects position-error samples per vehicle from a logger CSV.
///
/// Only `VehicleID` and `PositionError` are read; other columns are ignored.
/// Rows without a vehicle id, without an error value, or with an error that is
/// not a number are skipped rather than failing the parse. Any value that
/// parses as a float is kept, including `inf`, `NaN` and negatives, so a
/// vehicle logging one of those cannot slip under the threshold.
pub fn load_vehicle_errors(csv_path: &Path) -> Result<RawSampleTable, GateError> {
    let raw = read_artifact_bytes(csv_path)?;
    debug!(path = %csv_path.display(), size_bytes = raw.len(), "loading CSV log");

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(raw.as_slice());

    let headers = reader
        .headers()
        .map_err(|source| GateError::Csv {
            path: csv_path.to_path_buf(),
            source,
        })?
        .clone();
    let (vehicle_idx, error_idx) = required_columns(csv_path, &headers)?;

    let mut errors = RawSampleTable::new();
    let mut skipped_rows = 0_usize;

    for record in reader.records() {
        let sample = record
            .ok()
            .and_then(|record| usable_sample(&record, vehicle_idx, error_idx));

        match sample {
            Some((vehicle_id, error)) => errors.entry(vehicle_id).or_default().push(error),
            None => skipped_rows += 1,
        }
    }

    debug!(
        path = %csv_path.display(),
        vehicles = errors.len(),
        skipped_rows,
        "parsed CSV log"
    );

    if errors.is_empty() {
        return Err(GateError::EmptyDataset {
            path: csv_path.to_path_buf(),
        });
    }

    Ok(errors)
}

fn required_columns(csv_path: &Path, headers: &StringRecord) -> Result<(usize, usize), GateError> {
    let vehicle_idx = headers.iter().position(|name| name == VEHICLE_COLUMN);
    let error_idx = headers.iter().position(|name| name == ERROR_COLUMN);

    match (vehicle_idx, error_idx) {
        (Some(vehicle_idx), Some(error_idx)) => Ok((vehicle_idx, error_idx)),
        (vehicle_idx, error_idx) => {
            let mut missing = Vec::new();
            if vehicle_idx.is_none() {
                missing.push(VEHICLE_COLUMN.to_string());
            }
            if error_idx.is_none() {
                missing.push(ERROR_COLUMN.to_string());
            }
            Err(GateError::SchemaError {
                path: csv_path.to_path_buf(),
                missing,
            })
        }
    }
}

fn usable_sample(
    record: &StringRecord,
    vehicle_idx: usize,
    error_idx: usize,
) -> Option<(String, f64)> {
    let vehicle_id = record.get(vehicle_idx).filter(|value| !value.is_empty())?;
    let error = record.get(error_idx)?.trim().parse::<f64>().ok()?;

    Some((vehicle_id.to_string(), error))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn write_csv(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("write csv fixture");
        path
    }

    #[test]
    fn groups_samples_by_vehicle_in_row_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "position_accuracy_1.csv",
            "Timestamp,VehicleID,UnityX,UnityZ,SumoX,SumoZ,PositionError,LateralError,LongitudinalError\n\
             0.0,V2,1,1,1,1,2.0,0.1,0.1\n\
             0.0,V1,1,1,1,1,0.5,0.1,0.1\n\
             0.1,V2,1,1,1,1,2.2,0.1,0.1\n\
             0.1,V1,1,1,1,1,1.5,0.1,0.1\n",
        );

        let errors = load_vehicle_errors(&path).expect("csv should parse");
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["V1", "V2"]);
        assert_eq!(errors["V1"], vec![0.5, 1.5]);
        assert_eq!(errors["V2"], vec![2.0, 2.2]);
    }

    #[test]
    fn skips_malformed_rows_without_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "messy.csv",
            "VehicleID,PositionError\n\
             V1,0.5\n\
             ,0.7\n\
             V1,\n\
             V1,abc\n\
             V2\n\
             V2,2.0\n",
        );

        let errors = load_vehicle_errors(&path).expect("csv should parse");
        assert_eq!(errors["V1"], vec![0.5]);
        assert_eq!(errors["V2"], vec![2.0]);
    }

    #[test]
    fn keeps_non_finite_and_negative_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "extreme.csv",
            "VehicleID,PositionError\nV1,0.1\nV1,inf\nV2,-5.0\nV2,1.0\nV3,NaN\nV3, 0.5 \n",
        );

        let errors = load_vehicle_errors(&path).expect("csv should parse");
        assert_eq!(errors["V1"].len(), 2);
        assert!(errors["V1"][1].is_infinite());
        assert_eq!(errors["V2"], vec![-5.0, 1.0]);
        assert!(errors["V3"][0].is_nan());
        assert_eq!(errors["V3"][1], 0.5);
    }

    #[test]
    fn vehicle_ids_are_not_trimmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "spaced.csv",
            " VehicleID , PositionError \nV1,0.5\n V1,1.5\n",
        );

        let errors = load_vehicle_errors(&path).expect("headers are trimmed");
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec![" V1", "V1"]);
        assert_eq!(errors["V1"], vec![0.5]);
        assert_eq!(errors[" V1"], vec![1.5]);
    }

    #[test]
    fn tolerates_byte_order_marker_before_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bom.csv");
        fs::write(&path, b"\xEF\xBB\xBFVehicleID,PositionError\nV1,0.25\n").expect("write");

        let errors = load_vehicle_errors(&path).expect("BOM should be ignored");
        assert_eq!(errors["V1"], vec![0.25]);
    }

    #[test]
    fn missing_columns_are_named_in_schema_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(dir.path(), "bad.csv", "Vehicle,Error\nV1,0.5\n");

        let error = load_vehicle_errors(&path).expect_err("schema should be rejected");
        match error {
            GateError::SchemaError { missing, .. } => {
                assert_eq!(missing, vec![VEHICLE_COLUMN, ERROR_COLUMN]);
            }
            other => panic!("unexpected error: {other}"),
        }

        let path = write_csv(dir.path(), "half.csv", "VehicleID,Error\nV1,0.5\n");
        let error = load_vehicle_errors(&path).expect_err("schema should be rejected");
        assert!(error.to_string().contains("PositionError"), "unexpected error: {error}");
        assert!(!error.to_string().contains("VehicleID"), "unexpected error: {error}");
    }

    #[test]
    fn only_malformed_rows_is_empty_dataset() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(dir.path(), "empty.csv", "VehicleID,PositionError\n,1.0\nV1,x\n");

        let error = load_vehicle_errors(&path).expect_err("no usable rows");
        assert!(error.is_empty_dataset(), "unexpected error: {error}");
    }

    #[test]
    fn dropping_malformed_rows_beforehand_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let messy = write_csv(
            dir.path(),
            "messy.csv",
            "VehicleID,PositionError\nV1,0.5\nV1,oops\nV2,2.0\n,3.0\nV1,1.5\nV2,2.2\n",
        );
        let clean = write_csv(
            dir.path(),
            "clean.csv",
            "VehicleID,PositionError\nV1,0.5\nV2,2.0\nV1,1.5\nV2,2.2\n",
        );

        assert_eq!(
            load_vehicle_errors(&messy).expect("messy parses"),
            load_vehicle_errors(&clean).expect("clean parses")
        );
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_vehicle_errors(&dir.path().join("missing.csv"))
            .expect_err("missing file should fail");
        assert!(matches!(error, GateError::Io { .. }), "unexpected error: {error}");
    }
}
