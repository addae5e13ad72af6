//! Reader for the sound/tree survey CSV
//!
//! Columns: `location;label;row;designation;sound_dB`. The site exports use a
//! semicolon delimiter because the location field itself contains commas.

use std::path::Path;

use serde::Deserialize;

use crate::coords::parse_location;
use crate::error::{CanopyError, Result};
use crate::models::{Station, StationKind, StationSet};

#[derive(Debug, Deserialize)]
struct SoundTreeRow {
    location: String,
    label: String,
    row: u32,
    designation: String,
    #[serde(rename = "sound_dB")]
    sound_db: Option<f64>,
}

/// Read and convert the sound/tree dataset.
///
/// Every row's combined location string is split into signed decimal
/// latitude/longitude. Errors carry the 1-based data row number.
pub fn read_stations(path: &Path, delimiter: u8) -> Result<StationSet> {
    if !path.exists() {
        return Err(CanopyError::InputNotFound { path: path.to_path_buf() });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)?;

    check_headers(&mut reader, path, &["location", "label", "row", "designation"])?;

    let mut stations = Vec::new();
    for (idx, record) in reader.deserialize::<SoundTreeRow>().enumerate() {
        let row_no = idx + 1;
        let record = record?;

        let (lat, lon) =
            parse_location(&record.location).map_err(|e| CanopyError::InvalidCoordinate {
                row: row_no,
                value: record.location.clone(),
                reason: e.to_string(),
            })?;

        let kind = StationKind::from_label(&record.label).ok_or(CanopyError::UnknownLabel {
            row: row_no,
            label: record.label.clone(),
        })?;

        stations.push(Station {
            kind,
            row: record.row,
            designation: record.designation,
            sound_db: record.sound_db,
            lon,
            lat,
        });
    }

    if stations.is_empty() {
        return Err(CanopyError::EmptyDataset {
            name: path.display().to_string(),
        });
    }

    tracing::info!(
        path = %path.display(),
        stations = stations.len(),
        "loaded sound/tree dataset"
    );
    Ok(StationSet::new(stations))
}

/// Fail early with the missing column name instead of a generic serde error
pub(crate) fn check_headers(
    reader: &mut csv::Reader<std::fs::File>,
    path: &Path,
    required: &[&str],
) -> Result<()> {
    let headers = reader.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column)) {
            return Err(CanopyError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
