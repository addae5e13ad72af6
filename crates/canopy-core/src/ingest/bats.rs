//! Reader for the bat acoustic detection CSV
//!
//! Columns: `LATITUDE,LONGITUDE,MANUAL_ID,Nb_of_sound,DATE,PERIOD`. The
//! coordinate columns carry hemisphere suffixes and have been observed with
//! their headers swapped, so each value is classified by suffix rather than
//! by column name.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::coords::classify_pair;
use crate::error::{CanopyError, Result};
use crate::ingest::sound_tree::check_headers;
use crate::models::{BatDetection, BatSet, SurveyPeriod};

#[derive(Debug, Deserialize)]
struct BatRow {
    #[serde(rename = "LATITUDE")]
    latitude: String,
    #[serde(rename = "LONGITUDE")]
    longitude: String,
    #[serde(rename = "MANUAL_ID")]
    manual_id: String,
    #[serde(rename = "Nb_of_sound")]
    nb_of_sound: u32,
    #[serde(rename = "DATE")]
    date: String,
    #[serde(rename = "PERIOD")]
    period: String,
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

/// Read and convert the bat detection dataset
pub fn read_detections(path: &Path) -> Result<BatSet> {
    if !path.exists() {
        return Err(CanopyError::InputNotFound { path: path.to_path_buf() });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    check_headers(
        &mut reader,
        path,
        &["LATITUDE", "LONGITUDE", "MANUAL_ID", "Nb_of_sound", "DATE", "PERIOD"],
    )?;

    let mut detections = Vec::new();
    for (idx, record) in reader.deserialize::<BatRow>().enumerate() {
        let row_no = idx + 1;
        let record = record?;

        let (lat, lon) = classify_pair(&record.latitude, &record.longitude).map_err(|e| {
            CanopyError::InvalidCoordinate {
                row: row_no,
                value: format!("{}, {}", record.latitude, record.longitude),
                reason: e.to_string(),
            }
        })?;

        let date = parse_date(&record.date).ok_or_else(|| CanopyError::InvalidField {
            row: row_no,
            field: "DATE".to_string(),
            reason: format!("'{}' matches none of {DATE_FORMATS:?}", record.date),
        })?;

        let period =
            SurveyPeriod::from_field(&record.period).ok_or_else(|| CanopyError::InvalidField {
                row: row_no,
                field: "PERIOD".to_string(),
                reason: format!("'{}' is not before, during, or after", record.period),
            })?;

        detections.push(BatDetection {
            species: record.manual_id,
            call_count: record.nb_of_sound,
            date,
            period,
            lon,
            lat,
        });
    }

    if detections.is_empty() {
        return Err(CanopyError::EmptyDataset {
            name: path.display().to_string(),
        });
    }

    tracing::info!(
        path = %path.display(),
        detections = detections.len(),
        "loaded bat detections"
    );
    Ok(BatSet::new(detections))
}
