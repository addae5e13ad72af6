//! Shapefile export (point shapes with dbase attribute tables)

use std::path::Path;

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::Point;

use crate::error::{CanopyError, Result};
use crate::export::ensure_parent_dirs;
use crate::models::{BatSet, StationSet};

fn field_name(name: &str) -> Result<FieldName> {
    FieldName::try_from(name).map_err(|e| CanopyError::Serialization(format!(
        "invalid dbase field name '{name}': {e:?}"
    )))
}

fn character(value: impl Into<String>) -> FieldValue {
    FieldValue::Character(Some(value.into()))
}

/// Write the sound/tree stations as a point shapefile.
///
/// The `.shp`/`.shx`/`.dbf` trio is written next to `path`.
pub fn write_station_shapefile(path: &Path, set: &StationSet) -> Result<()> {
    ensure_parent_dirs(path)?;

    let table = TableWriterBuilder::new()
        .add_character_field(field_name("label")?, 16)
        .add_numeric_field(field_name("row")?, 8, 0)
        .add_character_field(field_name("designat")?, 32)
        .add_numeric_field(field_name("sound_db")?, 12, 2);

    let mut writer = shapefile::Writer::from_path(path, table)?;
    for station in &set.stations {
        let mut record = Record::default();
        record.insert("label".to_string(), character(station.kind.label()));
        record.insert("row".to_string(), FieldValue::Numeric(Some(station.row as f64)));
        record.insert("designat".to_string(), character(station.designation.clone()));
        record.insert("sound_db".to_string(), FieldValue::Numeric(station.sound_db));
        writer.write_shape_and_record(&Point::new(station.lon, station.lat), &record)?;
    }

    tracing::debug!(path = %path.display(), count = set.len(), "wrote station shapefile");
    Ok(())
}

/// Write the bat detections as a point shapefile
pub fn write_bat_shapefile(path: &Path, set: &BatSet) -> Result<()> {
    ensure_parent_dirs(path)?;

    let table = TableWriterBuilder::new()
        .add_character_field(field_name("manual_id")?, 64)
        .add_numeric_field(field_name("nb_sound")?, 8, 0)
        .add_character_field(field_name("date")?, 10)
        .add_character_field(field_name("period")?, 8);

    let mut writer = shapefile::Writer::from_path(path, table)?;
    for detection in &set.detections {
        let mut record = Record::default();
        record.insert("manual_id".to_string(), character(detection.species.clone()));
        record.insert(
            "nb_sound".to_string(),
            FieldValue::Numeric(Some(detection.call_count as f64)),
        );
        record.insert("date".to_string(), character(detection.date.to_string()));
        record.insert("period".to_string(), character(detection.period.as_str()));
        writer.write_shape_and_record(&Point::new(detection.lon, detection.lat), &record)?;
    }

    tracing::debug!(path = %path.display(), count = set.len(), "wrote bat shapefile");
    Ok(())
}
