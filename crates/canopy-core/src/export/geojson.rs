//! GeoJSON FeatureCollection export

use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

use crate::error::{CanopyError, Result};
use crate::export::ensure_parent_dirs;
use crate::models::{BatSet, StationSet};

fn point_feature(lon: f64, lat: f64, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Build a FeatureCollection from the sound/tree stations
pub fn station_collection(set: &StationSet) -> FeatureCollection {
    let features = set
        .stations
        .iter()
        .map(|station| {
            let mut props = JsonObject::new();
            props.insert("label".to_string(), station.kind.label().into());
            props.insert("row".to_string(), station.row.into());
            props.insert("designation".to_string(), station.designation.clone().into());
            props.insert(
                "sound_dB".to_string(),
                station
                    .sound_db
                    .map(Into::into)
                    .unwrap_or(serde_json::Value::Null),
            );
            point_feature(station.lon, station.lat, props)
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// Build a FeatureCollection from the bat detections
pub fn bat_collection(set: &BatSet) -> FeatureCollection {
    let features = set
        .detections
        .iter()
        .map(|detection| {
            let mut props = JsonObject::new();
            props.insert("manual_id".to_string(), detection.species.clone().into());
            props.insert("nb_of_sound".to_string(), detection.call_count.into());
            props.insert("date".to_string(), detection.date.to_string().into());
            props.insert("period".to_string(), detection.period.as_str().into());
            point_feature(detection.lon, detection.lat, props)
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

/// Write a FeatureCollection as pretty-printed GeoJSON
pub fn write_geojson(path: &Path, collection: FeatureCollection) -> Result<()> {
    ensure_parent_dirs(path)?;
    let geojson = GeoJson::FeatureCollection(collection);
    let content = serde_json::to_string_pretty(&geojson)
        .map_err(|e| CanopyError::Serialization(e.to_string()))?;
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "wrote GeoJSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Station, StationKind};

    fn sample_set() -> StationSet {
        StationSet::new(vec![
            Station {
                kind: StationKind::Tree,
                row: 1,
                designation: "A".to_string(),
                sound_db: Some(62.5),
                lon: 164.2385,
                lat: -20.7547,
            },
            Station {
                kind: StationKind::Speaker,
                row: 1,
                designation: "S1".to_string(),
                sound_db: None,
                lon: 164.2380,
                lat: -20.7549,
            },
        ])
    }

    #[test]
    fn test_station_collection_properties() {
        let fc = station_collection(&sample_set());
        assert_eq!(fc.features.len(), 2);

        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["label"], "tree");
        assert_eq!(props["sound_dB"], 62.5);

        let speaker_props = fc.features[1].properties.as_ref().unwrap();
        assert!(speaker_props["sound_dB"].is_null());
    }

    #[test]
    fn test_written_geojson_reparses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stations.geojson");

        write_geojson(&path, station_collection(&sample_set())).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: GeoJson = content.parse().unwrap();
        match parsed {
            GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            other => panic!("expected FeatureCollection, got {other:?}"),
        }
    }

    #[test]
    fn test_point_coordinates_are_lon_lat() {
        let fc = station_collection(&sample_set());
        let geom = fc.features[0].geometry.as_ref().unwrap();
        match &geom.value {
            Value::Point(coords) => {
                assert!((coords[0] - 164.2385).abs() < 1e-9);
                assert!((coords[1] - -20.7547).abs() < 1e-9);
            }
            other => panic!("expected Point, got {other:?}"),
        }
    }
}
