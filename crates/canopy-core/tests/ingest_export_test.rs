//! End-to-end ingest + export checks against realistic survey files

use std::io::Write;

use canopy_core::export::{bat_collection, station_collection, write_geojson};
use canopy_core::ingest::{read_detections, read_stations};
use canopy_core::models::{StationKind, SurveyPeriod};

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

const SOUND_TREE_CSV: &str = "\
location;label;row;designation;sound_dB
20,7547°S, 164,2385°E;tree;1;A;62.5
20,7548°S, 164,2387°E;tree;1;B;58.0
20,7549°S, 164,2380°E;speaker;1;S1;
20,7551°S, 164,2383°E;speaker;2;S2;
20,7550°S, 164,2382°E;amp;0;main;
";

const BATS_CSV: &str = "\
LATITUDE,LONGITUDE,MANUAL_ID,Nb_of_sound,DATE,PERIOD
\"164,2390°E\",\"20,7545°S\",Miniopterus robustior,7,2023-04-18,during
\"164,2391°E\",\"20,7546°S\",Chalinolobus neocaledonicus,3,19/04/2023,after
";

#[test]
fn test_full_station_ingest() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "sound_and_tree_data.csv", SOUND_TREE_CSV);

    let set = read_stations(&path, b';').unwrap();
    assert_eq!(set.len(), 5);
    assert_eq!(set.trees().len(), 2);
    assert_eq!(set.speakers().len(), 2);
    assert_eq!(set.amplifiers().len(), 1);

    // All latitudes southern hemisphere, all longitudes eastern
    for station in &set.stations {
        assert!(station.lat < 0.0);
        assert!(station.lon > 0.0);
    }

    let bbox = set.bounding_box().unwrap();
    assert!(bbox.north >= bbox.south);
    assert!(bbox.east >= bbox.west);
    assert!(bbox.west >= 164.2380 && bbox.east <= 164.2387);
}

#[test]
fn test_full_bat_ingest_corrects_swapped_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bats_t1.csv", BATS_CSV);

    let set = read_detections(&path).unwrap();
    assert_eq!(set.len(), 2);

    let first = &set.detections[0];
    assert_eq!(first.species, "Miniopterus robustior");
    assert_eq!(first.period, SurveyPeriod::During);
    // Values from the LATITUDE column landed in lon because of the °E suffix
    assert!((first.lon - 164.2390).abs() < 1e-9);
    assert!((first.lat - -20.7545).abs() < 1e-9);

    // Both supported date formats parse to real dates
    assert_eq!(set.detections[0].date.to_string(), "2023-04-18");
    assert_eq!(set.detections[1].date.to_string(), "2023-04-19");
}

#[test]
fn test_geojson_exports_reparse_with_same_counts() {
    let dir = tempfile::tempdir().unwrap();
    let stations_path = write_file(&dir, "sound_and_tree_data.csv", SOUND_TREE_CSV);
    let bats_path = write_file(&dir, "bats_t1.csv", BATS_CSV);

    let stations = read_stations(&stations_path, b';').unwrap();
    let bats = read_detections(&bats_path).unwrap();

    let stations_geojson = dir.path().join("out/stations.geojson");
    let bats_geojson = dir.path().join("out/bats.geojson");
    write_geojson(&stations_geojson, station_collection(&stations)).unwrap();
    write_geojson(&bats_geojson, bat_collection(&bats)).unwrap();

    for (path, expected) in [(&stations_geojson, 5), (&bats_geojson, 2)] {
        let content = std::fs::read_to_string(path).unwrap();
        match content.parse::<geojson::GeoJson>().unwrap() {
            geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), expected),
            other => panic!("expected FeatureCollection, got {other:?}"),
        }
    }
}

#[test]
fn test_kind_filter_respects_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "sound_and_tree_data.csv", SOUND_TREE_CSV);
    let set = read_stations(&path, b';').unwrap();

    let speakers = set.of_kind(StationKind::Speaker);
    assert_eq!(speakers[0].designation, "S1");
    assert_eq!(speakers[1].designation, "S2");
}
