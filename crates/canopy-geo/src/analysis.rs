//! Survey distance analysis: reproject, then measure

use canopy_core::error::Result;
use canopy_core::models::{Crs, Station};
use geo::Point;

use crate::distance::distance_matrix;
use crate::transform::Reprojector;

fn positions(stations: &[&Station]) -> Vec<Point<f64>> {
    stations.iter().map(|s| Point::new(s.lon, s.lat)).collect()
}

/// Pairwise tree-to-speaker distances in meters.
///
/// Both point sets are reprojected from WGS84 to the given planar CRS before
/// measuring, so the Euclidean figures are metric. Row `i` belongs to
/// `trees[i]`, column `j` to `speakers[j]`.
pub fn tree_speaker_distances(
    trees: &[&Station],
    speakers: &[&Station],
    projected: &Crs,
) -> Result<Vec<Vec<f64>>> {
    let reproj = Reprojector::to_planar(projected)?;
    let tree_points = reproj.project_all(&positions(trees))?;
    let speaker_points = reproj.project_all(&positions(speakers))?;

    let matrix = distance_matrix(&tree_points, &speaker_points);
    tracing::info!(
        trees = trees.len(),
        speakers = speakers.len(),
        crs = %projected,
        "computed distance matrix"
    );
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::models::StationKind;

    fn station(kind: StationKind, lon: f64, lat: f64) -> Station {
        Station {
            kind,
            row: 1,
            designation: "X".to_string(),
            sound_db: None,
            lon,
            lat,
        }
    }

    #[test]
    fn test_distances_are_metric_and_symmetric_in_roles() {
        // Two points ~111m apart along a meridian near the survey site
        let tree = station(StationKind::Tree, 164.2385, -20.7547);
        let speaker = station(StationKind::Speaker, 164.2385, -20.7557);

        let crs = Crs::lambert_new_caledonia();
        let forward = tree_speaker_distances(&[&tree], &[&speaker], &crs).unwrap();
        let backward = tree_speaker_distances(&[&speaker], &[&tree], &crs).unwrap();

        // One minute of latitude is ~1852m, so 0.001 degrees is ~111m
        assert!(forward[0][0] > 100.0 && forward[0][0] < 120.0, "got {}", forward[0][0]);
        assert!((forward[0][0] - backward[0][0]).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sets() {
        let crs = Crs::lambert_new_caledonia();
        let matrix = tree_speaker_distances(&[], &[], &crs).unwrap();
        assert!(matrix.is_empty());
    }
}
