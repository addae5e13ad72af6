//! Planar and geodesic distance computation

use geo::{Distance, Euclidean, Haversine, Point};

/// Euclidean distance between two points in a planar CRS, in the CRS unit
/// (meters for the survey's Lambert projection)
pub fn planar_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    Euclidean.distance(a, b)
}

/// Great-circle distance in meters between two WGS84 lon/lat points.
/// Used as a sanity cross-check against the planar figures.
pub fn haversine_distance(a: Point<f64>, b: Point<f64>) -> f64 {
    Haversine.distance(a, b)
}

/// Row-major pairwise distance matrix: `result[i][j]` is the distance from
/// `origins[i]` to `targets[j]`. Empty inputs produce an empty matrix.
pub fn distance_matrix(origins: &[Point<f64>], targets: &[Point<f64>]) -> Vec<Vec<f64>> {
    origins
        .iter()
        .map(|origin| targets.iter().map(|target| planar_distance(*origin, *target)).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_345_triangle() {
        let d = planar_distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_planar_distance_zero() {
        let p = Point::new(12.5, -3.25);
        assert_eq!(planar_distance(p, p), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris to London, roughly 344 km
        let paris = Point::new(2.3522, 48.8566);
        let london = Point::new(-0.1276, 51.5074);
        let d = haversine_distance(paris, london);
        assert!(d > 339_000.0 && d < 349_000.0, "Paris-London distance {d} should be ~344km");
    }

    #[test]
    fn test_distance_matrix_dimensions() {
        let trees = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        let speakers = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)];

        let matrix = distance_matrix(&trees, &speakers);
        assert_eq!(matrix.len(), 3);
        assert!(matrix.iter().all(|row| row.len() == 2));

        assert_eq!(matrix[0][0], 0.0);
        assert!((matrix[0][1] - 5.0).abs() < 1e-12);
        assert!((matrix[1][0] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_distance_matrix_empty() {
        assert!(distance_matrix(&[], &[Point::new(0.0, 0.0)]).is_empty());
        let matrix = distance_matrix(&[Point::new(0.0, 0.0)], &[]);
        assert_eq!(matrix.len(), 1);
        assert!(matrix[0].is_empty());
    }
}
