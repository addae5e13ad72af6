//! canopy-geo - CRS reprojection and distance computation
//!
//! Reprojection goes through PROJ (the same EPSG-code path QGIS and
//! GeoPandas use), distances are planar Euclidean on projected coordinates
//! with Haversine available as a geographic cross-check.

pub mod analysis;
pub mod distance;
pub mod transform;

pub use analysis::tree_speaker_distances;
pub use distance::{distance_matrix, haversine_distance, planar_distance};
pub use transform::{crs_match, Reprojector};
