//! Writers for the processed survey points
//!
//! The pipeline exports the converted point sets as GeoJSON and Shapefile,
//! plus a CSV report of the computed tree-to-speaker distances.

pub mod geojson;
pub mod report;
pub mod shapefile;

pub use geojson::{bat_collection, station_collection, write_geojson};
pub use report::write_distance_report;
pub use shapefile::{write_bat_shapefile, write_station_shapefile};

use std::path::Path;

use crate::error::Result;

/// Create parent directories for an output path if they don't exist
pub(crate) fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
