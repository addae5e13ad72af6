//! Clean command implementation

use crate::cli::CleanArgs;
use crate::commands::delimiter_override;
use crate::output::OutputWriter;
use anyhow::{bail, Context, Result};
use canopy_core::config::{CliConfigOverrides, SurveyConfig};
use canopy_core::export::{station_collection, write_geojson, write_station_shapefile};
use canopy_core::ingest::read_stations;
use canopy_core::models::StationSet;
use canopy_render::MapBuilder;
use std::path::Path;

pub fn execute(args: CleanArgs, mut config: SurveyConfig, output: &OutputWriter) -> Result<()> {
    config.update_from_cli(CliConfigOverrides {
        delimiter: delimiter_override(args.delimiter.as_deref())?,
        ..Default::default()
    });

    let stations = read_stations(&args.stations, config.delimiter.value)
        .with_context(|| format!("Failed to read {}", args.stations.display()))?;

    output.info(format!(
        "Parsed {} stations ({} trees, {} speakers, {} amplifiers)",
        stations.len(),
        stations.trees().len(),
        stations.speakers().len(),
        stations.amplifiers().len(),
    ));

    let out_dir = config.output_dir.value.clone();
    let geojson_path = out_dir.join("stations.geojson");
    let shapefile_path = out_dir.join("stations.shp");
    let map_path = out_dir.join("stations_map.html");

    write_geojson(&geojson_path, station_collection(&stations))
        .context("Failed to write stations GeoJSON")?;
    output.success(format!("Wrote {}", geojson_path.display()));

    write_station_shapefile(&shapefile_path, &stations)
        .context("Failed to write stations shapefile")?;
    output.success(format!("Wrote {}", shapefile_path.display()));

    write_marker_map(&map_path, &stations, config.map_zoom.value)?;
    output.success(format!("Wrote {}", map_path.display()));

    Ok(())
}

/// Plain pin-marker map with one popup per station
fn write_marker_map(path: &Path, stations: &StationSet, zoom: u8) -> Result<()> {
    let Some((center_lon, center_lat)) = stations.centroid() else {
        bail!("No stations to map");
    };

    let mut map = MapBuilder::new("Survey stations", center_lat, center_lon, zoom);
    for station in &stations.stations {
        map = map.marker(station.lat, station.lon, station.identity());
    }
    map.write(path).context("Failed to write marker map")?;
    Ok(())
}
