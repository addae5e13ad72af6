//! Survey command implementation

use crate::cli::SurveyArgs;
use crate::commands::delimiter_override;
use crate::output::OutputWriter;
use anyhow::{bail, Context, Result};
use canopy_core::config::{CliConfigOverrides, SurveyConfig};
use canopy_core::export::{
    bat_collection, station_collection, write_bat_shapefile, write_distance_report,
    write_geojson, write_station_shapefile,
};
use canopy_core::ingest::{read_detections, read_stations};
use canopy_core::models::{BatSet, Crs, Station, StationSet};
use canopy_core::raster::Orthomosaic;
use canopy_geo::tree_speaker_distances;
use canopy_render::{render_survey_plot, MapBuilder, PlotOptions};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

const OVERLAY_IMAGE_NAME: &str = "orthomosaic.png";

pub fn execute(args: SurveyArgs, mut config: SurveyConfig, output: &OutputWriter) -> Result<()> {
    config.update_from_cli(CliConfigOverrides {
        projected_epsg: args.projected_crs,
        delimiter: delimiter_override(args.delimiter.as_deref())?,
        plot_labels: if args.no_plot_labels { Some(false) } else { None },
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

    let bats = args
        .bats
        .as_deref()
        .map(|path| {
            read_detections(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .transpose()?;
    if let Some(bats) = &bats {
        output.info(format!("Parsed {} bat detections", bats.len()));
    }

    let ortho = args
        .ortho
        .as_deref()
        .map(|path| {
            Orthomosaic::load(path)
                .with_context(|| format!("Failed to load orthomosaic {}", path.display()))
        })
        .transpose()?;
    if let Some(ortho) = &ortho {
        output.info(format!(
            "Loaded orthomosaic {}x{} covering {:.6}..{:.6} lon",
            ortho.width(),
            ortho.height(),
            ortho.bounds.west,
            ortho.bounds.east,
        ));
    }

    let out_dir = config.output_dir.value.clone();

    write_exports(&out_dir, &stations, bats.as_ref(), output)?;
    let matrix = write_distances(&out_dir, &stations, &config, output)?;
    write_survey_map(&out_dir, &stations, ortho.as_ref(), &config, output)?;
    write_survey_plot(&out_dir, &stations, bats.as_ref(), ortho.as_ref(), &config, output)?;

    summarize_trees(&stations, &matrix, output);

    Ok(())
}

fn write_exports(
    out_dir: &Path,
    stations: &StationSet,
    bats: Option<&BatSet>,
    output: &OutputWriter,
) -> Result<()> {
    let geojson_path = out_dir.join("stations.geojson");
    write_geojson(&geojson_path, station_collection(stations))
        .context("Failed to write stations GeoJSON")?;
    output.success(format!("Wrote {}", geojson_path.display()));

    let shapefile_path = out_dir.join("stations.shp");
    write_station_shapefile(&shapefile_path, stations)
        .context("Failed to write stations shapefile")?;
    output.success(format!("Wrote {}", shapefile_path.display()));

    if let Some(bats) = bats {
        let bats_geojson = out_dir.join("bats.geojson");
        write_geojson(&bats_geojson, bat_collection(bats))
            .context("Failed to write bats GeoJSON")?;
        output.success(format!("Wrote {}", bats_geojson.display()));

        let bats_shapefile = out_dir.join("bats.shp");
        write_bat_shapefile(&bats_shapefile, bats).context("Failed to write bats shapefile")?;
        output.success(format!("Wrote {}", bats_shapefile.display()));
    }

    Ok(())
}

/// Tree-to-speaker distance matrix plus its CSV report
fn write_distances(
    out_dir: &Path,
    stations: &StationSet,
    config: &SurveyConfig,
    output: &OutputWriter,
) -> Result<Vec<Vec<f64>>> {
    let trees = stations.trees();
    let speakers = stations.speakers();
    if trees.is_empty() || speakers.is_empty() {
        output.warning("No tree/speaker pairs; the distance report will be empty");
    }

    let projected = Crs::from_epsg(config.projected_epsg.value);
    let matrix = tree_speaker_distances(&trees, &speakers, &projected)
        .context("Failed to compute tree-to-speaker distances")?;

    let report_path = out_dir.join("distances.csv");
    write_distance_report(&report_path, &trees, speakers.len(), &matrix)
        .context("Failed to write distance report")?;
    output.success(format!("Wrote {}", report_path.display()));

    Ok(matrix)
}

/// Interactive circle-marker map, with the orthomosaic PNG written next to
/// the HTML so the overlay URL stays relative
fn write_survey_map(
    out_dir: &Path,
    stations: &StationSet,
    ortho: Option<&Orthomosaic>,
    config: &SurveyConfig,
    output: &OutputWriter,
) -> Result<()> {
    let Some((center_lon, center_lat)) = stations.centroid() else {
        bail!("No stations to map");
    };

    let mut map = MapBuilder::new("Sound survey", center_lat, center_lon, config.map_zoom.value);
    for station in &stations.stations {
        let (radius, color) = circle_style(station);
        map = map.circle_marker(station.lat, station.lon, radius, color, 0.7, popup(station));
    }

    if let Some(ortho) = ortho {
        let image_path = out_dir.join(OVERLAY_IMAGE_NAME);
        ortho.write_png(&image_path).context("Failed to write overlay image")?;
        output.success(format!("Wrote {}", image_path.display()));
        map = map.image_overlay(OVERLAY_IMAGE_NAME, ortho.bounds, config.overlay_opacity.value);
    }

    let map_path = out_dir.join("survey_map.html");
    map.write(&map_path).context("Failed to write survey map")?;
    output.success(format!("Wrote {}", map_path.display()));

    Ok(())
}

fn write_survey_plot(
    out_dir: &Path,
    stations: &StationSet,
    bats: Option<&BatSet>,
    ortho: Option<&Orthomosaic>,
    config: &SurveyConfig,
    output: &OutputWriter,
) -> Result<()> {
    let plot_path = out_dir.join("survey_plot.png");
    let options = PlotOptions { labels: config.plot_labels.value, ..Default::default() };
    render_survey_plot(&plot_path, stations, bats, ortho, &options)
        .context("Failed to render survey plot")?;
    output.success(format!("Wrote {}", plot_path.display()));
    Ok(())
}

/// Marker sizing from the folium map: trees scale with their sound level,
/// speakers and the amplifier are fixed-size
fn circle_style(station: &Station) -> (f64, &'static str) {
    use canopy_core::models::StationKind;
    match station.kind {
        StationKind::Tree => (station.sound_db.unwrap_or(10.0) / 2.0, "red"),
        StationKind::Speaker => (5.0, "blue"),
        StationKind::Amplifier => (5.0, "yellow"),
    }
}

fn popup(station: &Station) -> String {
    match station.sound_db {
        Some(db) => format!("{} | {db}dB", station.identity()),
        None => station.identity(),
    }
}

fn summarize_trees(stations: &StationSet, matrix: &[Vec<f64>], output: &OutputWriter) {
    #[derive(Tabled, Serialize)]
    struct TreeRow {
        #[tabled(rename = "Tree")]
        tree: String,
        #[tabled(rename = "Sound (dB)")]
        sound_db: String,
        #[tabled(rename = "Nearest speaker")]
        nearest: String,
        #[tabled(rename = "Distance (m)")]
        distance: String,
    }

    let speakers = stations.speakers();
    let rows: Vec<TreeRow> = stations
        .trees()
        .iter()
        .zip(matrix)
        .map(|(tree, distances)| {
            let nearest = distances
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1));
            let (nearest_name, distance) = match nearest {
                Some((j, d)) => (
                    speakers.get(j).map(|s| s.identity()).unwrap_or_default(),
                    format!("{d:.2}"),
                ),
                None => (String::new(), String::new()),
            };
            TreeRow {
                tree: tree.identity(),
                sound_db: tree
                    .sound_db
                    .map(|db| format!("{db}"))
                    .unwrap_or_else(|| "-".to_string()),
                nearest: nearest_name,
                distance,
            }
        })
        .collect();

    output.section("Trees and nearest speakers");
    output.table(rows);
}
