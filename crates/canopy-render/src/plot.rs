//! Static survey plot rendering
//!
//! Draws the station/bat scatter over the site extent with plotters: trees
//! red (sized by their sound level), speakers blue, amplifier yellow, bats
//! green, dashed tree-to-speaker connectors, and an optional orthomosaic
//! underlay resampled into the plotting area.

use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::element::{BitMapElement, DashedPathElement};
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;

use canopy_core::error::{CanopyError, Result};
use canopy_core::models::{BatSet, BoundingBox, StationSet};
use canopy_core::raster::Orthomosaic;

const TREE_COLOR: RGBColor = RGBColor(228, 26, 28);
const SPEAKER_COLOR: RGBColor = RGBColor(55, 126, 184);
const AMP_COLOR: RGBColor = RGBColor(255, 215, 0);
const BAT_COLOR: RGBColor = RGBColor(77, 175, 74);

/// Fraction of the extent added as padding on every side
const EXTENT_PADDING: f64 = 0.1;

/// Plot rendering options
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    /// Text labels and legend need a usable font at runtime
    pub labels: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self { width: 1200, height: 1200, labels: true }
    }
}

/// Marker radius for a tree, from the matplotlib sizing `sound_dB² / 2`
/// (an area), converted to pixels and clamped to stay legible
fn tree_radius(sound_db: Option<f64>) -> i32 {
    let area = sound_db.unwrap_or(0.0).powi(2) / 2.0;
    let radius = (area / std::f64::consts::PI).sqrt();
    radius.clamp(3.0, 24.0) as i32
}

fn render_error(e: impl std::fmt::Display) -> CanopyError {
    CanopyError::Render(e.to_string())
}

/// Render the survey scene to a PNG file.
///
/// The chart extent is the stations' bounding box (bats included when
/// present) padded by 10% on each side, matching the interactive map frame.
pub fn render_survey_plot(
    path: &Path,
    stations: &StationSet,
    bats: Option<&BatSet>,
    ortho: Option<&Orthomosaic>,
    options: &PlotOptions,
) -> Result<()> {
    let points = stations
        .stations
        .iter()
        .map(|s| (s.lon, s.lat))
        .chain(bats.into_iter().flat_map(|b| b.detections.iter().map(|d| (d.lon, d.lat))));
    let bbox = BoundingBox::from_points(points).ok_or_else(|| CanopyError::NothingToRender {
        reason: "no stations or detections to plot".to_string(),
    })?;
    let extent = padded_extent(&bbox);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let root =
        BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(if options.labels { 50 } else { 0 })
        .y_label_area_size(if options.labels { 70 } else { 0 })
        .build_cartesian_2d(extent.west..extent.east, extent.south..extent.north)
        .map_err(render_error)?;

    if options.labels {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc("Longitude (°)")
            .y_desc("Latitude (°)")
            .draw()
            .map_err(render_error)?;
    }

    // Underlay first so every vector layer sits on top of it
    if let Some(ortho) = ortho {
        draw_orthomosaic(&mut chart, ortho, &extent, options)?;
    }

    let trees = stations.trees();
    let speakers = stations.speakers();

    // Dashed tree-to-speaker connectors
    for tree in &trees {
        for speaker in &speakers {
            chart
                .draw_series(std::iter::once(DashedPathElement::new(
                    vec![(tree.lon, tree.lat), (speaker.lon, speaker.lat)],
                    6,
                    8,
                    WHITE.mix(0.3).stroke_width(1),
                )))
                .map_err(render_error)?;
        }
    }

    {
        let series = chart
            .draw_series(trees.iter().map(|t| {
                Circle::new((t.lon, t.lat), tree_radius(t.sound_db), TREE_COLOR.mix(0.7).filled())
            }))
            .map_err(render_error)?;
        if options.labels {
            series.label("Trees").legend(|(x, y)| Circle::new((x, y), 5, TREE_COLOR.filled()));
        }
    }

    {
        let series = chart
            .draw_series(
                speakers
                    .iter()
                    .map(|s| Circle::new((s.lon, s.lat), 7, SPEAKER_COLOR.filled())),
            )
            .map_err(render_error)?;
        if options.labels {
            series
                .label("Speakers")
                .legend(|(x, y)| Circle::new((x, y), 5, SPEAKER_COLOR.filled()));
        }
    }

    {
        let series = chart
            .draw_series(
                stations
                    .amplifiers()
                    .iter()
                    .map(|a| Circle::new((a.lon, a.lat), 7, AMP_COLOR.filled())),
            )
            .map_err(render_error)?;
        if options.labels {
            series
                .label("Amplifier")
                .legend(|(x, y)| Circle::new((x, y), 5, AMP_COLOR.filled()));
        }
    }

    if let Some(bats) = bats {
        let series = chart
            .draw_series(
                bats.detections
                    .iter()
                    .map(|d| Circle::new((d.lon, d.lat), 10, BAT_COLOR.mix(0.8).filled())),
            )
            .map_err(render_error)?;
        if options.labels {
            series.label("Bats").legend(|(x, y)| Circle::new((x, y), 5, BAT_COLOR.filled()));
        }
    }

    if options.labels {
        draw_annotations(&mut chart, stations, bats, &extent)?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }

    root.present().map_err(render_error)?;
    tracing::info!(path = %path.display(), "wrote survey plot");
    Ok(())
}

/// Pad the extent, guarding against a degenerate single-point box
fn padded_extent(bbox: &BoundingBox) -> BoundingBox {
    let mut extent = bbox.expanded(EXTENT_PADDING);
    if extent.width() < f64::EPSILON {
        extent.west -= 0.001;
        extent.east += 0.001;
    }
    if extent.height() < f64::EPSILON {
        extent.south -= 0.001;
        extent.north += 0.001;
    }
    extent
}

type SurveyChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Blit the orthomosaic into the plotting area, resampled so its
/// geographic bounds line up with the chart coordinates
fn draw_orthomosaic(
    chart: &mut SurveyChart,
    ortho: &Orthomosaic,
    extent: &BoundingBox,
    _options: &PlotOptions,
) -> Result<()> {
    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    let area_w = (x_px.end - x_px.start).max(1) as f64;
    let area_h = (y_px.end - y_px.start).max(1) as f64;

    let px_w = (ortho.bounds.width() / extent.width() * area_w).round().max(1.0) as u32;
    let px_h = (ortho.bounds.height() / extent.height() * area_h).round().max(1.0) as u32;

    let resized =
        image::imageops::resize(&ortho.image, px_w, px_h, image::imageops::FilterType::Triangle);

    let element = BitMapElement::with_owned_buffer(
        (ortho.bounds.west, ortho.bounds.north),
        (px_w, px_h),
        resized.into_raw(),
    )
    .ok_or_else(|| CanopyError::Render("orthomosaic buffer size mismatch".to_string()))?;

    chart.draw_series(std::iter::once(element)).map_err(render_error)?;
    Ok(())
}

/// Station identity labels and multi-line bat annotations
fn draw_annotations(
    chart: &mut SurveyChart,
    stations: &StationSet,
    bats: Option<&BatSet>,
    extent: &BoundingBox,
) -> Result<()> {
    let line_height = extent.height() * 0.015;
    let style = ("sans-serif", 13).into_font().color(&BLACK);

    for tree in stations.trees() {
        let db = tree.sound_db.map(|v| format!("{v}dB")).unwrap_or_default();
        let text = format!("{}-{} | {}", tree.row, tree.designation, db);
        chart
            .draw_series(std::iter::once(Text::new(
                text,
                (tree.lon, tree.lat - line_height),
                style.clone(),
            )))
            .map_err(render_error)?;
    }

    if let Some(bats) = bats {
        for detection in &bats.detections {
            for (i, line) in detection.annotation().lines().enumerate() {
                chart
                    .draw_series(std::iter::once(Text::new(
                        line.to_string(),
                        (detection.lon, detection.lat - line_height * (i as f64 + 1.0)),
                        style.clone(),
                    )))
                    .map_err(render_error)?;
            }
        }
    }

    Ok(())
}
