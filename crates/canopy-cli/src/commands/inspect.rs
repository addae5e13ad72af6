//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::commands::delimiter_override;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use canopy_core::config::{CliConfigOverrides, SurveyConfig};
use canopy_core::ingest::{read_detections, read_stations};
use canopy_core::models::{BatSet, BoundingBox, Crs, SurveyPeriod};
use serde::Serialize;
use tabled::Tabled;

pub fn execute(args: InspectArgs, mut config: SurveyConfig, output: &OutputWriter) -> Result<()> {
    config.update_from_cli(CliConfigOverrides {
        delimiter: delimiter_override(args.delimiter.as_deref())?,
        ..Default::default()
    });

    if args.bats {
        inspect_bats(&args, output)?;
    } else {
        inspect_stations(&args, &config, output)?;
    }

    if args.show_config {
        show_config(&config, output);
    }

    Ok(())
}

fn inspect_stations(args: &InspectArgs, config: &SurveyConfig, output: &OutputWriter) -> Result<()> {
    let stations = read_stations(&args.path, config.delimiter.value)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    #[derive(Tabled, Serialize)]
    struct StationRow {
        #[tabled(rename = "Kind")]
        kind: String,
        #[tabled(rename = "Row")]
        row: u32,
        #[tabled(rename = "Designation")]
        designation: String,
        #[tabled(rename = "Sound (dB)")]
        sound_db: String,
        #[tabled(rename = "Longitude")]
        lon: String,
        #[tabled(rename = "Latitude")]
        lat: String,
    }

    let rows: Vec<StationRow> = stations
        .stations
        .iter()
        .take(args.rows)
        .map(|s| StationRow {
            kind: s.kind.label().to_string(),
            row: s.row,
            designation: s.designation.clone(),
            sound_db: s.sound_db.map(|db| format!("{db}")).unwrap_or_else(|| "-".to_string()),
            lon: format!("{:.6}", s.lon),
            lat: format!("{:.6}", s.lat),
        })
        .collect();

    output.section(format!("Stations ({} rows)", stations.len()));
    output.table(rows);
    describe_extent(stations.bounding_box(), output);

    Ok(())
}

fn inspect_bats(args: &InspectArgs, output: &OutputWriter) -> Result<()> {
    let bats = read_detections(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    #[derive(Tabled, Serialize)]
    struct BatRow {
        #[tabled(rename = "Species")]
        species: String,
        #[tabled(rename = "Calls")]
        call_count: u32,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Period")]
        period: String,
        #[tabled(rename = "Longitude")]
        lon: String,
        #[tabled(rename = "Latitude")]
        lat: String,
    }

    let rows: Vec<BatRow> = bats
        .detections
        .iter()
        .take(args.rows)
        .map(|d| BatRow {
            species: d.species.clone(),
            call_count: d.call_count,
            date: d.date.to_string(),
            period: d.period.to_string(),
            lon: format!("{:.6}", d.lon),
            lat: format!("{:.6}", d.lat),
        })
        .collect();

    output.section(format!("Bat detections ({} rows)", bats.len()));
    output.table(rows);
    output.kv("Detections by period", period_summary(&bats));
    describe_extent(bats.bounding_box(), output);

    Ok(())
}

/// Detection counts per playback period, e.g. `before: 2, during: 5, after: 1`
fn period_summary(bats: &BatSet) -> String {
    [SurveyPeriod::Before, SurveyPeriod::During, SurveyPeriod::After]
        .iter()
        .map(|p| format!("{p}: {}", bats.in_period(*p).len()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_extent(bbox: Option<BoundingBox>, output: &OutputWriter) {
    output.kv("CRS", Crs::wgs84());
    match bbox {
        Some(bbox) => {
            output.kv(
                "Extent",
                format!(
                    "lon {:.6}..{:.6}, lat {:.6}..{:.6}",
                    bbox.west, bbox.east, bbox.south, bbox.north
                ),
            );
            let (lon, lat) = bbox.center();
            output.kv("Center", format!("lon {lon:.6}, lat {lat:.6}"));
        }
        None => output.warning("Dataset has no points"),
    }
}

fn show_config(config: &SurveyConfig, output: &OutputWriter) {
    #[derive(Tabled, Serialize)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{source:?}"),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.section("Configuration");
    output.table(rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::models::BatDetection;

    #[test]
    fn test_period_summary_counts_all_periods() {
        let detection = |period| BatDetection {
            species: "Miniopterus robustior".to_string(),
            call_count: 1,
            date: Default::default(),
            period,
            lon: 164.24,
            lat: -20.75,
        };
        let bats = BatSet::new(vec![
            detection(SurveyPeriod::During),
            detection(SurveyPeriod::During),
            detection(SurveyPeriod::After),
        ]);
        assert_eq!(period_summary(&bats), "before: 0, during: 2, after: 1");
    }
}
