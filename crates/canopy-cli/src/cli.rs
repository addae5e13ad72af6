use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// canopy - field-survey geospatial toolkit
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "Ingest survey CSVs, reproject, compute distances, render maps and plots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML configuration file (defaults to ./canopy.toml if present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory all outputs are written into
    #[arg(long, global = true, value_name = "DIR")]
    pub out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert the sound/tree CSV and export points plus a marker map
    Clean(CleanArgs),

    /// Run the full survey analysis: distances, overlay map, plot, bat exports
    Survey(SurveyArgs),

    /// Preview a dataset and show the resolved configuration
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Path to the sound/tree CSV (location;label;row;designation;sound_dB)
    pub stations: PathBuf,

    /// CSV delimiter (single ASCII character, default ';')
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SurveyArgs {
    /// Path to the sound/tree CSV
    pub stations: PathBuf,

    /// Path to the bat detections CSV
    #[arg(long, value_name = "PATH")]
    pub bats: Option<PathBuf>,

    /// Path to the orthomosaic raster (requires a world file sidecar)
    #[arg(long, value_name = "PATH")]
    pub ortho: Option<PathBuf>,

    /// CSV delimiter for the stations file
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Planar CRS for distance computation (EPSG code)
    #[arg(long, value_name = "EPSG")]
    pub projected_crs: Option<u32>,

    /// Skip text labels and legend on the static plot
    #[arg(long)]
    pub no_plot_labels: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to a survey CSV
    pub path: PathBuf,

    /// The file is a bat detections CSV, not a stations CSV
    #[arg(long)]
    pub bats: bool,

    /// CSV delimiter for stations files
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Show the resolved configuration and where each value came from
    #[arg(long)]
    pub show_config: bool,

    /// Number of rows of the preview table
    #[arg(long, default_value = "10")]
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_survey_args_parse() {
        let cli = Cli::try_parse_from([
            "canopy",
            "survey",
            "sound_and_tree_data.csv",
            "--bats",
            "bats_t1.csv",
            "--projected-crs",
            "3163",
            "--out",
            "results",
        ])
        .unwrap();

        match cli.command {
            Commands::Survey(args) => {
                assert_eq!(args.stations, PathBuf::from("sound_and_tree_data.csv"));
                assert_eq!(args.bats, Some(PathBuf::from("bats_t1.csv")));
                assert_eq!(args.projected_crs, Some(3163));
            }
            other => panic!("expected survey command, got {other:?}"),
        }
        assert_eq!(cli.out, Some(PathBuf::from("results")));
    }

    #[test]
    fn test_global_json_flag() {
        let cli = Cli::try_parse_from(["canopy", "clean", "data.csv", "--json"]).unwrap();
        assert!(cli.json);
    }
}
