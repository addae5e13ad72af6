//! Layered pipeline configuration
//!
//! Values resolve with Default < File < Environment < CLI precedence, and
//! each value remembers where it came from for `inspect` output.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CanopyError, Result};
use crate::ingest::DEFAULT_STATION_DELIMITER;

/// Where a configuration value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    Cli,
}

impl ConfigSource {
    /// Higher precedence wins
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Resolved pipeline configuration
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Planar CRS used for metric distances
    pub projected_epsg: ConfigValue<u32>,
    /// Delimiter of the sound/tree CSV
    pub delimiter: ConfigValue<u8>,
    /// Directory all outputs are written into
    pub output_dir: ConfigValue<PathBuf>,
    /// Initial zoom of the interactive map
    pub map_zoom: ConfigValue<u8>,
    /// Orthomosaic overlay opacity on the interactive map
    pub overlay_opacity: ConfigValue<f64>,
    /// Draw text labels on the static plot (needs fonts at runtime)
    pub plot_labels: ConfigValue<bool>,
}

impl SurveyConfig {
    pub fn with_defaults() -> Self {
        Self {
            projected_epsg: ConfigValue::new(3163, ConfigSource::Default),
            delimiter: ConfigValue::new(DEFAULT_STATION_DELIMITER, ConfigSource::Default),
            output_dir: ConfigValue::new(PathBuf::from("output"), ConfigSource::Default),
            map_zoom: ConfigValue::new(18, ConfigSource::Default),
            overlay_opacity: ConfigValue::new(0.8, ConfigSource::Default),
            plot_labels: ConfigValue::new(true, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| CanopyError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to read config file: {e}"),
        })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| CanopyError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {e}"),
            })?;

        if let Some(epsg) = file_config.projected_epsg {
            self.projected_epsg.update(epsg, ConfigSource::File);
        }
        if let Some(delimiter) = file_config.delimiter {
            self.delimiter.update(parse_delimiter(&delimiter)?, ConfigSource::File);
        }
        if let Some(output_dir) = file_config.output_dir {
            self.output_dir.update(output_dir, ConfigSource::File);
        }
        if let Some(zoom) = file_config.map_zoom {
            self.map_zoom.update(zoom, ConfigSource::File);
        }
        if let Some(opacity) = file_config.overlay_opacity {
            self.overlay_opacity.update(check_opacity(opacity)?, ConfigSource::File);
        }
        if let Some(labels) = file_config.plot_labels {
            self.plot_labels.update(labels, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from `CANOPY_*` environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(raw) = env::var("CANOPY_PROJECTED_EPSG") {
            match raw.parse::<u32>() {
                Ok(epsg) => self.projected_epsg.update(epsg, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CANOPY_PROJECTED_EPSG value '{}': expected integer EPSG code",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("CANOPY_DELIMITER") {
            match parse_delimiter(&raw) {
                Ok(delimiter) => self.delimiter.update(delimiter, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CANOPY_DELIMITER value '{}': expected a single ASCII character",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("CANOPY_OUTPUT_DIR") {
            self.output_dir.update(PathBuf::from(raw), ConfigSource::Environment);
        }

        if let Ok(raw) = env::var("CANOPY_MAP_ZOOM") {
            match raw.parse::<u8>() {
                Ok(zoom) => self.map_zoom.update(zoom, ConfigSource::Environment),
                Err(_) => {
                    tracing::warn!("Invalid CANOPY_MAP_ZOOM value '{}': expected 0-25", raw)
                }
            }
        }

        if let Ok(raw) = env::var("CANOPY_OVERLAY_OPACITY") {
            match raw.parse::<f64>().ok().and_then(|v| check_opacity(v).ok()) {
                Some(opacity) => self.overlay_opacity.update(opacity, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid CANOPY_OVERLAY_OPACITY value '{}': expected a number in [0, 1]",
                    raw
                ),
            }
        }

        if let Ok(raw) = env::var("CANOPY_PLOT_LABELS") {
            match raw.parse::<bool>() {
                Ok(labels) => self.plot_labels.update(labels, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid CANOPY_PLOT_LABELS value '{}': expected true or false",
                    raw
                ),
            }
        }

        self
    }

    /// Apply CLI argument overrides
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(epsg) = overrides.projected_epsg {
            self.projected_epsg.update(epsg, ConfigSource::Cli);
        }
        if let Some(delimiter) = overrides.delimiter {
            self.delimiter.update(delimiter, ConfigSource::Cli);
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir.update(output_dir, ConfigSource::Cli);
        }
        if let Some(labels) = overrides.plot_labels {
            self.plot_labels.update(labels, ConfigSource::Cli);
        }
    }

    /// All values as a map for `inspect` output
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();
        map.insert(
            "projected_epsg".to_string(),
            (format!("EPSG:{}", self.projected_epsg.value), self.projected_epsg.source),
        );
        map.insert(
            "delimiter".to_string(),
            ((self.delimiter.value as char).to_string(), self.delimiter.source),
        );
        map.insert(
            "output_dir".to_string(),
            (self.output_dir.value.display().to_string(), self.output_dir.source),
        );
        map.insert(
            "map_zoom".to_string(),
            (self.map_zoom.value.to_string(), self.map_zoom.source),
        );
        map.insert(
            "overlay_opacity".to_string(),
            (self.overlay_opacity.value.to_string(), self.overlay_opacity.source),
        );
        map.insert(
            "plot_labels".to_string(),
            (self.plot_labels.value.to_string(), self.plot_labels.source),
        );
        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    projected_epsg: Option<u32>,
    delimiter: Option<String>,
    output_dir: Option<PathBuf>,
    map_zoom: Option<u8>,
    overlay_opacity: Option<f64>,
    plot_labels: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub projected_epsg: Option<u32>,
    pub delimiter: Option<u8>,
    pub output_dir: Option<PathBuf>,
    pub plot_labels: Option<bool>,
}

/// Parse a one-character delimiter string
pub fn parse_delimiter(s: &str) -> Result<u8> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(CanopyError::ConfigInvalid {
            key: "delimiter".to_string(),
            reason: format!("'{s}' is not a single ASCII character"),
        }),
    }
}

fn check_opacity(value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CanopyError::ConfigInvalid {
            key: "overlay_opacity".to_string(),
            reason: format!("{value} is not in [0, 1]"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SurveyConfig::with_defaults();
        assert_eq!(config.projected_epsg.value, 3163);
        assert_eq!(config.projected_epsg.source, ConfigSource::Default);
        assert_eq!(config.delimiter.value, b';');
        assert_eq!(config.output_dir.value, PathBuf::from("output"));
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);

        value.update(300, ConfigSource::Cli);
        assert_eq!(value.value, 300);

        // Lower precedence does not override
        value.update(400, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
projected_epsg = 3857
delimiter = ","
output_dir = "results"
overlay_opacity = 0.5
plot_labels = false
"#
        )
        .unwrap();

        let config = SurveyConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.projected_epsg.value, 3857);
        assert_eq!(config.projected_epsg.source, ConfigSource::File);
        assert_eq!(config.delimiter.value, b',');
        assert_eq!(config.output_dir.value, PathBuf::from("results"));
        assert_eq!(config.overlay_opacity.value, 0.5);
        assert!(!config.plot_labels.value);
        // Untouched values keep their defaults
        assert_eq!(config.map_zoom.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_env() {
        // One test owns all CANOPY_* variables so parallel tests don't race
        env::set_var("CANOPY_PROJECTED_EPSG", "32758");
        env::set_var("CANOPY_DELIMITER", ",");
        env::set_var("CANOPY_OUTPUT_DIR", "env_out");
        env::set_var("CANOPY_MAP_ZOOM", "15");
        env::set_var("CANOPY_OVERLAY_OPACITY", "0.3");
        env::set_var("CANOPY_PLOT_LABELS", "false");

        let config = SurveyConfig::with_defaults().load_from_env();

        assert_eq!(config.projected_epsg.value, 32758);
        assert_eq!(config.projected_epsg.source, ConfigSource::Environment);
        assert_eq!(config.delimiter.value, b',');
        assert_eq!(config.output_dir.value, PathBuf::from("env_out"));
        assert_eq!(config.map_zoom.value, 15);
        assert_eq!(config.overlay_opacity.value, 0.3);
        assert_eq!(config.overlay_opacity.source, ConfigSource::Environment);
        assert!(!config.plot_labels.value);
        assert_eq!(config.plot_labels.source, ConfigSource::Environment);

        // Unparseable or out-of-range values are ignored with a warning
        env::set_var("CANOPY_OVERLAY_OPACITY", "1.5");
        env::set_var("CANOPY_PLOT_LABELS", "maybe");
        let config = SurveyConfig::with_defaults().load_from_env();
        assert_eq!(config.overlay_opacity.value, 0.8);
        assert_eq!(config.overlay_opacity.source, ConfigSource::Default);
        assert!(config.plot_labels.value);

        for key in [
            "CANOPY_PROJECTED_EPSG",
            "CANOPY_DELIMITER",
            "CANOPY_OUTPUT_DIR",
            "CANOPY_MAP_ZOOM",
            "CANOPY_OVERLAY_OPACITY",
            "CANOPY_PLOT_LABELS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_bad_opacity_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "overlay_opacity = 1.5").unwrap();
        let err = SurveyConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, CanopyError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SurveyConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            projected_epsg: Some(32758),
            delimiter: Some(b','),
            output_dir: None,
            plot_labels: Some(false),
        });

        assert_eq!(config.projected_epsg.value, 32758);
        assert_eq!(config.projected_epsg.source, ConfigSource::Cli);
        assert_eq!(config.delimiter.value, b',');
        assert!(!config.plot_labels.value);
        assert_eq!(config.output_dir.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = SurveyConfig::with_defaults();
        let map = config.to_inspection_map();
        assert_eq!(map["projected_epsg"].0, "EPSG:3163");
        assert_eq!(map["delimiter"].0, ";");
        assert_eq!(map["projected_epsg"].1, ConfigSource::Default);
    }
}
