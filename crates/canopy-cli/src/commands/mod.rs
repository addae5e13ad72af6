//! Command implementations

mod clean;
mod inspect;
mod survey;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use canopy_core::config::{parse_delimiter, CliConfigOverrides, SurveyConfig};
use std::path::{Path, PathBuf};

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = resolve_config(cli.config.as_deref(), cli.out.clone())?;

    match cli.command {
        Commands::Clean(args) => clean::execute(args, config, &output),
        Commands::Survey(args) => survey::execute(args, config, &output),
        Commands::Inspect(args) => inspect::execute(args, config, &output),
    }
}

/// Resolve configuration with Default < File < Environment < CLI precedence.
///
/// An explicit `--config` path must exist; a `canopy.toml` in the working
/// directory is picked up only when present.
fn resolve_config(config_path: Option<&Path>, out: Option<PathBuf>) -> Result<SurveyConfig> {
    let mut config = SurveyConfig::with_defaults();

    if let Some(path) = config_path {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    } else {
        let default_path = Path::new("canopy.toml");
        if default_path.exists() {
            config = config
                .load_from_file(default_path)
                .context("Failed to load canopy.toml")?;
        }
    }

    config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        output_dir: out,
        ..Default::default()
    });

    tracing::debug!(
        output_dir = %config.output_dir.value.display(),
        projected_epsg = config.projected_epsg.value,
        "resolved configuration"
    );
    Ok(config)
}

/// Parse an optional `--delimiter` argument into a CLI override
fn delimiter_override(raw: Option<&str>) -> Result<Option<u8>> {
    raw.map(parse_delimiter).transpose().map_err(Into::into)
}
