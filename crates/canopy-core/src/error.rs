//! Error types for the canopy toolkit

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanopyError {
    // Ingest errors
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Dataset {name} is empty")]
    EmptyDataset { name: String },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Row {row}: invalid coordinate '{value}': {reason}")]
    InvalidCoordinate {
        row: usize,
        value: String,
        reason: String,
    },

    #[error("Row {row}: unknown station label '{label}' (expected tree, speaker, or amp)")]
    UnknownLabel { row: usize, label: String },

    #[error("Row {row}: invalid value for {field}: {reason}")]
    InvalidField {
        row: usize,
        field: String,
        reason: String,
    },

    // Raster errors
    #[error("No world file found for raster {path} (looked for .wld, .pgw, .tfw, .jgw)")]
    WorldFileNotFound { path: PathBuf },

    #[error("Invalid world file {path}: {reason}")]
    WorldFileInvalid { path: PathBuf, reason: String },

    #[error("Failed to decode raster {path}: {reason}")]
    RasterDecode { path: PathBuf, reason: String },

    // Reprojection errors
    #[error("Reprojection from EPSG:{from_epsg} to EPSG:{to_epsg} failed: {reason}")]
    Projection {
        from_epsg: u32,
        to_epsg: u32,
        reason: String,
    },

    // Rendering errors
    #[error("Nothing to render: {reason}")]
    NothingToRender { reason: String },

    #[error("Rendering failed: {0}")]
    Render(String),

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO / format errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CanopyError>;
