//! canopy-core - Domain models, ingest, coordinate parsing, and exports
//!
//! This crate contains everything the survey pipeline needs short of
//! reprojection (canopy-geo) and rendering (canopy-render).

pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod ingest;
pub mod models;
pub mod raster;

pub use error::{CanopyError, Result};
