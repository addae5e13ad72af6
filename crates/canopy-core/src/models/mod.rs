//! Domain models for the survey pipeline

pub mod bats;
pub mod crs;
pub mod station;

pub use bats::{BatDetection, BatSet, SurveyPeriod};
pub use crs::{BoundingBox, Crs};
pub use station::{Station, StationKind, StationSet};
