//! CSV ingest for the two survey datasets

pub mod bats;
pub mod sound_tree;

pub use bats::read_detections;
pub use sound_tree::read_stations;

/// Default delimiter of the sound/tree site exports
pub const DEFAULT_STATION_DELIMITER: u8 = b';';
