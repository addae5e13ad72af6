//! Survey station records: trees, playback speakers, and the amplifier

use serde::{Deserialize, Serialize};

use crate::models::crs::BoundingBox;

/// What kind of equipment or subject a survey point marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationKind {
    /// A monitored tree with a sound-level measurement
    Tree,
    /// A playback speaker
    Speaker,
    /// The amplifier driving the speakers
    #[serde(rename = "amp")]
    Amplifier,
}

impl StationKind {
    /// Parse the `label` column of the survey CSV
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "tree" => Some(StationKind::Tree),
            "speaker" => Some(StationKind::Speaker),
            "amp" | "amplifier" => Some(StationKind::Amplifier),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StationKind::Tree => "tree",
            StationKind::Speaker => "speaker",
            StationKind::Amplifier => "amp",
        }
    }
}

impl std::fmt::Display for StationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single georeferenced survey point from the sound/tree dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub kind: StationKind,
    /// Planting row the station sits in
    pub row: u32,
    /// Within-row designation (e.g. "A", "B", "3")
    pub designation: String,
    /// Measured sound level in dB, absent for speakers without a reading
    pub sound_db: Option<f64>,
    /// WGS84 longitude in decimal degrees
    pub lon: f64,
    /// WGS84 latitude in decimal degrees
    pub lat: f64,
}

impl Station {
    /// Identity string used for map popups and plot labels,
    /// e.g. `tree_3_B`
    pub fn identity(&self) -> String {
        format!("{}_{}_{}", self.kind.label(), self.row, self.designation)
    }
}

/// The parsed sound/tree dataset, split-friendly by station kind
#[derive(Debug, Clone, Default)]
pub struct StationSet {
    pub stations: Vec<Station>,
}

impl StationSet {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// All stations of one kind, in file order
    pub fn of_kind(&self, kind: StationKind) -> Vec<&Station> {
        self.stations.iter().filter(|s| s.kind == kind).collect()
    }

    pub fn trees(&self) -> Vec<&Station> {
        self.of_kind(StationKind::Tree)
    }

    pub fn speakers(&self) -> Vec<&Station> {
        self.of_kind(StationKind::Speaker)
    }

    pub fn amplifiers(&self) -> Vec<&Station> {
        self.of_kind(StationKind::Amplifier)
    }

    /// Geographic extent of the whole set
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.stations.iter().map(|s| (s.lon, s.lat)))
    }

    /// WGS84 centroid, used for map centering
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.stations.is_empty() {
            return None;
        }
        let n = self.stations.len() as f64;
        let (sum_lon, sum_lat) = self
            .stations
            .iter()
            .fold((0.0, 0.0), |(slon, slat), s| (slon + s.lon, slat + s.lat));
        Some((sum_lon / n, sum_lat / n))
    }
}
