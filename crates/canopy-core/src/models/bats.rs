//! Bat acoustic detection records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::crs::BoundingBox;

/// Position of a detection relative to the playback experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyPeriod {
    Before,
    During,
    After,
}

impl SurveyPeriod {
    /// Parse the `PERIOD` column, case-insensitively
    pub fn from_field(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "before" => Some(SurveyPeriod::Before),
            "during" => Some(SurveyPeriod::During),
            "after" => Some(SurveyPeriod::After),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyPeriod::Before => "before",
            SurveyPeriod::During => "during",
            SurveyPeriod::After => "after",
        }
    }
}

impl std::fmt::Display for SurveyPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One manually identified bat recording at a known position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatDetection {
    /// Manual species/sonotype identification (`MANUAL_ID`)
    pub species: String,
    /// Number of recorded calls at this point (`Nb_of_sound`)
    pub call_count: u32,
    pub date: NaiveDate,
    pub period: SurveyPeriod,
    /// WGS84 longitude in decimal degrees
    pub lon: f64,
    /// WGS84 latitude in decimal degrees
    pub lat: f64,
}

impl BatDetection {
    /// Multi-line annotation used on the static plot
    pub fn annotation(&self) -> String {
        format!(
            "{}\nsounds: {}\n{}\nperiod: {}",
            self.species, self.call_count, self.date, self.period
        )
    }
}

/// The parsed bat detection dataset
#[derive(Debug, Clone, Default)]
pub struct BatSet {
    pub detections: Vec<BatDetection>,
}

impl BatSet {
    pub fn new(detections: Vec<BatDetection>) -> Self {
        Self { detections }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Detections recorded in the given period, in file order
    pub fn in_period(&self, period: SurveyPeriod) -> Vec<&BatDetection> {
        self.detections.iter().filter(|d| d.period == period).collect()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.detections.iter().map(|d| (d.lon, d.lat)))
    }
}
