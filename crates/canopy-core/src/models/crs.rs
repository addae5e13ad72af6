//! Coordinate reference systems used by the survey pipeline

use serde::{Deserialize, Serialize};

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl Crs {
    pub fn new(epsg: u32, name: impl Into<String>) -> Self {
        Self { epsg, name: name.into() }
    }

    /// WGS 84 (EPSG:4326), the geographic CRS of all ingested coordinates
    pub fn wgs84() -> Self {
        Self::new(4326, "WGS 84")
    }

    /// RGNC91-93 / Lambert New Caledonia (EPSG:3163), the planar CRS used
    /// for metric distance computation at the survey sites
    pub fn lambert_new_caledonia() -> Self {
        Self::new(3163, "RGNC91-93 / Lambert New Caledonia")
    }

    /// Build a CRS from a bare EPSG code, naming the known ones
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => Self::wgs84(),
            3163 => Self::lambert_new_caledonia(),
            3857 => Self::new(3857, "Web Mercator"),
            _ => Self::new(epsg, format!("EPSG:{epsg}")),
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{} ({})", self.epsg, self.name)
    }
}

/// Geographic bounding box in degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Smallest box containing all of the given lon/lat pairs.
    /// Returns None for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = points.into_iter();
        let (lon0, lat0) = iter.next()?;
        let mut bbox = BoundingBox { west: lon0, south: lat0, east: lon0, north: lat0 };
        for (lon, lat) in iter {
            bbox.west = bbox.west.min(lon);
            bbox.east = bbox.east.max(lon);
            bbox.south = bbox.south.min(lat);
            bbox.north = bbox.north.max(lat);
        }
        Some(bbox)
    }

    /// Expand the box by a fraction of its extent on every side
    pub fn expanded(&self, fraction: f64) -> Self {
        let dx = (self.east - self.west) * fraction;
        let dy = (self.north - self.south) * fraction;
        BoundingBox {
            west: self.west - dx,
            south: self.south - dy,
            east: self.east + dx,
            north: self.north + dy,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}
