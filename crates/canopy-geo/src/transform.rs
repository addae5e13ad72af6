//! CRS reprojection via PROJ

use canopy_core::error::{CanopyError, Result};
use canopy_core::models::Crs;
use geo::Point;
use proj::Proj;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// A reusable projection between two coordinate reference systems.
///
/// Identity projections (same EPSG on both sides) skip PROJ entirely.
pub struct Reprojector {
    from: Crs,
    to: Crs,
    proj: Option<Proj>,
}

impl Reprojector {
    pub fn new(from: Crs, to: Crs) -> Result<Self> {
        if crs_match(&from, &to) {
            return Ok(Self { from, to, proj: None });
        }

        let from_def = format!("EPSG:{}", from.epsg);
        let to_def = format!("EPSG:{}", to.epsg);
        let proj = Proj::new_known_crs(&from_def, &to_def, None).map_err(|e| {
            CanopyError::Projection {
                from_epsg: from.epsg,
                to_epsg: to.epsg,
                reason: e.to_string(),
            }
        })?;

        tracing::debug!(from = %from_def, to = %to_def, "created projection");
        Ok(Self { from, to, proj: Some(proj) })
    }

    /// Geographic (WGS84) to the given planar CRS
    pub fn to_planar(projected: &Crs) -> Result<Self> {
        Self::new(Crs::wgs84(), projected.clone())
    }

    /// Project one point. Points are `(x, y)` = `(lon, lat)` in geographic CRS.
    pub fn project(&self, point: Point<f64>) -> Result<Point<f64>> {
        let Some(proj) = &self.proj else {
            return Ok(point);
        };

        let (x, y) = proj.convert((point.x(), point.y())).map_err(|e| CanopyError::Projection {
            from_epsg: self.from.epsg,
            to_epsg: self.to.epsg,
            reason: e.to_string(),
        })?;
        Ok(Point::new(x, y))
    }

    /// Project a slice of points, preserving order
    pub fn project_all(&self, points: &[Point<f64>]) -> Result<Vec<Point<f64>>> {
        points.iter().map(|p| self.project(*p)).collect()
    }

    /// The inverse projection
    pub fn inverse(&self) -> Result<Self> {
        Self::new(self.to.clone(), self.from.clone())
    }
}
