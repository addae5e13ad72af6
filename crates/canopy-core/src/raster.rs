//! Orthomosaic loading
//!
//! The drone orthomosaic arrives as a raster image with an ESRI world file
//! sidecar (`.wld`, `.pgw`, `.tfw`, or `.jgw`) giving the affine
//! georeferencing. Only north-up rasters are supported; the rotation terms
//! must be zero.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::{CanopyError, Result};
use crate::export::ensure_parent_dirs;
use crate::models::BoundingBox;

const WORLD_FILE_EXTENSIONS: &[&str] = &["wld", "pgw", "tfw", "jgw"];

/// Affine georeferencing from an ESRI world file.
///
/// The six lines are: x pixel size, row rotation, column rotation, y pixel
/// size (negative for north-up), then x and y of the *center* of the
/// upper-left pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldFile {
    pub x_pixel_size: f64,
    pub y_pixel_size: f64,
    pub upper_left_x: f64,
    pub upper_left_y: f64,
}

impl WorldFile {
    /// Parse the six-line world file format
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let values: Vec<f64> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.parse::<f64>().map_err(|_| CanopyError::WorldFileInvalid {
                    path: path.to_path_buf(),
                    reason: format!("'{line}' is not a number"),
                })
            })
            .collect::<Result<_>>()?;

        if values.len() != 6 {
            return Err(CanopyError::WorldFileInvalid {
                path: path.to_path_buf(),
                reason: format!("expected 6 lines, found {}", values.len()),
            });
        }

        let [a, d, b, e, c, f] = [values[0], values[1], values[2], values[3], values[4], values[5]];

        if d != 0.0 || b != 0.0 {
            return Err(CanopyError::WorldFileInvalid {
                path: path.to_path_buf(),
                reason: "rotated rasters are not supported".to_string(),
            });
        }
        if a <= 0.0 || e >= 0.0 {
            return Err(CanopyError::WorldFileInvalid {
                path: path.to_path_buf(),
                reason: "expected positive x and negative y pixel size".to_string(),
            });
        }

        Ok(WorldFile {
            x_pixel_size: a,
            y_pixel_size: e,
            upper_left_x: c,
            upper_left_y: f,
        })
    }

    /// Geographic bounds of a raster of `width` x `height` pixels.
    /// World file coordinates anchor pixel centers, so the outer edge sits
    /// half a pixel beyond them.
    pub fn bounds(&self, width: u32, height: u32) -> BoundingBox {
        let west = self.upper_left_x - self.x_pixel_size / 2.0;
        let north = self.upper_left_y - self.y_pixel_size / 2.0;
        BoundingBox {
            west,
            north,
            east: west + width as f64 * self.x_pixel_size,
            south: north + height as f64 * self.y_pixel_size,
        }
    }
}

/// A georeferenced orthomosaic ready for map/plot overlay
#[derive(Debug, Clone)]
pub struct Orthomosaic {
    pub image: RgbImage,
    pub bounds: BoundingBox,
}

impl Orthomosaic {
    /// Load a raster and its world file sidecar
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CanopyError::InputNotFound { path: path.to_path_buf() });
        }

        let world_path = find_world_file(path).ok_or_else(|| CanopyError::WorldFileNotFound {
            path: path.to_path_buf(),
        })?;
        let content = std::fs::read_to_string(&world_path)?;
        let world = WorldFile::parse(&content, &world_path)?;

        let image = image::open(path)
            .map_err(|e| CanopyError::RasterDecode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgb8();

        let bounds = world.bounds(image.width(), image.height());
        tracing::info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            ?bounds,
            "loaded orthomosaic"
        );

        Ok(Orthomosaic { image, bounds })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Re-encode as PNG so browsers can display the overlay
    pub fn write_png(&self, path: &Path) -> Result<()> {
        ensure_parent_dirs(path)?;
        self.image.save(path).map_err(|e| CanopyError::RasterDecode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn find_world_file(raster_path: &Path) -> Option<PathBuf> {
    WORLD_FILE_EXTENSIONS
        .iter()
        .map(|ext| raster_path.with_extension(ext))
        .find(|candidate| candidate.exists())
}
