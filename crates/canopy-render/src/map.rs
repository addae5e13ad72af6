//! Interactive Leaflet map generation
//!
//! Produces a single self-contained HTML document pulling Leaflet 1.9.4 from
//! the CDN, with an OpenStreetMap tile layer, plain and circle markers, and
//! an optional georeferenced image overlay.

use std::path::Path;

use canopy_core::error::Result;
use canopy_core::models::BoundingBox;

const LEAFLET_VERSION: &str = "1.9.4";

/// A plain marker with a popup
#[derive(Debug, Clone)]
struct Marker {
    lat: f64,
    lon: f64,
    popup: String,
}

/// A circle marker in the style of the survey maps
#[derive(Debug, Clone)]
struct CircleMarker {
    lat: f64,
    lon: f64,
    radius: f64,
    color: String,
    fill_opacity: f64,
    popup: String,
}

/// A georeferenced image overlay
#[derive(Debug, Clone)]
struct ImageOverlay {
    url: String,
    bounds: BoundingBox,
    opacity: f64,
}

/// Builder for the survey map document
#[derive(Debug, Clone)]
pub struct MapBuilder {
    title: String,
    center: (f64, f64),
    zoom: u8,
    markers: Vec<Marker>,
    circles: Vec<CircleMarker>,
    overlay: Option<ImageOverlay>,
}

impl MapBuilder {
    /// Create a map centered at `(lat, lon)`
    pub fn new(title: impl Into<String>, center_lat: f64, center_lon: f64, zoom: u8) -> Self {
        Self {
            title: title.into(),
            center: (center_lat, center_lon),
            zoom,
            markers: Vec::new(),
            circles: Vec::new(),
            overlay: None,
        }
    }

    pub fn marker(mut self, lat: f64, lon: f64, popup: impl Into<String>) -> Self {
        self.markers.push(Marker { lat, lon, popup: popup.into() });
        self
    }

    pub fn circle_marker(
        mut self,
        lat: f64,
        lon: f64,
        radius: f64,
        color: &str,
        fill_opacity: f64,
        popup: impl Into<String>,
    ) -> Self {
        self.circles.push(CircleMarker {
            lat,
            lon,
            radius,
            color: color.to_string(),
            fill_opacity,
            popup: popup.into(),
        });
        self
    }

    /// Overlay an image (URL relative to the HTML file) across geographic bounds
    pub fn image_overlay(mut self, url: impl Into<String>, bounds: BoundingBox, opacity: f64) -> Self {
        self.overlay = Some(ImageOverlay { url: url.into(), bounds, opacity });
        self
    }

    /// Render the full HTML document
    pub fn render(&self) -> String {
        let mut layers = String::new();

        if let Some(overlay) = &self.overlay {
            let b = &overlay.bounds;
            layers.push_str(&format!(
                "    L.imageOverlay({url}, [[{s}, {w}], [{n}, {e}]], {{opacity: {o}, interactive: true}}).addTo(map);\n",
                url = js_string(&overlay.url),
                s = b.south,
                w = b.west,
                n = b.north,
                e = b.east,
                o = overlay.opacity,
            ));
        }

        for marker in &self.markers {
            layers.push_str(&format!(
                "    L.marker([{lat}, {lon}]).addTo(map).bindPopup({popup});\n",
                lat = marker.lat,
                lon = marker.lon,
                popup = popup_string(&marker.popup),
            ));
        }

        for circle in &self.circles {
            layers.push_str(&format!(
                "    L.circleMarker([{lat}, {lon}], {{radius: {radius}, color: {color}, fillColor: {color}, fill: true, fillOpacity: {opacity}}}).addTo(map).bindPopup({popup});\n",
                lat = circle.lat,
                lon = circle.lon,
                radius = circle.radius,
                color = js_string(&circle.color),
                opacity = circle.fill_opacity,
                popup = popup_string(&circle.popup),
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/{version}/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/{version}/leaflet.js" crossorigin="anonymous"></script>
  <style>
    html, body {{ margin: 0; height: 100%; }}
    #map {{ width: 100%; height: 100%; }}
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const map = L.map('map').setView([{lat}, {lon}], {zoom});
    L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
      maxZoom: 22,
      attribution: '&copy; OpenStreetMap contributors'
    }}).addTo(map);
{layers}  </script>
</body>
</html>
"#,
            title = html_escape(&self.title),
            version = LEAFLET_VERSION,
            lat = self.center.0,
            lon = self.center.1,
            zoom = self.zoom,
            layers = layers,
        )
    }

    /// Render and write the document
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render())?;
        tracing::info!(
            path = %path.display(),
            markers = self.markers.len(),
            circles = self.circles.len(),
            overlay = self.overlay.is_some(),
            "wrote interactive map"
        );
        Ok(())
    }
}

/// Quote a value as a JS string literal, escaping everything that needs it
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Popup content is interpreted as HTML by Leaflet, so escape markup
/// before quoting it for JS
fn popup_string(value: &str) -> String {
    js_string(&html_escape(value))
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
