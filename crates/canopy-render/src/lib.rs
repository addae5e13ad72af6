//! canopy-render - Interactive maps and static plots
//!
//! The interactive side emits a self-contained Leaflet HTML document, the
//! static side draws the same scene to PNG with plotters.

pub mod map;
pub mod plot;

pub use map::MapBuilder;
pub use plot::{render_survey_plot, PlotOptions};
