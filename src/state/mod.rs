//! Application state management.
//!
//! Map settings, the viewport and its gesture input, and the dot layers
//! derived from the loaded contributors.

mod dot_mode;
pub mod gesture;
mod settings;
pub mod url_state;
mod viewport;

pub use dot_mode::DotLayerSelector;
pub use gesture::{GestureEvent, GestureRecognizer, PointerInput};
pub use settings::MapSettings;
pub use viewport::{InteractionMode, ScreenRect, ViewportController, WheelZoom};

use crate::data::{country_stats, ContributorLocation, CountryStat};
use crate::geo::{load_embedded_land, DotHit, DotLayers, LandShape, MapProjection};
use geo_types::Coord;

/// Root application state containing all sub-states.
pub struct AppState {
    /// Map behaviour and calibration
    pub settings: MapSettings,

    /// Geographic ↔ map-unit conversion for the calibrated illustration
    pub projection: MapProjection,

    /// Land masses in map units, drawn under the dots
    pub land: Vec<LandShape>,

    /// Contributors, sorted by score
    pub contributors: Vec<ContributorLocation>,

    /// Contributors per country, most first
    pub country_stats: Vec<CountryStat>,

    /// Cluster and individual dots in map units
    pub layers: DotLayers,

    /// Pan/zoom state
    pub viewport: ViewportController,

    /// Turns pointer and touch input into pan/pinch gestures
    pub gestures: GestureRecognizer,

    /// Which dot layer is in front, with its cross-fade
    pub dot_layer: DotLayerSelector,

    /// Dot under the pointer
    pub hovered: Option<DotHit>,

    /// Geographic position under the pointer
    pub cursor_geo: Option<Coord<f64>>,

    /// Application status message displayed in top bar
    pub status_message: String,

    /// Draw latitude/longitude lines
    pub show_graticule: bool,
}

impl AppState {
    pub fn new(settings: MapSettings, contributors: Vec<ContributorLocation>) -> Self {
        let projection = MapProjection::new(settings.calibration);
        let land = load_embedded_land(&projection);
        let layers = DotLayers::build(&contributors, &projection, settings.cluster_grid_deg);
        let country_stats = country_stats(&contributors);

        let status_message = if contributors.is_empty() {
            "No contributor data".to_string()
        } else {
            "Ready".to_string()
        };

        Self {
            viewport: ViewportController::new(&settings),
            dot_layer: DotLayerSelector::new(&settings),
            gestures: GestureRecognizer::new(),
            settings,
            projection,
            land,
            contributors,
            country_stats,
            layers,
            hovered: None,
            cursor_geo: None,
            status_message,
            show_graticule: true,
        }
    }

    /// Contributors that have coordinates and appear on the map.
    pub fn geocoded_count(&self) -> usize {
        self.contributors.iter().filter(|c| c.is_geocoded()).count()
    }

    /// Centre the view on a geographic point at the given zoom.
    pub fn focus_on(&mut self, lat: f64, lng: f64, zoom: f64) {
        let center = self.projection.project(lat, lng);
        self.viewport.focus(center, zoom);
    }

    /// Geographic centre of the current view.
    pub fn view_center(&self) -> Coord<f64> {
        self.projection.map_to_geo(self.viewport.view().center())
    }
}
