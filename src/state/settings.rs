//! Map settings: calibration, zoom limits and layer switching.
//!
//! Native builds read an optional JSON file named by `COMMUNITY_MAP_SETTINGS`;
//! web builds read them from localStorage.

use crate::geo::{MapCalibration, DEFAULT_GRID_DEG};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// Tunable map behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Bounds and size of the map illustration
    pub calibration: MapCalibration,
    /// Smallest allowed zoom (view box twice the map width at 0.5)
    pub min_zoom: f64,
    /// Largest allowed zoom
    pub max_zoom: f64,
    /// Individual dots replace clusters above this zoom
    pub cluster_zoom_threshold: f64,
    /// Clusters return at or below this zoom. Equal to the threshold by
    /// default, which gives a hard switch without hysteresis.
    pub cluster_exit_threshold: f64,
    /// Cluster grid size in degrees
    pub cluster_grid_deg: f64,
    /// View box scale per wheel tick towards the user (zoom out)
    pub wheel_zoom_out_factor: f64,
    /// View box scale per wheel tick away from the user (zoom in)
    pub wheel_zoom_in_factor: f64,
    /// Cross-fade between dot layers, in milliseconds
    pub fade_duration_ms: u64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            calibration: MapCalibration::default(),
            min_zoom: 0.5,
            max_zoom: 10.0,
            cluster_zoom_threshold: 2.5,
            cluster_exit_threshold: 2.5,
            cluster_grid_deg: DEFAULT_GRID_DEG,
            wheel_zoom_out_factor: 1.12,
            wheel_zoom_in_factor: 0.88,
            fade_duration_ms: 200,
        }
    }
}

impl MapSettings {
    /// localStorage key holding settings JSON.
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "community_map_settings";

    /// Environment variable naming a settings file.
    #[cfg(not(target_arch = "wasm32"))]
    pub const PATH_ENV: &'static str = "COMMUNITY_MAP_SETTINGS";

    /// Parses and validates settings from JSON. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(json).context("failed to parse map settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that the settings describe a usable map.
    pub fn validate(&self) -> anyhow::Result<()> {
        let cal = &self.calibration;
        ensure!(
            cal.width > 0.0 && cal.height > 0.0,
            "map size must be positive, got {}x{}",
            cal.width,
            cal.height
        );
        ensure!(
            cal.max_lng > cal.min_lng,
            "longitude range is empty ({}..{})",
            cal.min_lng,
            cal.max_lng
        );
        ensure!(
            cal.max_lat > cal.min_lat && cal.max_lat < 90.0 && cal.min_lat > -90.0,
            "latitude range must lie strictly inside (-90, 90), got {}..{}",
            cal.min_lat,
            cal.max_lat
        );
        ensure!(
            self.min_zoom > 0.0 && self.min_zoom < self.max_zoom,
            "zoom bounds must satisfy 0 < min < max, got {}..{}",
            self.min_zoom,
            self.max_zoom
        );
        ensure!(
            self.min_zoom <= 1.0 && 1.0 <= self.max_zoom,
            "zoom bounds {}..{} must include the full map view at 1",
            self.min_zoom,
            self.max_zoom
        );
        ensure!(
            self.cluster_exit_threshold > self.min_zoom,
            "cluster exit threshold {} must lie above the minimum zoom {}",
            self.cluster_exit_threshold,
            self.min_zoom
        );
        ensure!(
            self.cluster_exit_threshold <= self.cluster_zoom_threshold,
            "cluster exit threshold {} is above the switch threshold {}",
            self.cluster_exit_threshold,
            self.cluster_zoom_threshold
        );
        ensure!(
            self.cluster_zoom_threshold > self.min_zoom
                && self.cluster_zoom_threshold < self.max_zoom,
            "cluster threshold {} lies outside the zoom bounds {}..{}",
            self.cluster_zoom_threshold,
            self.min_zoom,
            self.max_zoom
        );
        ensure!(
            self.cluster_grid_deg > 0.0,
            "cluster grid must be positive, got {}",
            self.cluster_grid_deg
        );
        ensure!(
            self.wheel_zoom_out_factor > 1.0
                && self.wheel_zoom_in_factor > 0.0
                && self.wheel_zoom_in_factor < 1.0,
            "wheel factors must zoom in the right direction, got in={} out={}",
            self.wheel_zoom_in_factor,
            self.wheel_zoom_out_factor
        );
        Ok(())
    }

    /// Load settings from the file named by [`Self::PATH_ENV`], if any.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::PATH_ENV) else {
            return Self::default();
        };

        let result = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path))
            .and_then(|json| Self::from_json(&json));

        match result {
            Ok(settings) => {
                log::info!("Loaded map settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("{:#}; using default map settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from localStorage.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return Self::default(),
        };

        let storage = match window.local_storage() {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        let json = match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(s)) => s,
            _ => return Self::default(),
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded map settings from localStorage");
                settings
            }
            Err(e) => {
                log::warn!("{:#}; using default map settings", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = MapSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.cluster_zoom_threshold, 2.5);
        assert_eq!(settings.cluster_exit_threshold, settings.cluster_zoom_threshold);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "max_zoom": 6.0, "cluster_exit_threshold": 2.2 }"#;
        let settings = MapSettings::from_json(json).unwrap();
        assert_eq!(settings.max_zoom, 6.0);
        assert_eq!(settings.cluster_exit_threshold, 2.2);
        assert_eq!(settings.min_zoom, 0.5);
        assert_eq!(settings.calibration, MapCalibration::default());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(MapSettings::from_json(r#"{ "min_zoom": 4.0, "max_zoom": 2.0 }"#).is_err());
        assert!(MapSettings::from_json(r#"{ "cluster_exit_threshold": 3.0 }"#).is_err());
        assert!(MapSettings::from_json(r#"{ "wheel_zoom_in_factor": 1.2 }"#).is_err());
        assert!(MapSettings::from_json(
            r#"{ "cluster_zoom_threshold": 12.0, "cluster_exit_threshold": 12.0 }"#
        )
        .is_err());
        assert!(MapSettings::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_zoom_bounds_must_include_full_view() {
        // The initial view is zoom 1, so a minimum above it is unusable
        assert!(MapSettings::from_json(r#"{ "min_zoom": 2.0 }"#).is_err());
        assert!(MapSettings::from_json(
            r#"{ "max_zoom": 0.8, "cluster_zoom_threshold": 0.7, "cluster_exit_threshold": 0.7 }"#
        )
        .is_err());
        assert!(MapSettings::from_json(r#"{ "min_zoom": 1.0 }"#).is_ok());
    }

    #[test]
    fn test_exit_threshold_must_be_reachable() {
        // Below the minimum zoom, clusters could never come back
        assert!(MapSettings::from_json(r#"{ "cluster_exit_threshold": 0.3 }"#).is_err());
        assert!(MapSettings::from_json(r#"{ "cluster_exit_threshold": 0.5 }"#).is_err());
        assert!(MapSettings::from_json(r#"{ "cluster_exit_threshold": 0.6 }"#).is_ok());
    }

    #[test]
    fn test_serialize_round_trip_preserves_values() {
        let mut settings = MapSettings::default();
        settings.fade_duration_ms = 0;
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(MapSettings::from_json(&json).unwrap(), settings);
    }
}
