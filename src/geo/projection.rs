//! Map projection and coordinate transformation.
//!
//! Converts geographic coordinates (lat/lng) into the fixed coordinate space
//! of the world map illustration. The illustration is a Web-Mercator style
//! map, so longitude maps linearly to X and latitude goes through the
//! Mercator Y transform before being normalised against the drawn extent.

use geo_types::Coord;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Bounding box and pixel size of the map illustration.
///
/// The geographic bounds are the longitudes/latitudes at the illustration's
/// edges; they are not the full globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCalibration {
    pub min_lng: f64,
    pub max_lng: f64,
    pub max_lat: f64,
    pub min_lat: f64,
    /// Width of the map in map units
    pub width: f64,
    /// Height of the map in map units
    pub height: f64,
}

impl Default for MapCalibration {
    fn default() -> Self {
        Self {
            min_lng: -169.110266,
            max_lng: 190.486279,
            max_lat: 83.600842,
            min_lat: -58.508473,
            width: 1009.6727,
            height: 665.96301,
        }
    }
}

impl MapCalibration {
    /// Size of the map in map units.
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }
}

/// Mercator Y for a latitude in degrees: `ln(tan(π/4 + lat/2))`.
pub fn lat_to_mercator_y(lat: f64) -> f64 {
    let lat_rad = lat * PI / 180.0;
    (PI / 4.0 + lat_rad / 2.0).tan().ln()
}

/// Inverse of [`lat_to_mercator_y`], returning degrees.
pub fn mercator_y_to_lat(y: f64) -> f64 {
    (2.0 * y.exp().atan() - PI / 2.0) * 180.0 / PI
}

/// Projection from lat/lng to map units for one calibration.
#[derive(Debug, Clone, Copy)]
pub struct MapProjection {
    calibration: MapCalibration,
    /// Mercator Y of the top edge
    mercator_max_y: f64,
    /// Mercator Y range between the top and bottom edges
    mercator_range: f64,
}

impl Default for MapProjection {
    fn default() -> Self {
        Self::new(MapCalibration::default())
    }
}

impl MapProjection {
    pub fn new(calibration: MapCalibration) -> Self {
        let mercator_max_y = lat_to_mercator_y(calibration.max_lat);
        let mercator_min_y = lat_to_mercator_y(calibration.min_lat);
        Self {
            calibration,
            mercator_max_y,
            mercator_range: mercator_max_y - mercator_min_y,
        }
    }

    pub fn calibration(&self) -> &MapCalibration {
        &self.calibration
    }

    /// Projects a latitude/longitude (degrees) to map units.
    ///
    /// North is up (smaller Y). Latitudes outside the calibrated extent
    /// land outside the map rectangle; callers clip them.
    pub fn project(&self, lat: f64, lng: f64) -> DVec2 {
        let cal = &self.calibration;
        let x = (lng - cal.min_lng) / (cal.max_lng - cal.min_lng) * cal.width;
        let y = (self.mercator_max_y - lat_to_mercator_y(lat)) / self.mercator_range * cal.height;
        DVec2::new(x, y)
    }

    /// Projects a `geo_types` coordinate (x = longitude, y = latitude).
    pub fn geo_to_map(&self, coord: Coord<f64>) -> DVec2 {
        self.project(coord.y, coord.x)
    }

    /// Converts a point in map units back to geographic coordinates.
    pub fn map_to_geo(&self, point: DVec2) -> Coord<f64> {
        let cal = &self.calibration;
        let lng = point.x / cal.width * (cal.max_lng - cal.min_lng) + cal.min_lng;
        let mercator_y = self.mercator_max_y - point.y / cal.height * self.mercator_range;
        Coord {
            x: lng,
            y: mercator_y_to_lat(mercator_y),
        }
    }

    /// Checks if a map point lies on the drawn map.
    pub fn contains(&self, point: DVec2) -> bool {
        let size = self.calibration.size();
        point.x >= 0.0 && point.y >= 0.0 && point.x <= size.x && point.y <= size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn approx(a: DVec2, b: DVec2) -> bool {
        a.abs_diff_eq(b, EPS)
    }

    #[test]
    fn test_corners_map_to_rectangle() {
        let projection = MapProjection::default();
        let cal = *projection.calibration();

        assert!(approx(
            projection.project(cal.max_lat, cal.min_lng),
            DVec2::ZERO
        ));
        assert!(approx(
            projection.project(cal.min_lat, cal.max_lng),
            DVec2::new(cal.width, cal.height)
        ));
        assert!(approx(
            projection.project(cal.max_lat, cal.max_lng),
            DVec2::new(cal.width, 0.0)
        ));
        assert!(approx(
            projection.project(cal.min_lat, cal.min_lng),
            DVec2::new(0.0, cal.height)
        ));
    }

    #[test]
    fn test_north_is_up() {
        let projection = MapProjection::default();
        let mut previous = projection.project(-58.0, 10.0).y;
        let mut lat = -57.0;
        while lat <= 83.0 {
            let y = projection.project(lat, 10.0).y;
            assert!(y < previous, "y did not decrease at lat {}", lat);
            previous = y;
            lat += 1.0;
        }
    }

    #[test]
    fn test_longitude_is_linear() {
        let projection = MapProjection::default();
        let a = projection.project(0.0, 0.0).x;
        let b = projection.project(0.0, 10.0).x;
        let c = projection.project(0.0, 20.0).x;
        assert!(((b - a) - (c - b)).abs() < EPS);
        // Latitude does not affect X
        assert!((projection.project(60.0, 10.0).x - b).abs() < EPS);
    }

    #[test]
    fn test_out_of_extent_latitude_is_off_canvas() {
        let projection = MapProjection::default();
        let point = projection.project(-80.0, 0.0);
        assert!(point.y > projection.calibration().height);
        assert!(!projection.contains(point));
    }

    #[test]
    fn test_map_to_geo_inverts_projection() {
        let projection = MapProjection::default();
        for (lat, lng) in [(52.52, 13.405), (-33.8688, 151.2093), (0.0, -120.0)] {
            let geo = projection.map_to_geo(projection.project(lat, lng));
            assert!((geo.y - lat).abs() < EPS);
            assert!((geo.x - lng).abs() < EPS);
        }
    }

    #[test]
    fn test_geo_to_map_uses_lon_lat_order() {
        let projection = MapProjection::default();
        let coord = Coord { x: 2.35, y: 48.85 };
        assert!(approx(
            projection.geo_to_map(coord),
            projection.project(48.85, 2.35)
        ));
    }
}
