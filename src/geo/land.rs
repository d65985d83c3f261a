//! Land masses drawn beneath the contributor dots.
//!
//! A coarse world outline ships as embedded GeoJSON. Its polygons are
//! projected into map units and triangulated once at startup, so a frame
//! only has to map vertices to the screen.

use super::MapProjection;
use anyhow::Context;
use geo_types::Coord;
use geojson::{Feature, GeoJson, Geometry, Value};
use glam::DVec2;

/// Simplified world land outline (continents and large islands).
pub const EMBEDDED_LAND: &str = include_str!("../../assets/world-land.geojson");

/// A land polygon in geographic coordinates (x = lng, y = lat).
#[derive(Debug, Clone)]
pub struct LandPolygon {
    pub exterior: Vec<Coord<f64>>,
    pub holes: Vec<Vec<Coord<f64>>>,
    pub label: Option<String>,
}

/// Land polygons read from GeoJSON.
#[derive(Debug, Clone, Default)]
pub struct LandLayer {
    pub polygons: Vec<LandPolygon>,
}

impl LandLayer {
    /// Reads every Polygon and MultiPolygon in a GeoJSON document. Other
    /// geometry types are skipped.
    pub fn from_geojson(geojson_str: &str) -> anyhow::Result<Self> {
        let geojson: GeoJson = geojson_str
            .parse()
            .context("failed to parse land GeoJSON")?;

        let mut layer = Self::default();
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                for feature in &fc.features {
                    layer.add_feature(feature);
                }
            }
            GeoJson::Feature(feature) => layer.add_feature(&feature),
            GeoJson::Geometry(geometry) => layer.add_geometry(&geometry, None),
        }
        Ok(layer)
    }

    fn add_feature(&mut self, feature: &Feature) {
        let label = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name").or_else(|| p.get("NAME")))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        if let Some(geometry) = &feature.geometry {
            self.add_geometry(geometry, label);
        }
    }

    fn add_geometry(&mut self, geometry: &Geometry, label: Option<String>) {
        match &geometry.value {
            Value::Polygon(rings) => self.add_polygon(rings, label),
            Value::MultiPolygon(polygons) => {
                for rings in polygons {
                    self.add_polygon(rings, label.clone());
                }
            }
            Value::GeometryCollection(geometries) => {
                for geometry in geometries {
                    self.add_geometry(geometry, label.clone());
                }
            }
            _ => {}
        }
    }

    fn add_polygon(&mut self, rings: &[Vec<Vec<f64>>], label: Option<String>) {
        let mut rings = rings.iter().map(|ring| to_ring(ring));
        let Some(exterior) = rings.next().filter(|ring| ring.len() >= 3) else {
            return;
        };
        self.polygons.push(LandPolygon {
            exterior,
            holes: rings.filter(|ring| ring.len() >= 3).collect(),
            label,
        });
    }

    /// Projects and triangulates every polygon.
    pub fn project(&self, projection: &MapProjection) -> Vec<LandShape> {
        self.polygons
            .iter()
            .map(|polygon| LandShape::new(polygon, projection))
            .collect()
    }
}

/// GeoJSON positions as coordinates, without the repeated closing point.
fn to_ring(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    let mut ring: Vec<Coord<f64>> = positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// A land polygon in map units, ready to fill.
#[derive(Debug, Clone)]
pub struct LandShape {
    /// Exterior ring followed by any holes
    pub rings: Vec<Vec<DVec2>>,
    /// Triangle corners, indexing the rings' points in order
    pub triangles: Vec<u32>,
    pub min: DVec2,
    pub max: DVec2,
}

impl LandShape {
    fn new(polygon: &LandPolygon, projection: &MapProjection) -> Self {
        let rings: Vec<Vec<DVec2>> = std::iter::once(&polygon.exterior)
            .chain(&polygon.holes)
            .map(|ring| ring.iter().map(|c| projection.geo_to_map(*c)).collect())
            .collect();

        let mut flat = Vec::new();
        let mut hole_indices = Vec::new();
        for (i, ring) in rings.iter().enumerate() {
            if i > 0 {
                hole_indices.push(flat.len() / 2);
            }
            flat.extend(ring.iter().flat_map(|p| [p.x, p.y]));
        }

        let triangles = match earcutr::earcut(&flat, &hole_indices, 2) {
            Ok(indices) => indices.into_iter().map(|i| i as u32).collect(),
            Err(_) => {
                log::warn!(
                    "Could not triangulate land polygon {}; drawing its outline only",
                    polygon.label.as_deref().unwrap_or("(unnamed)")
                );
                Vec::new()
            }
        };

        let (min, max) = rings.iter().flatten().fold(
            (DVec2::splat(f64::MAX), DVec2::splat(f64::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );

        Self {
            rings,
            triangles,
            min,
            max,
        }
    }

    /// All ring points in the order the triangle indices refer to.
    pub fn vertices(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.rings.iter().flatten().copied()
    }
}

/// Projects the embedded land outline. A broken outline is logged and
/// leaves the map without land rather than failing startup.
pub fn load_embedded_land(projection: &MapProjection) -> Vec<LandShape> {
    match LandLayer::from_geojson(EMBEDDED_LAND) {
        Ok(layer) => {
            let shapes = layer.project(projection);
            log::debug!("Loaded {} land polygons", shapes.len());
            shapes
        }
        Err(e) => {
            log::warn!("{:#}; drawing the map without land", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoelace(ring: &[DVec2]) -> f64 {
        let n = ring.len();
        let twice: f64 = (0..n)
            .map(|i| ring[i].perp_dot(ring[(i + 1) % n]))
            .sum();
        twice.abs() * 0.5
    }

    fn triangle_area(shape: &LandShape) -> f64 {
        let vertices: Vec<DVec2> = shape.vertices().collect();
        shape
            .triangles
            .chunks_exact(3)
            .map(|t| {
                let (a, b, c) = (
                    vertices[t[0] as usize],
                    vertices[t[1] as usize],
                    vertices[t[2] as usize],
                );
                (b - a).perp_dot(c - a).abs() * 0.5
            })
            .sum()
    }

    #[test]
    fn test_embedded_land_parses() {
        let layer = LandLayer::from_geojson(EMBEDDED_LAND).unwrap();
        assert!(layer.polygons.len() > 20);

        let eurasia = layer
            .polygons
            .iter()
            .find(|p| p.label.as_deref() == Some("Eurasia"))
            .unwrap();
        // Black Sea and Caspian
        assert_eq!(eurasia.holes.len(), 2);
        assert_ne!(eurasia.exterior.first(), eurasia.exterior.last());
    }

    #[test]
    fn test_land_lies_inside_the_map() {
        let projection = MapProjection::default();
        let land = load_embedded_land(&projection);
        assert!(!land.is_empty());
        for shape in &land {
            assert!(shape.vertices().all(|p| projection.contains(p)));
            assert!(shape.min.cmple(shape.max).all());
        }
    }

    #[test]
    fn test_triangulation_covers_each_polygon() {
        let projection = MapProjection::default();
        for shape in load_embedded_land(&projection) {
            let vertex_count = shape.vertices().count() as u32;
            assert!(!shape.triangles.is_empty());
            assert_eq!(shape.triangles.len() % 3, 0);
            assert!(shape.triangles.iter().all(|&i| i < vertex_count));

            let expected = shoelace(&shape.rings[0])
                - shape.rings[1..].iter().map(|h| shoelace(h)).sum::<f64>();
            let filled = triangle_area(&shape);
            assert!(
                (filled - expected).abs() <= expected * 1e-6,
                "filled {} of {}",
                filled,
                expected
            );
        }
    }

    #[test]
    fn test_non_polygon_features_are_skipped() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "name": "Cape" },
                  "geometry": { "type": "Point", "coordinates": [18.4, -34.0] } },
                { "type": "Feature", "properties": {},
                  "geometry": { "type": "MultiPolygon", "coordinates": [
                      [[[0, 0], [10, 0], [10, 10], [0, 0]]],
                      [[[20, 0], [30, 0], [30, 10], [20, 0]]]
                  ] } },
                { "type": "Feature", "properties": null, "geometry": null }
            ]
        }"#;
        let layer = LandLayer::from_geojson(json).unwrap();
        assert_eq!(layer.polygons.len(), 2);
        assert_eq!(layer.polygons[0].exterior.len(), 3);
        assert!(layer.polygons[0].label.is_none());
    }

    #[test]
    fn test_malformed_geojson_is_an_error() {
        assert!(LandLayer::from_geojson("{ \"type\": \"Nope\" }").is_err());
        assert!(LandLayer::from_geojson("not json").is_err());
    }
}
