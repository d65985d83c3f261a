//! Map rendering.
//!
//! Draws the map frame, land, graticule and both dot layers to the egui canvas.

use super::{DotHit, DotLayers, LandShape, MapProjection};
use eframe::egui::{self, Color32, FontId, Painter, Pos2, Rect, Stroke};
use glam::DVec2;

/// Dot fill colour.
pub const DOT_COLOR: Color32 = Color32::from_rgb(23, 193, 255);
/// Hovered dot colour.
pub const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(251, 191, 36);

const OCEAN_COLOR: Color32 = Color32::from_rgb(14, 22, 38);
const FRAME_COLOR: Color32 = Color32::from_rgb(71, 85, 105);
const LAND_COLOR: Color32 = Color32::from_rgb(30, 42, 60);
const COAST_COLOR: Color32 = Color32::from_rgb(58, 76, 100);
const GRATICULE_COLOR: Color32 = Color32::from_rgba_premultiplied(40, 52, 70, 120);
const EQUATOR_COLOR: Color32 = Color32::from_rgba_premultiplied(60, 80, 105, 160);
const LABEL_COLOR: Color32 = Color32::from_rgb(120, 140, 165);

/// Graticule spacing in degrees.
const GRATICULE_STEP_DEG: f64 = 30.0;

/// Maps the current view box onto a screen rectangle.
#[derive(Debug, Clone, Copy)]
pub struct ScreenMapping {
    view_origin: DVec2,
    units_per_pixel: DVec2,
    screen_min: DVec2,
    /// Screen pixels per map unit at zoom 1
    base_scale: f64,
}

impl ScreenMapping {
    pub fn new(view_origin: DVec2, view_size: DVec2, full_width: f64, screen: Rect) -> Self {
        let screen_size = DVec2::new(f64::from(screen.width()), f64::from(screen.height()));
        Self {
            view_origin,
            units_per_pixel: view_size / screen_size,
            screen_min: DVec2::new(f64::from(screen.min.x), f64::from(screen.min.y)),
            base_scale: screen_size.x / full_width,
        }
    }

    pub fn to_screen(&self, point: DVec2) -> Pos2 {
        let pos = self.screen_min + (point - self.view_origin) / self.units_per_pixel;
        Pos2::new(pos.x as f32, pos.y as f32)
    }

    /// Screen size of a dot radius given in base map units.
    ///
    /// Dots are drawn at `radius / zoom` map units, so on screen they keep
    /// the same size at every zoom level.
    pub fn dot_radius(&self, radius: f64) -> f32 {
        (radius * self.base_scale) as f32
    }
}

/// Fills the ocean and outlines the map extent.
pub fn render_map_frame(painter: &Painter, mapping: &ScreenMapping, projection: &MapProjection) {
    let size = projection.calibration().size();
    let rect = Rect::from_two_pos(mapping.to_screen(DVec2::ZERO), mapping.to_screen(size));
    painter.rect_filled(rect, 0.0, OCEAN_COLOR);
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, FRAME_COLOR), egui::StrokeKind::Inside);
}

/// Fills the land masses and traces their coastlines.
pub fn render_land(painter: &Painter, mapping: &ScreenMapping, land: &[LandShape]) {
    let clip = painter.clip_rect();
    let stroke = Stroke::new(0.8, COAST_COLOR);

    for shape in land {
        let bounds = Rect::from_two_pos(mapping.to_screen(shape.min), mapping.to_screen(shape.max));
        if !clip.intersects(bounds) {
            continue;
        }

        let mut mesh = egui::Mesh::default();
        for vertex in shape.vertices() {
            mesh.colored_vertex(mapping.to_screen(vertex), LAND_COLOR);
        }
        for corners in shape.triangles.chunks_exact(3) {
            mesh.add_triangle(corners[0], corners[1], corners[2]);
        }
        painter.add(egui::Shape::mesh(mesh));

        for ring in &shape.rings {
            let points: Vec<Pos2> = ring.iter().map(|p| mapping.to_screen(*p)).collect();
            for (i, &p1) in points.iter().enumerate() {
                let p2 = points[(i + 1) % points.len()];
                // Skip sub-pixel segments
                if p1.distance_sq(p2) > 0.5 {
                    painter.line_segment([p1, p2], stroke);
                }
            }
        }
    }
}

/// Draws meridians and parallels every 30° inside the calibrated extent.
pub fn render_graticule(painter: &Painter, mapping: &ScreenMapping, projection: &MapProjection) {
    let cal = projection.calibration();
    let font = FontId::proportional(10.0);

    let mut lng = (cal.min_lng / GRATICULE_STEP_DEG).ceil() * GRATICULE_STEP_DEG;
    while lng <= cal.max_lng {
        let top = mapping.to_screen(projection.project(cal.max_lat, lng));
        let bottom = mapping.to_screen(projection.project(cal.min_lat, lng));
        painter.line_segment([top, bottom], Stroke::new(0.5, GRATICULE_COLOR));
        painter.text(
            bottom + egui::vec2(2.0, -2.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{}°", wrap_longitude(lng)),
            font.clone(),
            LABEL_COLOR,
        );
        lng += GRATICULE_STEP_DEG;
    }

    let mut lat = (cal.min_lat / GRATICULE_STEP_DEG).ceil() * GRATICULE_STEP_DEG;
    while lat <= cal.max_lat {
        let left = mapping.to_screen(projection.project(lat, cal.min_lng));
        let right = mapping.to_screen(projection.project(lat, cal.max_lng));
        let stroke = if lat == 0.0 {
            Stroke::new(1.0, EQUATOR_COLOR)
        } else {
            Stroke::new(0.5, GRATICULE_COLOR)
        };
        painter.line_segment([left, right], stroke);
        painter.text(
            left + egui::vec2(2.0, -2.0),
            egui::Align2::LEFT_BOTTOM,
            format!("{}°", lat),
            font.clone(),
            LABEL_COLOR,
        );
        lat += GRATICULE_STEP_DEG;
    }
}

/// Longitudes past the antimeridian are labelled in [-180, 180].
fn wrap_longitude(lng: f64) -> f64 {
    if lng > 180.0 {
        lng - 360.0
    } else {
        lng
    }
}

fn dot_colors(highlighted: bool, opacity: f32) -> (Color32, Color32) {
    let base = if highlighted { HIGHLIGHT_COLOR } else { DOT_COLOR };
    let fill = base.gamma_multiply(0.85 * opacity);
    let glow = base.gamma_multiply(0.18 * opacity);
    (fill, glow)
}

/// Draws the cluster layer at `opacity`.
pub fn render_clusters(
    painter: &Painter,
    mapping: &ScreenMapping,
    layers: &DotLayers,
    opacity: f32,
    hovered: Option<DotHit>,
) {
    if opacity <= 0.0 {
        return;
    }
    let clip = painter.clip_rect();

    for (i, (cluster, pos)) in layers.clusters.iter().zip(&layers.cluster_positions).enumerate() {
        let center = mapping.to_screen(*pos);
        let glow_radius = mapping.dot_radius(cluster.glow_radius());
        if !clip.expand(glow_radius).contains(center) {
            continue;
        }

        let highlighted = hovered == Some(DotHit::Cluster(i));
        let (fill, glow) = dot_colors(highlighted, opacity);
        painter.circle_filled(center, glow_radius, glow);
        painter.circle(
            center,
            mapping.dot_radius(cluster.radius()),
            fill,
            Stroke::new(1.0, Color32::WHITE.gamma_multiply(0.35 * opacity)),
        );

        if cluster.member_count > 1 {
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                cluster.member_count.to_string(),
                FontId::proportional(10.0),
                Color32::from_rgb(10, 20, 35).gamma_multiply(opacity),
            );
        }
    }
}

/// Draws the individual layer at `opacity`.
pub fn render_individuals(
    painter: &Painter,
    mapping: &ScreenMapping,
    layers: &DotLayers,
    opacity: f32,
    hovered: Option<DotHit>,
) {
    if opacity <= 0.0 {
        return;
    }
    let clip = painter.clip_rect();

    for (i, individual) in layers.individuals.iter().enumerate() {
        let center = mapping.to_screen(individual.position);
        let glow_radius = mapping.dot_radius(individual.glow_radius());
        if !clip.expand(glow_radius).contains(center) {
            continue;
        }

        let highlighted = hovered == Some(DotHit::Individual(i));
        let (fill, glow) = dot_colors(highlighted, opacity);
        painter.circle_filled(center, glow_radius, glow);
        painter.circle_filled(center, mapping.dot_radius(individual.radius), fill);
    }
}
