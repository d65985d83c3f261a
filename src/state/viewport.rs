//! Pannable/zoomable view over the map's fixed coordinate space.
//!
//! The visible window is a view box (`origin`, `size`) in map units, drawn
//! stretched over a screen rectangle. Zoom is the ratio of the original
//! view box width to the current one. Every zoom step that would leave
//! `[min_zoom, max_zoom]` is rejected outright rather than clamped.

use super::gesture::GestureEvent;
use super::settings::MapSettings;
use glam::DVec2;

/// Screen rectangle the view box is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: DVec2,
    pub size: DVec2,
}

impl ScreenRect {
    pub fn new(min: DVec2, size: DVec2) -> Self {
        Self { min, size }
    }

    /// A collapsed rectangle cannot map pixels to map units.
    pub fn is_degenerate(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }
}

/// The visible window in map units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Top-left corner
    pub origin: DVec2,
    /// Width and height
    pub size: DVec2,
}

impl ViewportState {
    pub fn new(origin: DVec2, size: DVec2) -> Self {
        Self { origin, size }
    }

    /// Converts a screen position to map units.
    pub fn screen_to_map(&self, pos: DVec2, screen: &ScreenRect) -> DVec2 {
        self.origin + (pos - screen.min) / screen.size * self.size
    }

    /// Converts a map point to a screen position.
    #[allow(dead_code)]
    pub fn map_to_screen(&self, point: DVec2, screen: &ScreenRect) -> DVec2 {
        screen.min + (point - self.origin) / self.size * screen.size
    }

    /// Scales the view box by `factor` while keeping `anchor` (map units)
    /// at the same relative position inside it.
    pub fn scaled_about(&self, anchor: DVec2, factor: f64) -> Self {
        Self {
            origin: anchor - (anchor - self.origin) * factor,
            size: self.size * factor,
        }
    }

    pub fn center(&self) -> DVec2 {
        self.origin + self.size * 0.5
    }
}

/// Current gesture being tracked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionMode {
    Idle,
    Panning {
        start_pointer: DVec2,
        start_origin: DVec2,
    },
    Pinching {
        start_distance: f64,
        start_midpoint: DVec2,
        start_view: ViewportState,
    },
}

/// Mouse wheel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelZoom {
    In,
    Out,
}

/// Owns the view box and turns gestures into view box updates.
#[derive(Debug, Clone)]
pub struct ViewportController {
    original: ViewportState,
    view: ViewportState,
    mode: InteractionMode,
    min_zoom: f64,
    max_zoom: f64,
    wheel_zoom_in_factor: f64,
    wheel_zoom_out_factor: f64,
}

impl ViewportController {
    /// Creates a controller showing the whole map.
    pub fn new(settings: &MapSettings) -> Self {
        let original = ViewportState::new(DVec2::ZERO, settings.calibration.size());
        Self {
            original,
            view: original,
            mode: InteractionMode::Idle,
            min_zoom: settings.min_zoom,
            max_zoom: settings.max_zoom,
            wheel_zoom_in_factor: settings.wheel_zoom_in_factor,
            wheel_zoom_out_factor: settings.wheel_zoom_out_factor,
        }
    }

    pub fn view(&self) -> &ViewportState {
        &self.view
    }

    pub fn original(&self) -> &ViewportState {
        &self.original
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn is_interacting(&self) -> bool {
        self.mode != InteractionMode::Idle
    }

    /// Whether the view is the full-map view, both in zoom and position.
    pub fn is_at_original(&self) -> bool {
        self.view == self.original
    }

    /// Zoom relative to the full map (1.0 = whole map visible).
    pub fn current_zoom(&self) -> f64 {
        self.original.size.x / self.view.size.x
    }

    fn zoom_for_width(&self, width: f64) -> f64 {
        self.original.size.x / width
    }

    /// Replaces the view if its zoom is within bounds.
    fn try_set_view(&mut self, candidate: ViewportState) -> bool {
        let zoom = self.zoom_for_width(candidate.size.x);
        if !zoom.is_finite() || zoom < self.min_zoom || zoom > self.max_zoom {
            return false;
        }
        self.view = candidate;
        true
    }

    /// Applies one recognised gesture step.
    pub fn handle(&mut self, event: GestureEvent, screen: &ScreenRect) {
        match event {
            GestureEvent::PanStart { pos } => self.on_pointer_down(pos),
            GestureEvent::PanMove { pos } => self.on_pointer_move(pos, screen),
            GestureEvent::PanEnd => self.on_pointer_up(),
            GestureEvent::PinchStart { distance, midpoint } => {
                self.mode = InteractionMode::Pinching {
                    start_distance: distance,
                    start_midpoint: midpoint,
                    start_view: self.view,
                };
            }
            GestureEvent::PinchMove { distance, midpoint } => {
                self.pinch_to(distance, midpoint, screen);
            }
            GestureEvent::PinchEnd { remaining } => self.begin_pan(remaining),
        }
    }

    fn begin_pan(&mut self, pos: DVec2) {
        self.mode = InteractionMode::Panning {
            start_pointer: pos,
            start_origin: self.view.origin,
        };
    }

    fn pan_to(&mut self, pos: DVec2, screen: &ScreenRect) {
        let InteractionMode::Panning {
            start_pointer,
            start_origin,
        } = self.mode
        else {
            return;
        };
        if screen.is_degenerate() {
            return;
        }
        let units_per_pixel = self.view.size / screen.size;
        self.view.origin = start_origin - (pos - start_pointer) * units_per_pixel;
    }

    fn pinch_to(&mut self, distance: f64, midpoint: DVec2, screen: &ScreenRect) {
        let InteractionMode::Pinching {
            start_distance,
            start_midpoint,
            start_view,
        } = self.mode
        else {
            return;
        };
        if start_distance <= 0.0 || distance <= 0.0 || screen.is_degenerate() {
            return;
        }

        let factor = start_distance / distance;
        let size = start_view.size * factor;
        // Map point that was under the fingers when the pinch began
        let anchor = start_view.screen_to_map(start_midpoint, screen);
        let origin = anchor - (midpoint - screen.min) / screen.size * size;
        self.try_set_view(ViewportState::new(origin, size));
    }

    /// Mouse button pressed at a screen position.
    pub fn on_pointer_down(&mut self, pos: DVec2) {
        self.begin_pan(pos);
    }

    pub fn on_pointer_move(&mut self, pos: DVec2, screen: &ScreenRect) {
        self.pan_to(pos, screen);
    }

    pub fn on_pointer_up(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    /// Touch contacts changed to `touches` after new fingers went down.
    #[allow(dead_code)]
    pub fn on_touch_start(&mut self, touches: &[DVec2]) {
        match touches {
            [] => self.mode = InteractionMode::Idle,
            [pos] => self.begin_pan(*pos),
            [a, b, ..] => {
                self.mode = InteractionMode::Pinching {
                    start_distance: a.distance(*b),
                    start_midpoint: (*a + *b) * 0.5,
                    start_view: self.view,
                };
            }
        }
    }

    #[allow(dead_code)]
    pub fn on_touch_move(&mut self, touches: &[DVec2], screen: &ScreenRect) {
        match touches {
            [] => {}
            [pos] => self.pan_to(*pos, screen),
            [a, b, ..] => self.pinch_to(a.distance(*b), (*a + *b) * 0.5, screen),
        }
    }

    /// Touch contacts changed to `remaining` after fingers lifted.
    #[allow(dead_code)]
    pub fn on_touch_end(&mut self, remaining: &[DVec2]) {
        match remaining {
            [] => self.mode = InteractionMode::Idle,
            [pos] => self.begin_pan(*pos),
            _ => self.on_touch_start(remaining),
        }
    }

    /// One wheel tick anchored at the cursor. Returns whether the view changed.
    pub fn on_wheel(&mut self, direction: WheelZoom, cursor: DVec2, screen: &ScreenRect) -> bool {
        if screen.is_degenerate() {
            return false;
        }
        let factor = match direction {
            WheelZoom::In => self.wheel_zoom_in_factor,
            WheelZoom::Out => self.wheel_zoom_out_factor,
        };
        let anchor = self.view.screen_to_map(cursor, screen);
        let candidate = self.view.scaled_about(anchor, factor);
        let changed = self.try_set_view(candidate);

        // A mouse pan in progress continues from the cursor at the new scale
        if changed && matches!(self.mode, InteractionMode::Panning { .. }) {
            self.begin_pan(cursor);
        }
        changed
    }

    /// Restores the full-map view from any state.
    pub fn on_double_click(&mut self) {
        self.view = self.original;
        self.mode = InteractionMode::Idle;
        log::debug!("View reset to full map");
    }

    /// Centres the view on a map point at `zoom`, clamped to the zoom bounds.
    pub fn focus(&mut self, center: DVec2, zoom: f64) {
        let zoom = if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            1.0_f64.clamp(self.min_zoom, self.max_zoom)
        };
        let size = self.original.size / zoom;
        self.view = ViewportState::new(center - size * 0.5, size);
        self.mode = InteractionMode::Idle;
    }
}
