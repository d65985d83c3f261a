//! Central canvas UI: the interactive contributor map.

use crate::geo::{self, DotLayer, ScreenMapping};
use crate::state::{AppState, GestureEvent, InteractionMode, PointerInput, ScreenRect, WheelZoom};
use eframe::egui::{self, Color32, CursorIcon, Pos2, Rect, RichText, Sense, Vec2};
use glam::DVec2;
use web_time::Instant;

const BACKGROUND_COLOR: Color32 = Color32::from_rgb(8, 12, 22);
const OVERLAY_TEXT_COLOR: Color32 = Color32::from_rgb(168, 216, 234);

/// Render the map canvas.
pub fn render_canvas(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(BACKGROUND_COLOR))
        .show(ctx, |ui| {
            let available_size = ui.available_size();
            let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());

            let map_rect = letterbox(response.rect, state.projection.calibration().size());
            let screen = to_screen_rect(map_rect);

            handle_canvas_interaction(ctx, &response, map_rect, &screen, state);

            let now = Instant::now();
            state.dot_layer.update(state.viewport.current_zoom(), now);

            let view = *state.viewport.view();
            let mapping = ScreenMapping::new(
                view.origin,
                view.size,
                state.viewport.original().size.x,
                map_rect,
            );
            let map_painter = painter.with_clip_rect(map_rect);

            geo::render_map_frame(&map_painter, &mapping, &state.projection);
            geo::render_land(&map_painter, &mapping, &state.land);
            if state.show_graticule {
                geo::render_graticule(&map_painter, &mapping, &state.projection);
            }

            // The outgoing layer is drawn first so the incoming one sits on top
            let cluster_opacity = state.dot_layer.cluster_opacity(now);
            let individual_opacity = state.dot_layer.individual_opacity(now);
            let draw_clusters = |p: &egui::Painter| {
                geo::render_clusters(p, &mapping, &state.layers, cluster_opacity, state.hovered)
            };
            let draw_individuals = |p: &egui::Painter| {
                geo::render_individuals(
                    p,
                    &mapping,
                    &state.layers,
                    individual_opacity,
                    state.hovered,
                )
            };
            match state.dot_layer.active() {
                DotLayer::Clusters => {
                    draw_individuals(&map_painter);
                    draw_clusters(&map_painter);
                }
                DotLayer::Individuals => {
                    draw_clusters(&map_painter);
                    draw_individuals(&map_painter);
                }
            }

            if state.dot_layer.is_fading(now) {
                ctx.request_repaint();
            }

            if state.contributors.is_empty() {
                painter.text(
                    map_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No contributor data",
                    egui::FontId::proportional(16.0),
                    OVERLAY_TEXT_COLOR,
                );
            }

            draw_overlay_info(ui, &response.rect, state);
            show_tooltip(&response, state);
        });
}

/// Largest rectangle with the map's aspect ratio, centred in `rect`.
fn letterbox(rect: Rect, map_size: DVec2) -> Rect {
    let aspect = (map_size.x / map_size.y) as f32;
    let mut size = rect.size();
    if size.x / size.y > aspect {
        size.x = size.y * aspect;
    } else {
        size.y = size.x / aspect;
    }
    Rect::from_center_size(rect.center(), size)
}

fn to_screen_rect(rect: Rect) -> ScreenRect {
    ScreenRect::new(to_dvec(rect.min), DVec2::new(rect.width().into(), rect.height().into()))
}

fn to_dvec(pos: Pos2) -> DVec2 {
    DVec2::new(pos.x.into(), pos.y.into())
}

/// Converts this frame's raw events into pointer input for the recognizer.
///
/// Contacts only begin on the map; moves and releases are followed
/// everywhere so a drag that leaves the map still ends cleanly.
fn collect_pointer_input(ctx: &egui::Context, map_rect: Rect) -> Vec<PointerInput> {
    ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|event| match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        map_rect
                            .contains(*pos)
                            .then(|| PointerInput::Down { pos: to_dvec(*pos) })
                    } else {
                        Some(PointerInput::Up)
                    }
                }
                egui::Event::PointerMoved(pos) => Some(PointerInput::Move { pos: to_dvec(*pos) }),
                egui::Event::PointerGone => Some(PointerInput::Up),
                egui::Event::Touch { id, phase, pos, .. } => {
                    let on_map = map_rect.contains(*pos);
                    let id = id.0;
                    let pos = to_dvec(*pos);
                    match phase {
                        egui::TouchPhase::Start => {
                            on_map.then_some(PointerInput::TouchStart { id, pos })
                        }
                        egui::TouchPhase::Move => Some(PointerInput::TouchMove { id, pos }),
                        egui::TouchPhase::End => Some(PointerInput::TouchEnd { id }),
                        egui::TouchPhase::Cancel => Some(PointerInput::TouchCancel { id }),
                    }
                }
                _ => None,
            })
            .collect()
    })
}

fn handle_canvas_interaction(
    ctx: &egui::Context,
    response: &egui::Response,
    map_rect: Rect,
    screen: &ScreenRect,
    state: &mut AppState,
) {
    for input in collect_pointer_input(ctx, map_rect) {
        if let Some(event) = state.gestures.process(input) {
            if matches!(event, GestureEvent::PinchStart { .. }) {
                state.hovered = None;
            }
            state.viewport.handle(event, screen);
        }
    }

    // Wheel zoom anchored at the cursor
    if response.hovered() {
        let scroll_delta = ctx.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 {
            if let Some(cursor) = response.hover_pos() {
                let direction = if scroll_delta.y > 0.0 {
                    WheelZoom::In
                } else {
                    WheelZoom::Out
                };
                state.viewport.on_wheel(direction, to_dvec(cursor), screen);
            }
        }
    }

    // Reset view on double-click
    if response.double_clicked() {
        state.viewport.on_double_click();
    }

    update_hover(response, map_rect, screen, state);

    let cursor = match state.viewport.mode() {
        InteractionMode::Panning { .. } | InteractionMode::Pinching { .. } => CursorIcon::Grabbing,
        InteractionMode::Idle if state.hovered.is_some() => CursorIcon::PointingHand,
        InteractionMode::Idle if response.hovered() => CursorIcon::Grab,
        InteractionMode::Idle => return,
    };
    ctx.set_cursor_icon(cursor);
}

fn update_hover(
    response: &egui::Response,
    map_rect: Rect,
    screen: &ScreenRect,
    state: &mut AppState,
) {
    let pointer = response.hover_pos().filter(|pos| map_rect.contains(*pos));
    let Some(pos) = pointer else {
        state.hovered = None;
        state.cursor_geo = None;
        return;
    };

    let point = state.viewport.view().screen_to_map(to_dvec(pos), screen);
    state.cursor_geo = state
        .projection
        .contains(point)
        .then(|| state.projection.map_to_geo(point));

    // No tooltips while the map is being dragged or pinched
    state.hovered = if state.viewport.is_interacting() {
        None
    } else {
        state
            .layers
            .pick(state.dot_layer.active(), point, state.viewport.current_zoom())
    };
}

fn show_tooltip(response: &egui::Response, state: &AppState) {
    let Some(text) = state.hovered.and_then(|hit| state.layers.tooltip(hit)) else {
        return;
    };
    response.clone().on_hover_text_at_pointer(text);
}

fn draw_overlay_info(ui: &mut egui::Ui, rect: &Rect, state: &AppState) {
    let overlay_pos = rect.left_bottom() + Vec2::new(10.0, -46.0);
    let overlay_rect = Rect::from_min_size(overlay_pos, Vec2::new(rect.width() - 20.0, 40.0));

    ui.scope_builder(egui::UiBuilder::new().max_rect(overlay_rect), |ui| {
        ui.vertical(|ui| {
            let position = match state.cursor_geo {
                Some(coord) => format!("{:>8.3}°, {:>8.3}°", coord.y, coord.x),
                None => "--".to_string(),
            };
            ui.label(
                RichText::new(position)
                    .monospace()
                    .size(12.0)
                    .color(OVERLAY_TEXT_COLOR),
            );
            ui.label(
                RichText::new("Scroll or pinch to zoom · drag to pan · double-click to reset")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_wide_screen() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), Vec2::new(400.0, 100.0));
        let boxed = letterbox(rect, DVec2::new(200.0, 100.0));
        assert_eq!(boxed.size(), Vec2::new(200.0, 100.0));
        assert_eq!(boxed.center(), rect.center());
    }

    #[test]
    fn test_letterbox_tall_screen() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 10.0), Vec2::new(100.0, 300.0));
        let boxed = letterbox(rect, DVec2::new(200.0, 100.0));
        assert_eq!(boxed.size(), Vec2::new(100.0, 50.0));
        assert_eq!(boxed.center(), rect.center());
    }
}
