//! Top bar UI: title, contributor summary, zoom and status.

use crate::state::AppState;
use eframe::egui::{self, Color32, RichText};

pub fn render_top_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("top_bar")
        .exact_height(36.0)
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                // App title
                ui.label(
                    RichText::new("Global Community")
                        .strong()
                        .size(16.0)
                        .color(Color32::WHITE),
                );

                ui.separator();

                ui.label(
                    RichText::new(format!(
                        "{} contributors from {} countries",
                        state.geocoded_count(),
                        state.country_stats.len()
                    ))
                    .size(13.0)
                    .color(Color32::from_rgb(168, 216, 234)),
                );

                ui.separator();

                let zoom = state.viewport.current_zoom();
                ui.label(
                    RichText::new(format!("Zoom {:.0}%", zoom * 100.0))
                        .monospace()
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.label(
                    RichText::new(state.dot_layer.active().label())
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                let moved = !state.viewport.is_at_original();
                if ui
                    .add_enabled(moved, egui::Button::new("Reset view").small())
                    .clicked()
                {
                    state.viewport.on_double_click();
                }

                ui.separator();

                // Status text
                ui.label(
                    RichText::new(&state.status_message)
                        .size(13.0)
                        .color(Color32::GRAY),
                );
            });
        });
}
