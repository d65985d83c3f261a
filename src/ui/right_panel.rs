//! Right panel UI: country legend, top contributors and map options.

use crate::state::AppState;
use eframe::egui::{self, Color32, RichText, ScrollArea};

/// Contributors listed under "Top contributors".
const TOP_CONTRIBUTORS: usize = 10;

/// Zoom used when jumping to a contributor from the list.
const FOCUS_ZOOM: f64 = 4.0;

pub fn render_right_panel(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::right("right_panel")
        .resizable(true)
        .default_width(220.0)
        .min_width(180.0)
        .max_width(350.0)
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Community");
                ui.separator();

                render_countries_section(ui, state);
                ui.add_space(5.0);

                render_top_contributors_section(ui, state);
                ui.add_space(5.0);

                render_map_section(ui, state);
            });
        });
}

fn render_countries_section(ui: &mut egui::Ui, state: &AppState) {
    egui::CollapsingHeader::new(RichText::new("Countries").strong())
        .default_open(true)
        .show(ui, |ui| {
            if state.country_stats.is_empty() {
                ui.label(RichText::new("No geocoded contributors").small());
                return;
            }
            egui::Grid::new("country_legend")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for stat in &state.country_stats {
                        ui.label(&stat.country);
                        ui.label(
                            RichText::new(stat.count.to_string())
                                .monospace()
                                .color(Color32::from_rgb(23, 193, 255)),
                        )
                        .on_hover_text(format!("{} contributions", stat.contributions));
                        ui.end_row();
                    }
                });
        });
}

fn render_top_contributors_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Top contributors").strong())
        .default_open(false)
        .show(ui, |ui| {
            let mut focus = None;
            for contributor in state
                .contributors
                .iter()
                .filter(|c| c.is_geocoded())
                .take(TOP_CONTRIBUTORS)
            {
                let label = format!("{} ({})", contributor.display_name(), contributor.score());
                if ui.link(label).clicked() {
                    focus = contributor.coordinates;
                }
            }
            if let Some(coords) = focus {
                state.focus_on(coords.lat, coords.lng, FOCUS_ZOOM);
            }
        });
}

fn render_map_section(ui: &mut egui::Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Map").strong())
        .default_open(true)
        .show(ui, |ui| {
            ui.checkbox(&mut state.show_graticule, "Graticule");
            ui.label(
                RichText::new(format!(
                    "Individual dots above {:.1}× zoom",
                    state.settings.cluster_zoom_threshold
                ))
                .small(),
            );
            if state.geocoded_count() < state.contributors.len() {
                ui.label(
                    RichText::new(format!(
                        "{} contributors without a location",
                        state.contributors.len() - state.geocoded_count()
                    ))
                    .small()
                    .color(Color32::GRAY),
                );
            }
        });
}
