#![warn(clippy::all)]

//! Community Map - an interactive world map of a project's contributors.
//!
//! Contributors are drawn as clustered dots when zoomed out and as
//! individual dots when zoomed in. The map pans and zooms with the mouse,
//! the scroll wheel or touch gestures, natively and in the browser.

mod data;
mod geo;
mod state;
mod ui;

use eframe::egui;
use state::{url_state, AppState, MapSettings};
use std::time::Duration;
use web_time::Instant;

/// Minimum time between URL updates.
const URL_PUSH_INTERVAL: Duration = Duration::from_secs(1);

// Native entry point
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Community Map",
        native_options,
        Box::new(|cc| Ok(Box::new(CommunityMapApp::new(cc)))),
    )
}

// WASM entry point - main is not called on wasm32
#[cfg(target_arch = "wasm32")]
fn main() {}

/// Entry point for the WASM application.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub async fn start() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` messages to `console.log`:
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document; cannot start the map");
            return;
        };

        let canvas = match document
            .get_element_by_id("app_canvas")
            .map(|el| el.dyn_into::<web_sys::HtmlCanvasElement>())
        {
            Some(Ok(canvas)) => canvas,
            _ => {
                log::error!("app_canvas is missing or not a HtmlCanvasElement");
                return;
            }
        };

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(CommunityMapApp::new(cc)))),
            )
            .await;

        // Remove the loading text once the app has loaded:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p>The map failed to start. See the developer console for details.</p>",
                    );
                    log::error!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}

/// Main application state and logic.
pub struct CommunityMapApp {
    /// Application state containing all sub-states
    state: AppState,

    /// Monotonic instant of last URL push (for throttling to ~1/sec).
    last_url_push: Instant,

    /// View last written to the URL, to skip redundant pushes
    last_pushed_view: Option<(f64, f64, f64)>,
}

impl CommunityMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        let settings = MapSettings::load();
        let contributors = data::load_startup_contributors();
        let mut state = AppState::new(settings, contributors);

        // Restore a shared view from the URL
        let params = url_state::parse_from_url();
        if let Some((lat, lng, zoom)) = params.view() {
            log::info!("Restoring view from URL: {:.4}, {:.4} @ {:.2}", lat, lng, zoom);
            state.focus_on(lat, lng, zoom);
        }

        log::info!(
            "Community map ready: {} contributors, {} on the map, {} countries, {} clusters",
            state.contributors.len(),
            state.geocoded_count(),
            state.country_stats.len(),
            state.layers.clusters.len()
        );

        Self {
            state,
            last_url_push: Instant::now(),
            last_pushed_view: None,
        }
    }

    /// Writes the current view to the URL at most once per second.
    fn push_url_state(&mut self) {
        let throttled = self.last_url_push.elapsed() < URL_PUSH_INTERVAL;
        if self.state.viewport.is_interacting() || throttled {
            return;
        }

        let center = self.state.view_center();
        let view = (center.y, center.x, self.state.viewport.current_zoom());
        if self.last_pushed_view != Some(view) {
            url_state::push_to_url(view.0, view.1, view.2);
            self.last_pushed_view = Some(view);
        }
        self.last_url_push = Instant::now();
    }
}

impl eframe::App for CommunityMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::render_top_bar(ctx, &mut self.state);
        ui::render_right_panel(ctx, &mut self.state);
        ui::render_canvas(ctx, &mut self.state);

        self.push_url_state();
    }
}
