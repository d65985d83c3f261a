//! UI modules for the community map.
//!
//! The UI is split into distinct panels:
//! - Top bar: Title, contributor summary and zoom
//! - Central canvas: The interactive map
//! - Right panel: Country legend and map options

mod canvas;
mod right_panel;
mod top_bar;

pub use canvas::render_canvas;
pub use right_panel::render_right_panel;
pub use top_bar::render_top_bar;
