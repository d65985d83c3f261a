//! Map geometry: projection, land, clustering, individual dot layout and
//! rendering.
//!
//! Everything here works in map units, the fixed coordinate space of the
//! world map illustration. The viewport decides which part of that space is
//! on screen.

mod cluster;
mod individual;
mod land;
mod picking;
mod projection;
mod renderer;

pub use cluster::{compute_clusters_with_grid, MapCluster, DEFAULT_GRID_DEG};
pub use individual::{compute_individuals, MapIndividual};
pub use land::{load_embedded_land, LandShape};
pub use picking::{DotHit, DotLayer, DotLayers};
pub use projection::{MapCalibration, MapProjection};
pub use renderer::{
    render_clusters, render_graticule, render_individuals, render_land, render_map_frame,
    ScreenMapping,
};
