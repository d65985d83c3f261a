//! Contributor data loaded at start-up.
//!
//! The geocoded contributor list is produced offline. A copy is embedded at
//! compile time so the web build works without any fetches; native builds
//! may point `COMMUNITY_MAP_DATA` at a fresher file.

pub mod contributors;

pub use contributors::{
    country_stats, parse_contributors, sort_by_score, ContributorLocation, CountryStat, LatLng,
};

#[cfg(not(target_arch = "wasm32"))]
pub use contributors::load_contributors;

/// Environment variable naming a contributor JSON file (native only).
#[cfg(not(target_arch = "wasm32"))]
pub const DATA_PATH_ENV: &str = "COMMUNITY_MAP_DATA";

// Embed the contributor snapshot at compile time
pub static EMBEDDED_CONTRIBUTORS: &str = include_str!("../../assets/contributor-locations.json");

/// Loads the contributor list, sorted by score.
///
/// Falls back to the embedded snapshot when no external file is configured
/// or the configured file cannot be read.
pub fn load_startup_contributors() -> Vec<ContributorLocation> {
    #[cfg(not(target_arch = "wasm32"))]
    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
        match load_contributors(std::path::Path::new(&path)) {
            Ok(mut contributors) => {
                sort_by_score(&mut contributors);
                log::info!("Loaded {} contributors from {}", contributors.len(), path);
                return contributors;
            }
            Err(e) => {
                log::error!("{:#}; using embedded contributor data", e);
            }
        }
    }

    match parse_contributors(EMBEDDED_CONTRIBUTORS) {
        Ok(mut contributors) => {
            sort_by_score(&mut contributors);
            log::info!("Loaded {} embedded contributors", contributors.len());
            contributors
        }
        Err(e) => {
            log::error!("{:#}", e);
            Vec::new()
        }
    }
}
