//! Individual contributor dots for the zoomed-in map.
//!
//! Contributors whose coordinates are exactly equal (typically geocoded to
//! the same city centre) would draw on top of each other. Each such group is
//! spread out on a golden-angle spiral around the shared point.

use super::MapProjection;
use crate::data::ContributorLocation;
use glam::DVec2;
use std::collections::HashMap;

/// The golden angle, `π(3 − √5)` ≈ 137.5°.
pub fn golden_angle() -> f64 {
    std::f64::consts::PI * (3.0 - 5.0_f64.sqrt())
}

/// Spiral spacing as a fraction of the dot radius.
const SPIRAL_SPACING: f64 = 0.13;

/// A single contributor positioned in map units.
#[derive(Debug, Clone, PartialEq)]
pub struct MapIndividual {
    /// Index of the contributor in the input slice
    #[allow(dead_code)]
    pub index: usize,
    pub login: String,
    pub name: String,
    pub location: String,
    pub country: String,
    pub contributions: u64,
    /// Projected position including the spiral offset
    pub position: DVec2,
    /// Dot radius in base map units
    pub radius: f64,
}

impl MapIndividual {
    pub fn glow_radius(&self) -> f64 {
        self.radius + 3.0
    }

    /// Location line for tooltips: the profile location, else the country.
    pub fn location_label(&self) -> &str {
        if self.location.is_empty() {
            &self.country
        } else {
            &self.location
        }
    }
}

/// Dot radius for a contribution count: `min(4 + 1.5·ln(n + 1), 10)`.
pub fn dot_radius(contributions: u64) -> f64 {
    (4.0 + (contributions as f64 + 1.0).ln() * 1.5).min(10.0)
}

/// Offset of the `index`-th member of a group sharing one coordinate.
///
/// `index` 0 sits on the shared point; later members move outwards with
/// radius `spacing·√index` at successive golden-angle turns.
pub fn spiral_offset(index: usize, spacing: f64) -> DVec2 {
    let angle = index as f64 * golden_angle();
    let r = spacing * (index as f64).sqrt();
    DVec2::new(r * angle.cos(), r * angle.sin())
}

/// Positions every geocoded contributor, in input order.
///
/// Within a group of identical coordinates, members are numbered in input
/// order; a group of one gets no offset.
pub fn compute_individuals(
    contributors: &[ContributorLocation],
    projection: &MapProjection,
) -> Vec<MapIndividual> {
    let key = |c: &ContributorLocation| {
        c.coordinates
            .map(|coords| (coords.lat.to_bits(), coords.lng.to_bits()))
    };

    let mut group_sizes: HashMap<(u64, u64), usize> = HashMap::new();
    for k in contributors.iter().filter_map(key) {
        *group_sizes.entry(k).or_insert(0) += 1;
    }

    let mut next_index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut individuals = Vec::with_capacity(contributors.len());

    for (i, contributor) in contributors.iter().enumerate() {
        let (Some(coords), Some(k)) = (contributor.coordinates, key(contributor)) else {
            continue;
        };

        let contributions = contributor.contributions();
        let radius = dot_radius(contributions);
        let mut position = projection.project(coords.lat, coords.lng);

        if group_sizes.get(&k).copied().unwrap_or(1) > 1 {
            let slot = next_index.entry(k).or_insert(0);
            position += spiral_offset(*slot, radius * SPIRAL_SPACING);
            *slot += 1;
        }

        individuals.push(MapIndividual {
            index: i,
            login: contributor.login.clone(),
            name: contributor.display_name().to_string(),
            location: contributor.location.clone().unwrap_or_default(),
            country: contributor.country.clone().unwrap_or_default(),
            contributions,
            position,
            radius,
        });
    }

    individuals
}
