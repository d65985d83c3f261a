//! Grid-bucket clustering for the zoomed-out map.
//!
//! Contributors are bucketed by rounding latitude and longitude to the
//! nearest multiple of the grid size. Each occupied bucket becomes one
//! cluster centred on the mean of its members' coordinates.

use super::MapProjection;
use crate::data::{ContributorLocation, LatLng};
use glam::DVec2;
use std::collections::HashMap;

/// Default cluster grid size in degrees.
pub const DEFAULT_GRID_DEG: f64 = 3.0;

/// Number of member names shown in a cluster tooltip.
pub const MAX_SAMPLE_NAMES: usize = 3;

/// A group of contributors sharing one grid bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCluster {
    /// Mean latitude/longitude of the members
    pub centroid: LatLng,
    pub member_count: usize,
    /// Sum of commits + issues over all members
    pub total_contributions: u64,
    /// Up to [`MAX_SAMPLE_NAMES`] member names, in input order
    pub display_names: Vec<String>,
    /// Members not named in `display_names`
    pub overflow: usize,
    /// Country of the first member
    pub country: String,
    /// Indices of the members in the input slice
    #[allow(dead_code)]
    pub members: Vec<usize>,
}

impl MapCluster {
    /// Sample names joined for display, e.g. `"a, b, c +2 more"`.
    pub fn names_label(&self) -> String {
        let mut label = self.display_names.join(", ");
        if self.overflow > 0 {
            label.push_str(&format!(" +{} more", self.overflow));
        }
        label
    }

    /// Dot radius in base map units; grows with members and activity.
    pub fn radius(&self) -> f64 {
        let base = (5.0 + self.member_count as f64 * 3.0).min(15.0);
        (base + (self.total_contributions as f64 + 1.0).ln() * 2.0).min(25.0)
    }

    pub fn glow_radius(&self) -> f64 {
        self.radius() + 4.0
    }

    /// Centroid position in map units.
    pub fn position(&self, projection: &MapProjection) -> DVec2 {
        projection.geo_to_map(self.centroid.to_coord())
    }
}

/// Grid cell index for a coordinate, rounding halves upwards.
fn grid_cell(value: f64, grid_deg: f64) -> i64 {
    (value / grid_deg + 0.5).floor() as i64
}

/// Clusters contributors on the default 3° grid.
#[allow(dead_code)]
pub fn compute_clusters(contributors: &[ContributorLocation]) -> Vec<MapCluster> {
    compute_clusters_with_grid(contributors, DEFAULT_GRID_DEG)
}

/// Clusters geocoded contributors on a `grid_deg` × `grid_deg` grid.
///
/// Clusters are returned in order of their first member's position in the
/// input. Contributors without coordinates are skipped.
pub fn compute_clusters_with_grid(
    contributors: &[ContributorLocation],
    grid_deg: f64,
) -> Vec<MapCluster> {
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    let mut index: HashMap<(i64, i64), usize> = HashMap::new();

    for (i, contributor) in contributors.iter().enumerate() {
        let Some(coords) = contributor.coordinates else {
            continue;
        };
        let key = (grid_cell(coords.lat, grid_deg), grid_cell(coords.lng, grid_deg));
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(i);
    }

    buckets
        .into_iter()
        .map(|members| build_cluster(contributors, members))
        .collect()
}

fn build_cluster(contributors: &[ContributorLocation], members: Vec<usize>) -> MapCluster {
    let count = members.len();
    let (sum_lat, sum_lng) = members
        .iter()
        .filter_map(|&i| contributors[i].coordinates)
        .fold((0.0, 0.0), |(lat, lng), c| (lat + c.lat, lng + c.lng));

    let total_contributions = members
        .iter()
        .map(|&i| contributors[i].contributions())
        .sum();

    let display_names = members
        .iter()
        .take(MAX_SAMPLE_NAMES)
        .map(|&i| contributors[i].display_name().to_string())
        .collect();

    MapCluster {
        centroid: LatLng::new(sum_lat / count as f64, sum_lng / count as f64),
        member_count: count,
        total_contributions,
        display_names,
        overflow: count.saturating_sub(MAX_SAMPLE_NAMES),
        country: contributors[members[0]].country_or_unknown().to_string(),
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(login: &str, lat: f64, lng: f64) -> ContributorLocation {
        ContributorLocation::new(login, lat, lng, 2, 1)
    }

    #[test]
    fn test_berlin_paris_scenario() {
        let contributors = vec![
            city("a", 52.52, 13.40).with_country("Germany"),
            city("b", 52.52, 13.40).with_country("Germany"),
            city("c", 48.85, 2.35).with_country("France"),
        ];
        let clusters = compute_clusters(&contributors);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].member_count, 2);
        assert_eq!(clusters[0].country, "Germany");
        assert_eq!(clusters[0].total_contributions, 6);
        assert_eq!(clusters[1].member_count, 1);
        assert_eq!(clusters[1].country, "France");
    }

    #[test]
    fn test_centroid_is_member_mean() {
        // Both round to the (51, 12) bucket
        let contributors = vec![city("a", 51.0, 12.0), city("b", 52.0, 13.0)];
        let clusters = compute_clusters(&contributors);

        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].centroid.lat - 51.5).abs() < 1e-12);
        assert!((clusters[0].centroid.lng - 12.5).abs() < 1e-12);
    }

    #[test]
    fn test_half_values_round_up() {
        // -1.5 / 3 = -0.5 rounds to 0, same as 1.0 / 3
        let contributors = vec![city("a", -1.5, 0.0), city("b", 1.0, 0.0)];
        assert_eq!(compute_clusters(&contributors).len(), 1);
        // -1.6 / 3 rounds to -1
        let contributors = vec![city("a", -1.6, 0.0), city("b", 1.0, 0.0)];
        assert_eq!(compute_clusters(&contributors).len(), 2);
    }

    #[test]
    fn test_every_member_in_exactly_one_cluster() {
        let mut contributors: Vec<ContributorLocation> = (0..60)
            .map(|i| {
                let lat = ((i * 37) % 140) as f64 - 55.0 + (i as f64) * 0.01;
                let lng = ((i * 53) % 340) as f64 - 165.0;
                city(&format!("user{}", i), lat, lng)
            })
            .collect();
        contributors[7].coordinates = None;

        let clusters = compute_clusters(&contributors);
        let mut seen = vec![0usize; contributors.len()];
        for cluster in &clusters {
            assert_eq!(cluster.members.len(), cluster.member_count);
            for &m in &cluster.members {
                seen[m] += 1;
            }
        }
        for (i, count) in seen.iter().enumerate() {
            let expected = usize::from(contributors[i].is_geocoded());
            assert_eq!(*count, expected, "contributor {} seen {} times", i, count);
        }
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let contributors: Vec<ContributorLocation> = (0..30)
            .map(|i| city(&format!("u{}", i), (i % 7) as f64 * 4.1, (i % 5) as f64 * 6.3))
            .collect();
        assert_eq!(compute_clusters(&contributors), compute_clusters(&contributors));
    }

    #[test]
    fn test_sample_names_and_overflow() {
        let contributors = vec![
            city("first", 10.0, 10.0).with_name("First"),
            city("second", 10.0, 10.0),
            city("third", 10.0, 10.0).with_name("Third"),
            city("fourth", 10.0, 10.0),
            city("fifth", 10.0, 10.0),
        ];
        let clusters = compute_clusters(&contributors);

        assert_eq!(clusters[0].display_names, vec!["First", "second", "Third"]);
        assert_eq!(clusters[0].overflow, 2);
        assert_eq!(clusters[0].names_label(), "First, second, Third +2 more");
        assert_eq!(clusters[0].country, "Unknown");
    }

    #[test]
    fn test_empty_input_has_no_clusters() {
        assert!(compute_clusters(&[]).is_empty());
    }

    #[test]
    fn test_radius_is_bounded() {
        let contributors: Vec<ContributorLocation> = (0..40)
            .map(|i| ContributorLocation::new(&format!("u{}", i), 0.0, 0.0, 500, 500))
            .collect();
        let clusters = compute_clusters(&contributors);
        assert_eq!(clusters[0].radius(), 25.0);

        let single = compute_clusters(&contributors[..1]);
        assert!(single[0].radius() > 8.0 && single[0].radius() <= 25.0);
    }
}
