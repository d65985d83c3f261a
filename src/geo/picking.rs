//! Precomputed dot layers and hover picking.

use super::{
    compute_clusters_with_grid, compute_individuals, MapCluster, MapIndividual, MapProjection,
};
use crate::data::ContributorLocation;
use glam::DVec2;

/// Which dot layer is in front.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DotLayer {
    #[default]
    Clusters,
    Individuals,
}

impl DotLayer {
    pub fn label(&self) -> &'static str {
        match self {
            DotLayer::Clusters => "Clusters",
            DotLayer::Individuals => "Individuals",
        }
    }
}

/// A dot under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotHit {
    Cluster(usize),
    Individual(usize),
}

/// Both dot layers, projected once for the loaded contributors.
///
/// The layers only depend on the contributor list, the calibration and the
/// grid size, so they are rebuilt only when one of those changes, never on
/// pan or zoom.
#[derive(Debug, Clone, Default)]
pub struct DotLayers {
    pub clusters: Vec<MapCluster>,
    /// Map-space centroid of each cluster
    pub cluster_positions: Vec<DVec2>,
    pub individuals: Vec<MapIndividual>,
}

impl DotLayers {
    pub fn build(
        contributors: &[ContributorLocation],
        projection: &MapProjection,
        grid_deg: f64,
    ) -> Self {
        let clusters = compute_clusters_with_grid(contributors, grid_deg);
        let cluster_positions = clusters.iter().map(|c| c.position(projection)).collect();
        let individuals = compute_individuals(contributors, projection);

        log::debug!(
            "Built dot layers: {} clusters, {} individuals",
            clusters.len(),
            individuals.len()
        );

        Self {
            clusters,
            cluster_positions,
            individuals,
        }
    }

    /// Finds the dot of `layer` under a map-space point.
    ///
    /// Dot radii are divided by `zoom` to match how they are drawn. When dots
    /// overlap, the one drawn last (topmost) wins.
    pub fn pick(&self, layer: DotLayer, point: DVec2, zoom: f64) -> Option<DotHit> {
        let scale = 1.0 / zoom.max(f64::EPSILON);
        match layer {
            DotLayer::Clusters => self
                .clusters
                .iter()
                .zip(&self.cluster_positions)
                .rposition(|(cluster, pos)| pos.distance(point) <= cluster.radius() * scale)
                .map(DotHit::Cluster),
            DotLayer::Individuals => self
                .individuals
                .iter()
                .rposition(|ind| ind.position.distance(point) <= ind.radius * scale)
                .map(DotHit::Individual),
        }
    }

    /// Tooltip text for a picked dot.
    pub fn tooltip(&self, hit: DotHit) -> Option<String> {
        match hit {
            DotHit::Cluster(i) => self.clusters.get(i).map(|c| {
                format!(
                    "{}\n{}\n{} contributors • {} contributions",
                    c.country,
                    c.names_label(),
                    c.member_count,
                    c.total_contributions
                )
            }),
            DotHit::Individual(i) => self.individuals.get(i).map(|ind| {
                format!(
                    "{}\n@{}\n{}\n{} contributions",
                    ind.name,
                    ind.login,
                    ind.location_label(),
                    ind.contributions
                )
            }),
        }
    }
}
