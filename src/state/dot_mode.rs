//! Zoom-driven switching between the cluster and individual dot layers.
//!
//! Individuals take over above the switch threshold; clusters come back at
//! or below the exit threshold. With both thresholds equal this is a hard
//! switch. Each switch starts a short opacity cross-fade.

use super::settings::MapSettings;
use crate::geo::DotLayer;
use std::time::Duration;
use web_time::Instant;

#[derive(Debug, Clone, Copy)]
struct Fade {
    /// Cluster layer opacity when the fade began
    from: f32,
    started: Instant,
}

/// Chooses the front dot layer from the current zoom.
#[derive(Debug, Clone)]
pub struct DotLayerSelector {
    threshold: f64,
    exit_threshold: f64,
    fade_duration: Duration,
    active: DotLayer,
    fade: Option<Fade>,
}

impl DotLayerSelector {
    pub fn new(settings: &MapSettings) -> Self {
        Self {
            threshold: settings.cluster_zoom_threshold,
            exit_threshold: settings.cluster_exit_threshold.min(settings.cluster_zoom_threshold),
            fade_duration: Duration::from_millis(settings.fade_duration_ms),
            active: DotLayer::Clusters,
            fade: None,
        }
    }

    pub fn active(&self) -> DotLayer {
        self.active
    }

    /// Re-evaluates the front layer for `zoom`. Returns true on a switch.
    pub fn update(&mut self, zoom: f64, now: Instant) -> bool {
        let next = match self.active {
            DotLayer::Clusters if zoom > self.threshold => DotLayer::Individuals,
            DotLayer::Individuals if zoom <= self.exit_threshold => DotLayer::Clusters,
            current => current,
        };
        if next == self.active {
            return false;
        }

        let from = self.cluster_opacity(now);
        self.active = next;
        self.fade = Some(Fade { from, started: now });
        log::debug!("Dot layer switched to {} at zoom {:.2}", next.label(), zoom);
        true
    }

    fn progress(&self, fade: &Fade, now: Instant) -> f32 {
        if self.fade_duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(fade.started);
        (elapsed.as_secs_f32() / self.fade_duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Opacity of the cluster layer in `[0, 1]`.
    pub fn cluster_opacity(&self, now: Instant) -> f32 {
        let target = match self.active {
            DotLayer::Clusters => 1.0,
            DotLayer::Individuals => 0.0,
        };
        match &self.fade {
            Some(fade) => fade.from + (target - fade.from) * self.progress(fade, now),
            None => target,
        }
    }

    /// Opacity of the individual layer; always `1 - cluster_opacity`.
    pub fn individual_opacity(&self, now: Instant) -> f32 {
        1.0 - self.cluster_opacity(now)
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        self.fade
            .as_ref()
            .is_some_and(|fade| self.progress(fade, now) < 1.0)
    }
}
