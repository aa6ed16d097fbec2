//! Visibility arbiter for frameshell.
//!
//! Turns batches of per-frame visibility ratios into a single authoritative
//! active frame without flicker. Ratios land first, decisions second, so a
//! batch is atomic; an explicit activation arms a race guard in the store
//! that transiently-crossing frames cannot override. Purely reactive: never
//! creates or destroys frames.

use tracing::debug;

use crate::managers::frame_manager::{FrameManager, FrameManagerTrait};
use crate::services::renderer::Renderer;
use crate::types::command::VisibilityUpdate;
use crate::types::frame::{FrameId, LifecycleState};
use crate::types::settings::VisibilitySettings;

pub struct VisibilityArbiter {
    activation_threshold: f64,
    deactivation_threshold: f64,
    /// While overview mode is open or the screen is locked, ratios are
    /// still recorded but no activation decisions are made.
    suspended: bool,
}

impl VisibilityArbiter {
    pub fn new(settings: &VisibilitySettings) -> Self {
        Self {
            activation_threshold: settings.activation_threshold,
            deactivation_threshold: settings.deactivation_threshold,
            suspended: false,
        }
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Applies one batch of visibility reports.
    ///
    /// All ratio updates are written before any decision is made. Candidate
    /// selection prefers, in order: the current active frame (stability
    /// bias), the expected frame armed by an explicit activation, then the
    /// first candidate in collection order. While an expectation is armed,
    /// no other frame may take over; the expectation commits and clears
    /// only when the expected frame's own crossing arrives.
    pub fn apply_batch(
        &mut self,
        updates: &[VisibilityUpdate],
        store: &mut FrameManager,
        renderer: &mut dyn Renderer,
    ) {
        for update in updates {
            store.set_visibility(update.id, update.ratio.clamp(0.0, 1.0));
        }
        if self.suspended {
            return;
        }

        let candidates: Vec<FrameId> = store
            .frames()
            .iter()
            .filter(|f| f.is_alive() && f.visibility_ratio >= self.activation_threshold)
            .map(|f| f.id)
            .collect();

        let active = store.active_frame();
        let expected = store.expected_active();

        if let Some(current) = active.filter(|id| candidates.contains(id)) {
            // Stable: the active frame is still a candidate. Commit clears
            // the guard when the expectation was the active frame itself.
            store.commit_visible(current, renderer);
        } else if let Some(expected) = expected {
            if candidates.contains(&expected) {
                store.commit_visible(expected, renderer);
            } else {
                debug!(%expected, "deferring to expected frame, ignoring transient crossing");
            }
        } else if let Some(first) = candidates.first() {
            store.commit_visible(*first, renderer);
        }

        // Hysteresis low bound: frames scrolled out of view while not
        // active are deactivated; the band in between changes nothing.
        let to_deactivate: Vec<FrameId> = store
            .frames()
            .iter()
            .filter(|f| {
                Some(f.id) != store.active_frame()
                    && f.visibility_ratio < self.deactivation_threshold
                    && matches!(
                        f.lifecycle,
                        LifecycleState::Opening | LifecycleState::Active
                    )
            })
            .map(|f| f.id)
            .collect();
        for id in to_deactivate {
            store.mark_inactive(id, renderer);
        }
    }

    /// Re-establishes exactly one active, fully interactive frame after
    /// overview mode suspended normal bookkeeping.
    pub fn ensure_active(&self, store: &mut FrameManager, renderer: &mut dyn Renderer) {
        let healthy = store
            .active_frame()
            .and_then(|id| store.get(id))
            .map(|f| f.lifecycle == LifecycleState::Active)
            .unwrap_or(false);
        if healthy {
            store.resume_active(renderer);
        } else if let Some(home) = store.homescreen() {
            store.activate(home, renderer);
        }
    }
}
