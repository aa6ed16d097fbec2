//! Frame store and lifecycle manager for frameshell.
//!
//! Owns the ordered collection of frame records, creates/activates/closes
//! them, and enforces the structural invariants: a single immortal
//! homescreen, at most one active frame, reciprocal split pairs, and
//! url-reuse dedupe. All notifications to taskbar-style collaborators go
//! out through the event bus.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, error};

use crate::services::event_bus::EventBus;
use crate::services::renderer::Renderer;
use crate::types::command::{Notice, StateChange};
use crate::types::errors::FrameError;
use crate::types::frame::{
    Disposition, FrameConfig, FrameId, FrameKind, FrameRecord, FrameState, FrameSummary,
    LifecycleState, SplitLink, SplitSide,
};

/// Trait defining frame store operations.
pub trait FrameManagerTrait {
    /// Create a new frame record in `Opening` state. Does not activate;
    /// callers decide that so overview teardown can be sequenced first.
    fn create(
        &mut self,
        url: &str,
        config: FrameConfig,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameId, FrameError>;
    /// Reuse-dedupe lookup: a live frame started at `url` whose privacy
    /// mode matches the request.
    fn find_reusable(&self, url: &str, private_browsing: bool) -> Option<FrameId>;
    /// Explicit activation. Deactivates the current frame first and arms
    /// the visibility race guard; a missing target is silently ignored.
    fn activate(&mut self, id: FrameId, renderer: &mut dyn Renderer);
    fn close(
        &mut self,
        id: FrameId,
        fallback: Option<FrameId>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), FrameError>;
    /// Pair the frame with a fresh empty sibling and activate the sibling.
    fn split_screen(
        &mut self,
        id: FrameId,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameId, FrameError>;
    fn get(&self, id: FrameId) -> Option<&FrameRecord>;
    fn frames(&self) -> &[FrameRecord];
    fn frame_count(&self) -> usize;
    fn active_frame(&self) -> Option<FrameId>;
    fn homescreen(&self) -> Option<FrameId>;
    /// Frames the taskbar should list, filter rule applied.
    fn taskbar_frames(&self) -> Vec<FrameSummary>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ReuseKey {
    url: String,
    private_browsing: bool,
}

/// In-memory frame store. Sole mutator of the frame collection.
pub struct FrameManager {
    frames: Vec<FrameRecord>,
    next_id: u64,
    active: Option<FrameId>,
    /// Guard against visibility races: set by explicit activation, cleared
    /// once the expected frame's own crossing commits it.
    expected_active: Option<FrameId>,
    reuse_index: HashMap<ReuseKey, FrameId>,
    setup_complete: bool,
    system_url_prefix: String,
    bus: Rc<EventBus>,
}

impl FrameManager {
    pub fn new(bus: Rc<EventBus>, system_url_prefix: String, setup_complete: bool) -> Self {
        Self {
            frames: Vec::new(),
            next_id: 0,
            active: None,
            expected_active: None,
            reuse_index: HashMap::new(),
            setup_complete,
            system_url_prefix,
            bus,
        }
    }

    fn position(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id == id)
    }

    fn get_mut(&mut self, id: FrameId) -> Option<&mut FrameRecord> {
        self.frames.iter_mut().find(|f| f.id == id)
    }

    /// Urls allowed through before the first-run sequence completes.
    fn setup_exempt(&self, url: &str, kind: FrameKind) -> bool {
        matches!(kind, FrameKind::Homescreen | FrameKind::CaptivePortal)
            || url.starts_with("about:")
            || url.starts_with(&self.system_url_prefix)
    }

    /// Lifts the first-run frame-creation gate.
    pub fn mark_setup_complete(&mut self) {
        self.setup_complete = true;
    }

    pub fn expected_active(&self) -> Option<FrameId> {
        self.expected_active
    }

    /// Writes the last reported visibility ratio. Missing frames ignored.
    pub fn set_visibility(&mut self, id: FrameId, ratio: f64) {
        if let Some(record) = self.get_mut(id) {
            record.visibility_ratio = ratio;
        }
    }

    /// Arbiter-driven activation: commits a frame whose visibility crossing
    /// makes it authoritative. Clears the race guard when it matches.
    pub fn commit_visible(&mut self, id: FrameId, renderer: &mut dyn Renderer) {
        if self.active == Some(id) {
            if self.expected_active == Some(id) {
                self.expected_active = None;
            }
            return;
        }
        if !self.get(id).map(FrameRecord::is_alive).unwrap_or(false) {
            return;
        }
        self.deactivate_current(renderer);
        if let Some(record) = self.get_mut(id) {
            record.lifecycle = LifecycleState::Active;
        }
        renderer.activate(id);
        self.active = Some(id);
        if self.expected_active == Some(id) {
            self.expected_active = None;
        }
        debug!(%id, "frame committed active by visibility");
        self.bus.publish(&Notice::FrameActivated { id });
    }

    /// Deactivates a frame that scrolled out of view while not active.
    pub fn mark_inactive(&mut self, id: FrameId, renderer: &mut dyn Renderer) {
        if self.active == Some(id) {
            return;
        }
        if let Some(record) = self.get_mut(id) {
            if matches!(
                record.lifecycle,
                LifecycleState::Opening | LifecycleState::Active
            ) {
                record.lifecycle = LifecycleState::Inactive;
                renderer.deactivate(id);
            }
        }
    }

    /// The frame at a 1-based position among non-homescreen frames.
    pub fn frame_at_position(&self, position: usize) -> Option<FrameId> {
        if position == 0 {
            return None;
        }
        self.frames
            .iter()
            .filter(|f| !f.is_homescreen())
            .nth(position - 1)
            .map(|f| f.id)
    }

    /// The last frame in collection order.
    pub fn last_frame(&self) -> Option<FrameId> {
        self.frames.last().map(|f| f.id)
    }

    /// Neighbor of the active frame among non-homescreen frames, wrapping.
    pub fn neighbor_of_active(&self, forward: bool) -> Option<FrameId> {
        let ring: Vec<FrameId> = self
            .frames
            .iter()
            .filter(|f| !f.is_homescreen() && f.is_alive())
            .map(|f| f.id)
            .collect();
        if ring.is_empty() {
            return None;
        }
        let current = self.active.and_then(|id| ring.iter().position(|&r| r == id));
        let next = match current {
            Some(idx) => {
                if forward {
                    (idx + 1) % ring.len()
                } else {
                    (idx + ring.len() - 1) % ring.len()
                }
            }
            None => 0,
        };
        Some(ring[next])
    }

    /// Suspends the active frame at the renderer (screen off / lockscreen).
    /// Lifecycle is untouched so the active-frame invariant holds.
    pub fn suspend_active(&self, renderer: &mut dyn Renderer) {
        if let Some(id) = self.active {
            renderer.deactivate(id);
        }
    }

    pub fn resume_active(&self, renderer: &mut dyn Renderer) {
        if let Some(id) = self.active {
            renderer.activate(id);
        }
    }

    /// Applies a state change pushed by the rendering collaborator.
    /// Returns true when the change affects the taskbar projection.
    pub fn apply_state_change(&mut self, id: FrameId, change: StateChange) -> bool {
        let Some(record) = self.get_mut(id) else {
            return false;
        };
        match change {
            StateChange::Title(title) => {
                record.state.title = title;
                true
            }
            StateChange::Icon(icon) => {
                record.state.icon = icon;
                true
            }
            StateChange::Url(url) => {
                record.state.url = url;
                true
            }
            StateChange::AudioPlaying(playing) => {
                record.state.is_playing_audio = playing;
                true
            }
            StateChange::AudioMuted(muted) => {
                record.state.audio_muted = muted;
                true
            }
            StateChange::CanGoBack(v) => {
                record.state.can_go_back = v;
                false
            }
            StateChange::CanGoForward(v) => {
                record.state.can_go_forward = v;
                false
            }
            StateChange::BackgroundColor(color) => {
                record.state.background_color = color;
                false
            }
        }
    }

    pub fn publish_frame_list(&self) {
        self.bus.publish(&Notice::FrameListUpdated {
            frames: self.taskbar_frames(),
        });
    }

    fn taskbar_eligible(&self, record: &FrameRecord) -> bool {
        if record.is_homescreen() {
            return false;
        }
        let url = &record.state.url;
        if url.trim().is_empty() {
            return false;
        }
        if url.starts_with(&self.system_url_prefix) {
            return false;
        }
        if url.starts_with("about:") {
            return false;
        }
        // Unpackaged local files without a manifest are not apps.
        if url.starts_with("file://") && record.manifest_url.is_none() {
            return false;
        }
        true
    }

    fn deactivate_current(&mut self, renderer: &mut dyn Renderer) {
        if let Some(current) = self.active {
            if let Some(record) = self.get_mut(current) {
                record.lifecycle = LifecycleState::Inactive;
                renderer.deactivate(current);
            }
        }
    }
}

impl FrameManagerTrait for FrameManager {
    fn create(
        &mut self,
        url: &str,
        config: FrameConfig,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameId, FrameError> {
        if matches!(config.kind, FrameKind::Homescreen) && self.homescreen().is_some() {
            error!(url, "refusing second homescreen frame");
            return Err(FrameError::HomescreenExists);
        }
        if !self.setup_complete && !self.setup_exempt(url, config.kind) {
            error!(url, "frame creation refused before setup completion");
            return Err(FrameError::SetupIncomplete(url.to_string()));
        }

        let id = FrameId(self.next_id);
        self.next_id += 1;

        let record = FrameRecord {
            id,
            source_url: url.to_string(),
            kind: config.kind,
            split: None,
            previous_frame: config.previous_frame,
            manifest_url: config.manifest_url.clone(),
            state: FrameState {
                title: url.to_string(),
                url: url.to_string(),
                is_private_browsing: config.private_browsing,
                ..FrameState::default()
            },
            visibility_ratio: 0.0,
            lifecycle: LifecycleState::Opening,
        };

        let insert_at = config
            .insert_after
            .and_then(|after| self.position(after).map(|p| p + 1))
            .unwrap_or(self.frames.len());
        self.frames.insert(insert_at, record);

        // Blank and about: frames are never reuse targets; every new-tab
        // request gets a fresh frame.
        if !url.is_empty() && !url.starts_with("about:") {
            self.reuse_index.insert(
                ReuseKey {
                    url: url.to_string(),
                    private_browsing: config.private_browsing,
                },
                id,
            );
        }

        renderer.create_surface(id, url);
        debug!(%id, url, "frame opened");
        self.bus.publish(&Notice::FrameOpened {
            id,
            url: url.to_string(),
        });
        self.publish_frame_list();
        Ok(id)
    }

    fn find_reusable(&self, url: &str, private_browsing: bool) -> Option<FrameId> {
        let key = ReuseKey {
            url: url.to_string(),
            private_browsing,
        };
        self.reuse_index
            .get(&key)
            .copied()
            .filter(|id| self.get(*id).map(FrameRecord::is_alive).unwrap_or(false))
    }

    fn activate(&mut self, id: FrameId, renderer: &mut dyn Renderer) {
        if self.active == Some(id) {
            return;
        }
        if !self.get(id).map(FrameRecord::is_alive).unwrap_or(false) {
            debug!(%id, "activate target gone, ignoring");
            return;
        }
        self.deactivate_current(renderer);
        if let Some(record) = self.get_mut(id) {
            record.lifecycle = LifecycleState::Active;
        }
        renderer.activate(id);
        self.active = Some(id);
        // Arms the arbiter race guard: a transient visibility crossing of
        // another frame must not override this explicit choice.
        self.expected_active = Some(id);
        self.bus.publish(&Notice::FrameActivated { id });
    }

    fn close(
        &mut self,
        id: FrameId,
        fallback: Option<FrameId>,
        renderer: &mut dyn Renderer,
    ) -> Result<(), FrameError> {
        let Some(index) = self.position(id) else {
            debug!(%id, "close target gone, ignoring");
            return Ok(());
        };
        if self.frames[index].is_homescreen() {
            error!(%id, "refusing to close the homescreen frame");
            return Err(FrameError::HomescreenClose);
        }

        // Unsplit the pair: the sibling becomes a normal frame again.
        if let Some(link) = self.frames[index].split {
            if let Some(sibling) = self.get_mut(link.sibling) {
                sibling.split = None;
            }
        }

        let was_active = self.active == Some(id);
        let previous = self.frames[index].previous_frame;
        let kind = self.frames[index].kind;

        self.frames[index].lifecycle = LifecycleState::Closing;
        renderer.destroy_surface(id);
        self.frames[index].lifecycle = LifecycleState::Destroyed;
        self.frames.remove(index);
        self.reuse_index.retain(|_, v| *v != id);
        if was_active {
            self.active = None;
        }
        if self.expected_active == Some(id) {
            self.expected_active = None;
        }

        if was_active || fallback.is_some() {
            let return_to_caller = matches!(
                kind,
                FrameKind::Activity {
                    disposition: Disposition::Inline
                }
            );
            let target = fallback
                .filter(|t| self.get(*t).is_some_and(FrameRecord::is_alive))
                .or_else(|| {
                    previous
                        .filter(|_| return_to_caller)
                        .filter(|t| self.get(*t).is_some_and(FrameRecord::is_alive))
                })
                .or_else(|| self.homescreen());
            if let Some(target) = target {
                self.activate(target, renderer);
            }
        }

        debug!(%id, "frame closed");
        self.bus.publish(&Notice::FrameClosed { id });
        self.publish_frame_list();
        Ok(())
    }

    fn split_screen(
        &mut self,
        id: FrameId,
        renderer: &mut dyn Renderer,
    ) -> Result<FrameId, FrameError> {
        let record = self.get(id).ok_or(FrameError::NotFound(id))?;
        if record.is_homescreen() {
            error!(%id, "refusing to split the homescreen frame");
            return Err(FrameError::HomescreenSplit);
        }
        if record.split.is_some() {
            error!(%id, "refusing to split an already split frame");
            return Err(FrameError::AlreadySplit(id));
        }

        let sibling = self.create(
            "about:blank",
            FrameConfig {
                kind: FrameKind::Normal,
                activate: false,
                private_browsing: false,
                previous_frame: Some(id),
                manifest_url: None,
                insert_after: Some(id),
            },
            renderer,
        )?;

        if let Some(source) = self.get_mut(id) {
            source.split = Some(SplitLink {
                side: SplitSide::Left,
                sibling,
            });
        }
        if let Some(new_frame) = self.get_mut(sibling) {
            new_frame.split = Some(SplitLink {
                side: SplitSide::Right,
                sibling: id,
            });
        }

        self.activate(sibling, renderer);
        Ok(sibling)
    }

    fn get(&self, id: FrameId) -> Option<&FrameRecord> {
        self.frames.iter().find(|f| f.id == id)
    }

    fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn active_frame(&self) -> Option<FrameId> {
        self.active
    }

    fn homescreen(&self) -> Option<FrameId> {
        self.frames.iter().find(|f| f.is_homescreen()).map(|f| f.id)
    }

    fn taskbar_frames(&self) -> Vec<FrameSummary> {
        self.frames
            .iter()
            .filter(|f| self.taskbar_eligible(f))
            .map(|f| FrameSummary {
                id: f.id,
                title: f.state.title.clone(),
                icon: f.state.icon.clone(),
                url: f.state.url.clone(),
                is_playing_audio: f.state.is_playing_audio,
                audio_muted: f.state.audio_muted,
            })
            .collect()
    }
}
