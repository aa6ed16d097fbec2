//! Overview (carousel) controller for frameshell.
//!
//! Builds an ephemeral, screenshot-backed snapshot of all non-homescreen
//! frames for visual switching. Captures are requested fire-and-forget and
//! complete as commands on the shell queue; the snapshot reveals only once
//! every capture has resolved. A generation counter makes completions that
//! arrive late, for a cancelled open, or for a previous snapshot inert.
//!
//! Capture handles are owned here and released exactly once: release
//! consumes the handle, and the ledger's live count is observable so leaks
//! show up in tests.

use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::managers::frame_manager::{FrameManager, FrameManagerTrait};
use crate::services::renderer::Renderer;
use crate::types::command::ImageBlob;
use crate::types::frame::FrameId;
use crate::types::settings::CarouselSettings;

/// A captured screenshot, tracked by the ledger. Deliberately not `Clone`;
/// releasing moves the handle back into the ledger.
#[derive(Debug)]
pub struct CaptureHandle {
    id: Uuid,
    pub image: ImageBlob,
}

/// Allocation registry for capture handles.
#[derive(Debug, Default)]
pub struct CaptureLedger {
    live: HashSet<Uuid>,
    total_allocated: u64,
}

impl CaptureLedger {
    pub fn allocate(&mut self, image: ImageBlob) -> CaptureHandle {
        let id = Uuid::new_v4();
        self.live.insert(id);
        self.total_allocated += 1;
        CaptureHandle { id, image }
    }

    pub fn release(&mut self, handle: CaptureHandle) {
        self.live.remove(&handle.id);
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn total_allocated(&self) -> u64 {
        self.total_allocated
    }
}

/// What a snapshot entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTarget {
    Frame(FrameId),
    /// Synthetic trailing entry that opens a fresh frame when chosen.
    NewFrame,
}

#[derive(Debug)]
pub struct CarouselEntry {
    pub target: EntryTarget,
    /// `None` until the capture resolves, or permanently for failed
    /// captures (rendered as a placeholder).
    pub handle: Option<CaptureHandle>,
    pub position: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum CarouselPhase {
    Closed,
    /// Captures outstanding; the overview surface stays hidden.
    Pending,
    Open,
}

/// Layout of the revealed overview, in viewport fractions. No pixels here.
#[derive(Debug, Clone, PartialEq)]
pub enum CarouselLayout {
    /// Two-column vertical grid; scrolls past two rows.
    Compact { rows: usize, scrollable: bool },
    /// Horizontal track with a margin pseudo-column on each side and the
    /// selected screenshot centered.
    Wide {
        margin_fraction: f64,
        slot_width: f64,
        track_length: f64,
        scroll_offset: f64,
        max_scroll: f64,
    },
}

pub struct CarouselManager {
    phase: CarouselPhase,
    entries: Vec<CarouselEntry>,
    waiting: HashSet<FrameId>,
    /// Cursor over frame entries (the synthetic entry is not selectable).
    cursor: usize,
    generation: u64,
    scroll_offset: f64,
    desktop_mode: bool,
    margin_fraction: f64,
    scroll_step: f64,
    ledger: CaptureLedger,
}

impl CarouselManager {
    pub fn new(settings: &CarouselSettings, desktop_mode: bool) -> Self {
        Self {
            phase: CarouselPhase::Closed,
            entries: Vec::new(),
            waiting: HashSet::new(),
            cursor: 0,
            generation: 0,
            scroll_offset: 0.0,
            desktop_mode,
            margin_fraction: settings.margin_fraction,
            scroll_step: settings.scroll_step,
            ledger: CaptureLedger::default(),
        }
    }

    /// Open or pending. While pending the overview already swallows input.
    pub fn is_engaged(&self) -> bool {
        self.phase != CarouselPhase::Closed
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == CarouselPhase::Open
    }

    pub fn entries(&self) -> &[CarouselEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn ledger(&self) -> &CaptureLedger {
        &self.ledger
    }

    fn frame_entry_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.target, EntryTarget::Frame(_)))
            .count()
    }

    /// Builds the snapshot and requests one capture per frame entry.
    ///
    /// Idempotent: a second open while pending or open is a no-op. `resume`
    /// names the previously active frame whose entry gets the cursor.
    pub fn open(
        &mut self,
        store: &FrameManager,
        renderer: &mut dyn Renderer,
        resume: Option<FrameId>,
    ) {
        if self.is_engaged() {
            return;
        }
        self.generation += 1;
        self.entries.clear();
        self.waiting.clear();

        for record in store
            .frames()
            .iter()
            .filter(|f| !f.is_homescreen() && f.is_alive())
        {
            let position = self.entries.len();
            self.entries.push(CarouselEntry {
                target: EntryTarget::Frame(record.id),
                handle: None,
                position,
            });
            self.waiting.insert(record.id);
        }
        let position = self.entries.len();
        self.entries.push(CarouselEntry {
            target: EntryTarget::NewFrame,
            handle: None,
            position,
        });

        self.cursor = resume
            .and_then(|id| {
                self.entries
                    .iter()
                    .position(|e| e.target == EntryTarget::Frame(id))
            })
            .unwrap_or(0);

        for entry in &self.entries {
            if let EntryTarget::Frame(id) = entry.target {
                renderer.request_screenshot(id, self.generation);
            }
        }

        if self.waiting.is_empty() {
            self.reveal();
        } else {
            self.phase = CarouselPhase::Pending;
            debug!(
                outstanding = self.waiting.len(),
                "overview pending capture completion"
            );
        }
    }

    /// Accepts a capture completion. Stale generations and completions for
    /// a closed snapshot never allocate a handle, so there is nothing to
    /// leak; failed captures leave the placeholder in place.
    pub fn on_screenshot(&mut self, id: FrameId, generation: u64, image: Option<ImageBlob>) {
        if generation != self.generation || self.phase != CarouselPhase::Pending {
            debug!(%id, generation, "discarding stale capture");
            return;
        }
        if !self.waiting.remove(&id) {
            return;
        }
        match image {
            Some(blob) => {
                let handle = self.ledger.allocate(blob);
                if let Some(entry) = self
                    .entries
                    .iter_mut()
                    .find(|e| e.target == EntryTarget::Frame(id))
                {
                    entry.handle = Some(handle);
                } else {
                    self.ledger.release(handle);
                }
            }
            None => warn!(%id, "capture failed, keeping placeholder"),
        }
        if self.waiting.is_empty() {
            self.reveal();
        }
    }

    fn reveal(&mut self) {
        self.phase = CarouselPhase::Open;
        self.scroll_offset = self.centered_offset(self.cursor);
        debug!(entries = self.entries.len(), "overview revealed");
    }

    /// Tears the snapshot down, releasing every allocated handle exactly
    /// once. Closing while pending cancels the reveal.
    pub fn close(&mut self) {
        if !self.is_engaged() {
            return;
        }
        for mut entry in self.entries.drain(..) {
            if let Some(handle) = entry.handle.take() {
                self.ledger.release(handle);
            }
        }
        self.waiting.clear();
        self.cursor = 0;
        self.scroll_offset = 0.0;
        self.phase = CarouselPhase::Closed;
        debug!("overview closed");
    }

    /// Moves the cursor with wraparound over the frame entries.
    pub fn step(&mut self, backwards: bool) {
        let count = self.frame_entry_count();
        if !self.is_engaged() || count == 0 {
            return;
        }
        self.cursor = if backwards {
            (self.cursor + count - 1) % count
        } else {
            (self.cursor + 1) % count
        };
        if self.is_revealed() {
            self.scroll_offset = self.centered_offset(self.cursor);
        }
    }

    /// The frame the cursor currently selects.
    pub fn commit_target(&self) -> Option<FrameId> {
        self.entries
            .get(self.cursor)
            .and_then(|entry| match entry.target {
                EntryTarget::Frame(id) => Some(id),
                EntryTarget::NewFrame => None,
            })
    }

    /// Removes one frame's entry (user dismissed it from the overview).
    /// Returns true when no frame entries remain and the overview should
    /// close itself.
    pub fn dismiss(&mut self, id: FrameId) -> bool {
        if !self.is_engaged() {
            return false;
        }
        if let Some(index) = self
            .entries
            .iter()
            .position(|e| e.target == EntryTarget::Frame(id))
        {
            let mut entry = self.entries.remove(index);
            if let Some(handle) = entry.handle.take() {
                self.ledger.release(handle);
            }
            self.waiting.remove(&id);
            for (position, entry) in self.entries.iter_mut().enumerate() {
                entry.position = position;
            }
            let count = self.frame_entry_count();
            if count > 0 && self.cursor >= count {
                self.cursor = count - 1;
            }
            if self.phase == CarouselPhase::Pending && self.waiting.is_empty() {
                self.reveal();
            }
        }
        self.frame_entry_count() == 0
    }

    /// View-scroll nicety for the wide track; does not move the cursor.
    pub fn scroll_by(&mut self, delta: f64) {
        if !self.is_revealed() || !self.desktop_mode {
            return;
        }
        let max = self.max_scroll();
        self.scroll_offset = (self.scroll_offset + delta).clamp(0.0, max);
    }

    pub fn scroll_step(&self) -> f64 {
        self.scroll_step
    }

    pub fn set_desktop_mode(&mut self, desktop_mode: bool) {
        self.desktop_mode = desktop_mode;
        if self.is_revealed() {
            self.scroll_offset = self.centered_offset(self.cursor);
        }
    }

    fn slot_width(&self) -> f64 {
        1.0 - 2.0 * self.margin_fraction
    }

    fn centered_offset(&self, index: usize) -> f64 {
        if !self.desktop_mode {
            return 0.0;
        }
        (self.slot_width() * index as f64).clamp(0.0, self.max_scroll())
    }

    fn max_scroll(&self) -> f64 {
        let count = self.entries.len();
        if count <= 1 {
            0.0
        } else {
            self.slot_width() * (count - 1) as f64
        }
    }

    pub fn layout(&self) -> CarouselLayout {
        if self.desktop_mode {
            let slot = self.slot_width();
            CarouselLayout::Wide {
                margin_fraction: self.margin_fraction,
                slot_width: slot,
                track_length: 2.0 * self.margin_fraction + slot * self.entries.len() as f64,
                scroll_offset: self.scroll_offset,
                max_scroll: self.max_scroll(),
            }
        } else {
            let rows = self.frame_entry_count().div_ceil(2);
            CarouselLayout::Compact {
                rows,
                scrollable: rows > 2,
            }
        }
    }
}
