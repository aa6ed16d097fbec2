use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque frame identifier, allocated monotonically and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// What a frame fundamentally is. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    /// The designated, non-closable default frame.
    Homescreen,
    /// Captive-portal login surface; exempt from the first-run gate.
    CaptivePortal,
    /// An ordinary application surface.
    Normal,
    /// An activity opened on behalf of another frame.
    Activity { disposition: Disposition },
}

/// Presentation disposition for activity frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    Normal,
    Inline,
    Fullscreen,
    Attention,
}

/// Which half of the viewport a split frame occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitSide {
    Left,
    Right,
}

impl SplitSide {
    pub fn complement(self) -> SplitSide {
        match self {
            SplitSide::Left => SplitSide::Right,
            SplitSide::Right => SplitSide::Left,
        }
    }
}

/// Split-pair membership. The sibling is referenced by id, never owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLink {
    pub side: SplitSide,
    pub sibling: FrameId,
}

/// Lifecycle of a managed frame.
///
/// Transitions: Opening→Active|Inactive, Active↔Inactive,
/// (Active|Inactive)→Closing→Destroyed. Nothing skips Closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    Opening,
    Active,
    Inactive,
    Closing,
    Destroyed,
}

/// Creation-time parameters for a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub kind: FrameKind,
    /// Activate the frame once created.
    pub activate: bool,
    pub private_browsing: bool,
    /// Weak back-reference to the frame that requested this one.
    pub previous_frame: Option<FrameId>,
    /// Manifest backing an installed app, if any.
    pub manifest_url: Option<String>,
    /// Insert immediately after this frame instead of at the end.
    pub insert_after: Option<FrameId>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            kind: FrameKind::Normal,
            activate: true,
            private_browsing: false,
            previous_frame: None,
            manifest_url: None,
            insert_after: None,
        }
    }
}

/// Mutable per-frame state, updated by the rendering collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub title: String,
    pub icon: Option<String>,
    pub url: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub background_color: Option<String>,
    pub is_playing_audio: bool,
    pub audio_muted: bool,
    pub is_private_browsing: bool,
}

/// One managed surface and its metadata.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    pub id: FrameId,
    /// Identity used for reuse-dedupe; the url the frame was started at.
    pub source_url: String,
    pub kind: FrameKind,
    pub split: Option<SplitLink>,
    pub previous_frame: Option<FrameId>,
    pub manifest_url: Option<String>,
    pub state: FrameState,
    /// Last reported fraction of the frame visible in the viewport.
    pub visibility_ratio: f64,
    pub lifecycle: LifecycleState,
}

impl FrameRecord {
    pub fn is_homescreen(&self) -> bool {
        matches!(self.kind, FrameKind::Homescreen)
    }

    /// Not yet transitioned to Closing or Destroyed.
    pub fn is_alive(&self) -> bool {
        !matches!(
            self.lifecycle,
            LifecycleState::Closing | LifecycleState::Destroyed
        )
    }
}

/// Taskbar-facing projection of a frame, carried by `update-frame-list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub id: FrameId,
    pub title: String,
    pub icon: Option<String>,
    pub url: String,
    pub is_playing_audio: bool,
    pub audio_muted: bool,
}
