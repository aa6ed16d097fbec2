use serde::{Deserialize, Serialize};

use crate::types::frame::{FrameConfig, FrameId, FrameSummary};

/// Opaque captured image bytes. The core never inspects pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub data: Vec<u8>,
}

/// A single per-frame visibility report within a batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityUpdate {
    pub id: FrameId,
    pub ratio: f64,
}

/// One mutable-state field change pushed back by the rendering collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    Title(String),
    Icon(Option<String>),
    Url(String),
    CanGoBack(bool),
    CanGoForward(bool),
    BackgroundColor(Option<String>),
    AudioPlaying(bool),
    AudioMuted(bool),
}

/// Commands consumed by the shell core.
///
/// Everything that used to be a free-running callback in shells of this kind
/// (visibility crossings, capture completions, renderer state pushes) arrives
/// here as an explicit message on the single command queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    OpenFrame { url: String, config: FrameConfig },
    NewFrame,
    ActivateFrame(FrameId),
    /// Activate the frame at a 1-based position among non-homescreen frames.
    ActivateAt(usize),
    ActivateLast,
    /// Edge-swipe switch to the neighboring frame in collection order.
    ActivateNeighbor { forward: bool },
    CloseFrame {
        /// `None` closes the currently active frame.
        id: Option<FrameId>,
        fallback: Option<FrameId>,
    },
    GoBack,
    GoForward,
    GoHome,
    /// Closes the active non-homescreen frame instead of stepping history.
    AndroidBack,
    Reload { forced: bool },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleMute,
    OpenCarousel,
    CloseCarousel,
    CarouselStep { backwards: bool },
    CarouselCommit,
    CarouselDismiss(FrameId),
    CarouselScroll { delta: f64 },
    SplitScreen {
        /// `None` splits the currently active frame.
        id: Option<FrameId>,
    },
    ScreenOff,
    LockscreenLocked,
    LockscreenUnlocked,
    DesktopModeChanged(bool),
    /// First-run sequence finished; lifts the frame-creation gate.
    SetupComplete,
    VisibilityBatch(Vec<VisibilityUpdate>),
    ScreenshotReady {
        id: FrameId,
        generation: u64,
        image: Option<ImageBlob>,
    },
    FrameStateChanged { id: FrameId, change: StateChange },
    Shutdown,
}

/// Notifications produced by the shell core on the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    FrameOpened { id: FrameId, url: String },
    FrameActivated { id: FrameId },
    FrameClosed { id: FrameId },
    FrameListUpdated { frames: Vec<FrameSummary> },
    /// Mode flag forwarded to the homescreen collaborator.
    DesktopModeChanged { enabled: bool },
}
