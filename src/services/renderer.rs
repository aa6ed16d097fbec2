//! Rendering collaborator contract for frameshell.
//!
//! The shell core never renders content itself; it drives an embedding host
//! through this trait. Screenshot capture is fire-and-forget: the host posts
//! a `Command::ScreenshotReady` back onto the shell's command queue when the
//! capture resolves, tagged with the requesting generation so stale results
//! can be discarded.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::mpsc::UnboundedSender;

use crate::types::command::{Command, ImageBlob};
use crate::types::frame::FrameId;

/// Per-frame operations the embedding host must provide.
pub trait Renderer {
    fn create_surface(&mut self, id: FrameId, url: &str);
    fn destroy_surface(&mut self, id: FrameId);
    fn activate(&mut self, id: FrameId);
    fn deactivate(&mut self, id: FrameId);
    fn go_to(&mut self, id: FrameId, url: &str);
    fn reload(&mut self, id: FrameId, forced: bool);
    fn go_back(&mut self, id: FrameId);
    fn go_forward(&mut self, id: FrameId);
    fn zoom_in(&mut self, id: FrameId);
    fn zoom_out(&mut self, id: FrameId);
    fn zoom_reset(&mut self, id: FrameId);
    /// Toggles audio mute for the frame, returning the new muted state.
    fn toggle_muted(&mut self, id: FrameId) -> bool;
    fn request_screenshot(&mut self, id: FrameId, generation: u64);
}

/// Every renderer call, recorded for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererOp {
    CreateSurface(FrameId, String),
    DestroySurface(FrameId),
    Activate(FrameId),
    Deactivate(FrameId),
    GoTo(FrameId, String),
    Reload(FrameId, bool),
    GoBack(FrameId),
    GoForward(FrameId),
    ZoomIn(FrameId),
    ZoomOut(FrameId),
    ZoomReset(FrameId),
    ToggleMuted(FrameId),
    Screenshot(FrameId, u64),
}

/// Renderer that records operations instead of rendering.
///
/// With `auto_capture` on, every screenshot request is immediately answered
/// with a tiny placeholder blob posted back through the command queue; with
/// it off, the caller delivers `ScreenshotReady` commands by hand, which is
/// how the tests exercise pending/cancelled reveals.
pub struct HeadlessRenderer {
    tx: UnboundedSender<Command>,
    ops: Rc<RefCell<Vec<RendererOp>>>,
    muted: HashMap<FrameId, bool>,
    auto_capture: bool,
}

impl HeadlessRenderer {
    pub fn new(tx: UnboundedSender<Command>) -> Self {
        Self {
            tx,
            ops: Rc::new(RefCell::new(Vec::new())),
            muted: HashMap::new(),
            auto_capture: true,
        }
    }

    pub fn manual_capture(tx: UnboundedSender<Command>) -> Self {
        let mut renderer = Self::new(tx);
        renderer.auto_capture = false;
        renderer
    }

    /// Shared handle onto the recorded operation log.
    pub fn ops_handle(&self) -> Rc<RefCell<Vec<RendererOp>>> {
        Rc::clone(&self.ops)
    }

    fn record(&self, op: RendererOp) {
        self.ops.borrow_mut().push(op);
    }
}

impl Renderer for HeadlessRenderer {
    fn create_surface(&mut self, id: FrameId, url: &str) {
        self.record(RendererOp::CreateSurface(id, url.to_string()));
    }

    fn destroy_surface(&mut self, id: FrameId) {
        self.muted.remove(&id);
        self.record(RendererOp::DestroySurface(id));
    }

    fn activate(&mut self, id: FrameId) {
        self.record(RendererOp::Activate(id));
    }

    fn deactivate(&mut self, id: FrameId) {
        self.record(RendererOp::Deactivate(id));
    }

    fn go_to(&mut self, id: FrameId, url: &str) {
        self.record(RendererOp::GoTo(id, url.to_string()));
    }

    fn reload(&mut self, id: FrameId, forced: bool) {
        self.record(RendererOp::Reload(id, forced));
    }

    fn go_back(&mut self, id: FrameId) {
        self.record(RendererOp::GoBack(id));
    }

    fn go_forward(&mut self, id: FrameId) {
        self.record(RendererOp::GoForward(id));
    }

    fn zoom_in(&mut self, id: FrameId) {
        self.record(RendererOp::ZoomIn(id));
    }

    fn zoom_out(&mut self, id: FrameId) {
        self.record(RendererOp::ZoomOut(id));
    }

    fn zoom_reset(&mut self, id: FrameId) {
        self.record(RendererOp::ZoomReset(id));
    }

    fn toggle_muted(&mut self, id: FrameId) -> bool {
        let muted = self.muted.entry(id).or_insert(false);
        *muted = !*muted;
        let result = *muted;
        self.record(RendererOp::ToggleMuted(id));
        result
    }

    fn request_screenshot(&mut self, id: FrameId, generation: u64) {
        self.record(RendererOp::Screenshot(id, generation));
        if self.auto_capture {
            let _ = self.tx.send(Command::ScreenshotReady {
                id,
                generation,
                image: Some(ImageBlob { data: vec![0; 4] }),
            });
        }
    }
}
