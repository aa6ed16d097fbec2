//! Shell core for frameshell.
//!
//! Central struct holding all managers, wired to a single command queue.
//! User commands, visibility batches, and capture completions all arrive
//! as a `Command` and run to completion before the next one starts, so the
//! managers need no locking discipline beyond "one operation at a time".
//! Failures are handled here: refused operations are logged and degrade to
//! no-ops, never propagated.

use std::rc::Rc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::managers::carousel_manager::CarouselManager;
use crate::managers::frame_manager::{FrameManager, FrameManagerTrait};
use crate::managers::input_manager::{InputManager, InputManagerTrait};
use crate::managers::visibility_arbiter::VisibilityArbiter;
use crate::services::event_bus::EventBus;
use crate::services::renderer::Renderer;
use crate::types::command::{Command, Notice, StateChange};
use crate::types::frame::{FrameConfig, FrameId, FrameKind};
use crate::types::input::{KeyEvent, PointerEvent};
use crate::types::settings::ShellSettings;

/// Creates the shell's command queue. The sender side goes to collaborators
/// (and to the renderer, which posts capture completions through it).
pub fn shell_queue() -> (UnboundedSender<Command>, UnboundedReceiver<Command>) {
    mpsc::unbounded_channel()
}

/// Cloneable posting handle onto the shell's command queue.
#[derive(Clone)]
pub struct ShellHandle {
    tx: UnboundedSender<Command>,
}

impl ShellHandle {
    /// Enqueues a command. Returns false once the shell has shut down.
    pub fn post(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// The shell core: frame store, visibility arbiter, overview controller,
/// and input decoder behind one cooperative command queue.
pub struct Shell {
    settings: ShellSettings,
    bus: Rc<EventBus>,
    renderer: Box<dyn Renderer>,
    frames: FrameManager,
    arbiter: VisibilityArbiter,
    carousel: CarouselManager,
    input: InputManager,
    tx: UnboundedSender<Command>,
    rx: UnboundedReceiver<Command>,
    desktop_mode: bool,
    screen_locked: bool,
}

impl Shell {
    pub fn new(
        settings: ShellSettings,
        renderer: Box<dyn Renderer>,
        bus: Rc<EventBus>,
        tx: UnboundedSender<Command>,
        rx: UnboundedReceiver<Command>,
    ) -> Self {
        let frames = FrameManager::new(
            Rc::clone(&bus),
            settings.general.system_url_prefix.clone(),
            settings.general.first_run_done,
        );
        let arbiter = VisibilityArbiter::new(&settings.visibility);
        let carousel = CarouselManager::new(&settings.carousel, settings.general.desktop_mode);
        let input = InputManager::new(&settings.gestures, settings.carousel.scroll_step);
        let desktop_mode = settings.general.desktop_mode;

        Self {
            settings,
            bus,
            renderer,
            frames,
            arbiter,
            carousel,
            input,
            tx,
            rx,
            desktop_mode,
            screen_locked: false,
        }
    }

    /// Startup sequence: create and activate the homescreen frame.
    pub fn startup(&mut self) {
        let url = self.settings.general.homescreen_url.clone();
        let config = FrameConfig {
            kind: FrameKind::Homescreen,
            activate: true,
            ..FrameConfig::default()
        };
        info!(url, "starting shell, creating homescreen");
        self.open_frame(&url, config);
    }

    pub fn handle(&self) -> ShellHandle {
        ShellHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn frames(&self) -> &FrameManager {
        &self.frames
    }

    pub fn carousel(&self) -> &CarouselManager {
        &self.carousel
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.input.set_viewport(width, height);
    }

    /// Drains the command queue until shutdown or all senders are gone.
    pub async fn run(&mut self) {
        while let Some(command) = self.rx.recv().await {
            if matches!(command, Command::Shutdown) {
                info!("shell shutting down");
                break;
            }
            self.dispatch(command);
        }
    }

    /// Processes everything already queued, then returns. Capture
    /// completions posted by the renderer mid-dispatch are included.
    pub fn drain(&mut self) {
        while let Ok(command) = self.rx.try_recv() {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.dispatch(command);
        }
    }

    /// Decodes a key event and dispatches whatever commands fall out.
    pub fn on_key(&mut self, event: KeyEvent) {
        for command in self.input.on_key(event) {
            self.dispatch(command);
        }
    }

    pub fn on_pointer(&mut self, event: PointerEvent) {
        for command in self.input.on_pointer(event) {
            self.dispatch(command);
        }
    }

    /// Runs one command to completion.
    pub fn dispatch(&mut self, command: Command) {
        match command {
            Command::OpenFrame { url, config } => {
                self.open_frame(&url, config);
            }
            Command::NewFrame => {
                let url = self.settings.general.new_frame_url.clone();
                self.open_frame(&url, FrameConfig::default());
            }
            Command::ActivateFrame(id) => self.activate_frame(id),
            Command::ActivateAt(position) => {
                if let Some(id) = self.frames.frame_at_position(position) {
                    self.activate_frame(id);
                }
            }
            Command::ActivateLast => {
                if let Some(id) = self.frames.last_frame() {
                    self.activate_frame(id);
                }
            }
            Command::ActivateNeighbor { forward } => {
                if let Some(id) = self.frames.neighbor_of_active(forward) {
                    self.activate_frame(id);
                }
            }
            Command::CloseFrame { id, fallback } => {
                if let Some(target) = id.or_else(|| self.frames.active_frame()) {
                    self.close_frame(target, fallback);
                }
            }
            Command::GoBack => {
                if let Some(id) = self.frames.active_frame() {
                    self.renderer.go_back(id);
                }
            }
            Command::GoForward => {
                if let Some(id) = self.frames.active_frame() {
                    self.renderer.go_forward(id);
                }
            }
            Command::GoHome => {
                if let Some(home) = self.frames.homescreen() {
                    self.activate_frame(home);
                }
            }
            Command::AndroidBack => self.android_back(),
            Command::Reload { forced } => {
                if let Some(id) = self.frames.active_frame() {
                    self.renderer.reload(id, forced);
                }
            }
            Command::ZoomIn => {
                if let Some(id) = self.frames.active_frame() {
                    self.renderer.zoom_in(id);
                }
            }
            Command::ZoomOut => {
                if let Some(id) = self.frames.active_frame() {
                    self.renderer.zoom_out(id);
                }
            }
            Command::ZoomReset => {
                if let Some(id) = self.frames.active_frame() {
                    self.renderer.zoom_reset(id);
                }
            }
            Command::ToggleMute => {
                if let Some(id) = self.frames.active_frame() {
                    let muted = self.renderer.toggle_muted(id);
                    self.frames
                        .apply_state_change(id, StateChange::AudioMuted(muted));
                    self.frames.publish_frame_list();
                }
            }
            Command::OpenCarousel => self.open_carousel(),
            Command::CloseCarousel => self.close_carousel(),
            Command::CarouselStep { backwards } => self.carousel.step(backwards),
            Command::CarouselCommit => self.commit_carousel(),
            Command::CarouselDismiss(id) => self.close_frame(id, None),
            Command::CarouselScroll { delta } => self.carousel.scroll_by(delta),
            Command::SplitScreen { id } => {
                if let Some(target) = id.or_else(|| self.frames.active_frame()) {
                    if let Err(e) = self.frames.split_screen(target, self.renderer.as_mut()) {
                        debug!(error = %e, "split refused");
                    }
                }
            }
            Command::ScreenOff | Command::LockscreenLocked => self.lock_screen(),
            Command::LockscreenUnlocked => self.unlock_screen(),
            Command::DesktopModeChanged(enabled) => {
                self.desktop_mode = enabled;
                self.carousel.set_desktop_mode(enabled);
                self.input
                    .set_overview_state(self.carousel.is_engaged(), enabled);
                self.bus.publish(&Notice::DesktopModeChanged { enabled });
            }
            Command::SetupComplete => self.frames.mark_setup_complete(),
            Command::VisibilityBatch(updates) => {
                self.arbiter
                    .apply_batch(&updates, &mut self.frames, self.renderer.as_mut());
            }
            Command::ScreenshotReady {
                id,
                generation,
                image,
            } => self.carousel.on_screenshot(id, generation, image),
            Command::FrameStateChanged { id, change } => {
                if self.frames.apply_state_change(id, change) {
                    self.frames.publish_frame_list();
                }
            }
            Command::Shutdown => {}
        }
    }

    /// Opens a frame at `url`, reusing an existing one when the url and
    /// privacy mode match. An open overview is torn down before a reused
    /// frame is activated.
    pub fn open_frame(&mut self, url: &str, config: FrameConfig) -> Option<FrameId> {
        if let Some(existing) = self.frames.find_reusable(url, config.private_browsing) {
            debug!(%existing, url, "reusing existing frame");
            if self.carousel.is_engaged() {
                self.close_carousel();
            }
            if config.activate {
                self.frames.activate(existing, self.renderer.as_mut());
            }
            return Some(existing);
        }

        let activate = config.activate;
        match self.frames.create(url, config, self.renderer.as_mut()) {
            Ok(id) => {
                if self.carousel.is_engaged() {
                    self.close_carousel();
                }
                if activate {
                    self.frames.activate(id, self.renderer.as_mut());
                }
                Some(id)
            }
            // Already logged by the store; creation refusals return no handle.
            Err(_) => None,
        }
    }

    fn activate_frame(&mut self, id: FrameId) {
        if self.carousel.is_engaged() {
            self.close_carousel();
        }
        self.frames.activate(id, self.renderer.as_mut());
    }

    fn close_frame(&mut self, id: FrameId, fallback: Option<FrameId>) {
        if self
            .frames
            .close(id, fallback, self.renderer.as_mut())
            .is_ok()
            && self.carousel.is_engaged()
            && self.carousel.dismiss(id)
        {
            // Last frame entry gone; the overview closes itself.
            self.close_carousel();
        }
    }

    /// Android-style back: closes the active non-homescreen frame and
    /// returns to the homescreen; on the homescreen it is a history back.
    fn android_back(&mut self) {
        let Some(active) = self.frames.active_frame() else {
            return;
        };
        if Some(active) == self.frames.homescreen() {
            self.renderer.go_back(active);
        } else {
            self.close_frame(active, None);
        }
    }

    fn open_carousel(&mut self) {
        if self.carousel.is_engaged() {
            return;
        }
        let home = self.frames.homescreen();
        let previous = self.frames.active_frame().filter(|id| Some(*id) != home);
        // The overview always sits on a homescreen background; switch
        // instantly before building the snapshot.
        if previous.is_some() {
            if let Some(home) = home {
                self.frames.activate(home, self.renderer.as_mut());
            }
        }
        self.carousel
            .open(&self.frames, self.renderer.as_mut(), previous);
        self.sync_arbiter_suspension();
        self.input.set_overview_state(true, self.desktop_mode);
    }

    fn close_carousel(&mut self) {
        if !self.carousel.is_engaged() {
            return;
        }
        self.carousel.close();
        self.sync_arbiter_suspension();
        self.arbiter
            .ensure_active(&mut self.frames, self.renderer.as_mut());
        self.input.set_overview_state(false, self.desktop_mode);
    }

    fn commit_carousel(&mut self) {
        if let Some(target) = self.carousel.commit_target() {
            self.frames.activate(target, self.renderer.as_mut());
        }
        self.close_carousel();
    }

    fn lock_screen(&mut self) {
        if self.screen_locked {
            return;
        }
        self.screen_locked = true;
        self.frames.suspend_active(self.renderer.as_mut());
        self.sync_arbiter_suspension();
    }

    fn unlock_screen(&mut self) {
        if !self.screen_locked {
            return;
        }
        self.screen_locked = false;
        self.frames.resume_active(self.renderer.as_mut());
        self.sync_arbiter_suspension();
    }

    fn sync_arbiter_suspension(&mut self) {
        self.arbiter
            .set_suspended(self.carousel.is_engaged() || self.screen_locked);
    }
}
