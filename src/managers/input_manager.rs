//! Command/gesture layer for frameshell.
//!
//! A stateful decoder turning chorded keyboard input and pointer gestures
//! into abstract shell commands. Tracks modifier state as independent
//! booleans, runs the Modifier+Tab switching session, and recognizes edge
//! swipes. Emits `Command` values only; navigation history lives with the
//! rendering collaborator, never here.

use tracing::debug;

use crate::types::command::Command;
use crate::types::input::{Key, KeyEvent, KeyPhase, PointerEvent};
use crate::types::settings::GestureSettings;

/// Trait defining the input decoding operations.
pub trait InputManagerTrait {
    fn on_key(&mut self, event: KeyEvent) -> Vec<Command>;
    fn on_pointer(&mut self, event: PointerEvent) -> Vec<Command>;
    /// The shell mirrors overview state into the decoder so Escape/Enter
    /// and directional keys route correctly.
    fn set_overview_state(&mut self, open: bool, wide_layout: bool);
    fn set_viewport(&mut self, width: f64, height: f64);
}

#[derive(Debug, Clone, Copy)]
struct GestureTracker {
    origin: (f64, f64),
    last: (f64, f64),
    start_ms: u64,
}

/// Keyboard/pointer decoder with chord and edge-swipe state.
pub struct InputManager {
    primary: bool,
    shift: bool,
    alt: bool,
    /// A Modifier+Tab switching session is in progress; releasing the
    /// primary modifier commits it.
    switching: bool,
    overview_open: bool,
    wide_layout: bool,
    scroll_step: f64,
    viewport: (f64, f64),
    gesture: Option<GestureTracker>,
    last_commit_ms: Option<u64>,
    max_duration_ms: u64,
    commit_debounce_ms: u64,
    min_travel: f64,
    edge_fraction: f64,
}

impl InputManager {
    pub fn new(settings: &GestureSettings, scroll_step: f64) -> Self {
        Self {
            primary: false,
            shift: false,
            alt: false,
            switching: false,
            overview_open: false,
            wide_layout: false,
            scroll_step,
            viewport: (1.0, 1.0),
            gesture: None,
            last_commit_ms: None,
            max_duration_ms: settings.max_duration_ms,
            commit_debounce_ms: settings.commit_debounce_ms,
            min_travel: settings.min_travel,
            edge_fraction: settings.edge_fraction,
        }
    }

    pub fn is_switching(&self) -> bool {
        self.switching
    }

    fn on_tab(&mut self) -> Vec<Command> {
        if !self.primary {
            return Vec::new();
        }
        if !self.switching {
            self.switching = true;
            if !self.overview_open {
                // Opening seeds the cursor at the active frame's entry.
                return vec![Command::OpenCarousel];
            }
            return Vec::new();
        }
        vec![Command::CarouselStep {
            backwards: self.shift,
        }]
    }

    fn on_digit(&self, digit: u8) -> Vec<Command> {
        if !self.primary {
            return Vec::new();
        }
        match digit {
            1..=8 => vec![Command::ActivateAt(digit as usize)],
            9 => vec![Command::ActivateLast],
            _ => Vec::new(),
        }
    }

    fn on_arrow(&self, key: Key) -> Vec<Command> {
        if self.overview_open && self.wide_layout {
            return match key {
                Key::ArrowLeft => vec![Command::CarouselScroll {
                    delta: -self.scroll_step,
                }],
                Key::ArrowRight => vec![Command::CarouselScroll {
                    delta: self.scroll_step,
                }],
                _ => Vec::new(),
            };
        }
        if self.alt {
            return match key {
                Key::ArrowLeft => vec![Command::GoBack],
                Key::ArrowRight => vec![Command::GoForward],
                _ => Vec::new(),
            };
        }
        Vec::new()
    }

    fn on_chord_char(&self, c: char) -> Vec<Command> {
        if !self.primary {
            return Vec::new();
        }
        match c {
            'w' => vec![Command::CloseFrame {
                id: None,
                fallback: None,
            }],
            'r' => vec![Command::Reload { forced: self.shift }],
            't' => vec![Command::NewFrame],
            'm' => vec![Command::ToggleMute],
            's' if self.shift => vec![Command::SplitScreen { id: None }],
            '=' | '+' => vec![Command::ZoomIn],
            '-' => vec![Command::ZoomOut],
            '0' => vec![Command::ZoomReset],
            _ => Vec::new(),
        }
    }

    /// Classifies a completed swipe into a command, if any.
    fn finish_gesture(&mut self, x: f64, y: f64, ms: u64) -> Vec<Command> {
        let Some(mut tracker) = self.gesture.take() else {
            return Vec::new();
        };
        tracker.last = (x, y);
        let (width, height) = self.viewport;
        if width <= 0.0 || height <= 0.0 {
            return Vec::new();
        }
        if ms.saturating_sub(tracker.start_ms) > self.max_duration_ms {
            debug!("gesture expired, discarding");
            return Vec::new();
        }
        if let Some(last) = self.last_commit_ms {
            if ms.saturating_sub(last) < self.commit_debounce_ms {
                return Vec::new();
            }
        }

        let dx = (tracker.last.0 - tracker.origin.0) / width;
        let dy = (tracker.last.1 - tracker.origin.1) / height;
        let (ox, oy) = tracker.origin;

        let from_bottom = oy >= height * (1.0 - self.edge_fraction);
        let from_left = ox <= width * self.edge_fraction;
        let from_right = ox >= width * (1.0 - self.edge_fraction);

        let command = if from_bottom && -dy >= self.min_travel {
            if self.overview_open {
                Some(Command::CloseCarousel)
            } else {
                Some(Command::OpenCarousel)
            }
        } else if from_left && dx >= self.min_travel {
            Some(Command::ActivateNeighbor { forward: false })
        } else if from_right && -dx >= self.min_travel {
            Some(Command::ActivateNeighbor { forward: true })
        } else {
            None
        };

        match command {
            Some(command) => {
                self.last_commit_ms = Some(ms);
                vec![command]
            }
            None => Vec::new(),
        }
    }
}

impl InputManagerTrait for InputManager {
    fn on_key(&mut self, event: KeyEvent) -> Vec<Command> {
        match (event.key, event.phase) {
            (Key::Primary, KeyPhase::Pressed) => {
                self.primary = true;
                Vec::new()
            }
            (Key::Primary, KeyPhase::Released) => {
                self.primary = false;
                if self.switching {
                    self.switching = false;
                    return vec![Command::CarouselCommit];
                }
                Vec::new()
            }
            (Key::Shift, phase) => {
                self.shift = phase == KeyPhase::Pressed;
                Vec::new()
            }
            (Key::Alt, phase) => {
                self.alt = phase == KeyPhase::Pressed;
                Vec::new()
            }
            (_, KeyPhase::Released) => Vec::new(),
            (Key::Tab, KeyPhase::Pressed) => self.on_tab(),
            (Key::Enter, KeyPhase::Pressed) => {
                if self.overview_open {
                    self.switching = false;
                    return vec![Command::CarouselCommit];
                }
                Vec::new()
            }
            (Key::Escape, KeyPhase::Pressed) => {
                if self.overview_open {
                    self.switching = false;
                    return vec![Command::CloseCarousel];
                }
                Vec::new()
            }
            (Key::Home, KeyPhase::Pressed) => vec![Command::GoHome],
            (Key::Back, KeyPhase::Pressed) => vec![Command::AndroidBack],
            (Key::Digit(d), KeyPhase::Pressed) => self.on_digit(d),
            (
                key @ (Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown),
                KeyPhase::Pressed,
            ) => self.on_arrow(key),
            (Key::Char(c), KeyPhase::Pressed) => self.on_chord_char(c),
        }
    }

    fn on_pointer(&mut self, event: PointerEvent) -> Vec<Command> {
        match event {
            PointerEvent::Down { x, y, ms } => {
                self.gesture = Some(GestureTracker {
                    origin: (x, y),
                    last: (x, y),
                    start_ms: ms,
                });
                Vec::new()
            }
            PointerEvent::Move { x, y, .. } => {
                if let Some(tracker) = self.gesture.as_mut() {
                    tracker.last = (x, y);
                }
                Vec::new()
            }
            PointerEvent::Up { x, y, ms } => self.finish_gesture(x, y, ms),
        }
    }

    fn set_overview_state(&mut self, open: bool, wide_layout: bool) {
        self.overview_open = open;
        self.wide_layout = wide_layout;
        if !open {
            self.switching = false;
        }
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }
}
