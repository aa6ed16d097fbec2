/// Keys the command/gesture layer cares about. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The primary chord modifier (Super/Cmd depending on platform).
    Primary,
    Shift,
    Alt,
    Tab,
    Enter,
    Escape,
    Home,
    /// Hardware back button (android-style back, distinct from history back).
    Back,
    Digit(u8),
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Pressed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub phase: KeyPhase,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self { key, phase: KeyPhase::Pressed }
    }

    pub fn released(key: Key) -> Self {
        Self { key, phase: KeyPhase::Released }
    }
}

/// Pointer events in viewport coordinates, timestamped in milliseconds.
///
/// Timestamps are caller-supplied so gesture recognition stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, y: f64, ms: u64 },
    Move { x: f64, y: f64, ms: u64 },
    Up { x: f64, y: f64, ms: u64 },
}
