use std::fmt;

use crate::types::frame::FrameId;

// === FrameError ===

/// Errors related to frame lifecycle operations.
#[derive(Debug)]
pub enum FrameError {
    /// A homescreen frame already exists; at most one is allowed.
    HomescreenExists,
    /// The homescreen frame cannot be closed.
    HomescreenClose,
    /// The homescreen frame cannot join a split pair.
    HomescreenSplit,
    /// Frame with the given id was not found.
    NotFound(FrameId),
    /// The frame is already part of a split pair.
    AlreadySplit(FrameId),
    /// Frame creation refused until the first-run sequence completes.
    SetupIncomplete(String),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::HomescreenExists => write!(f, "A homescreen frame already exists"),
            FrameError::HomescreenClose => write!(f, "The homescreen frame cannot be closed"),
            FrameError::HomescreenSplit => {
                write!(f, "The homescreen frame cannot be split")
            }
            FrameError::NotFound(id) => write!(f, "Frame not found: {}", id),
            FrameError::AlreadySplit(id) => write!(f, "Frame already split: {}", id),
            FrameError::SetupIncomplete(url) => {
                write!(f, "Frame creation gated until setup completes: {}", url)
            }
        }
    }
}

impl std::error::Error for FrameError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
