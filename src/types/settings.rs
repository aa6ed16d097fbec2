use serde::{Deserialize, Serialize};

/// Top-level shell settings, persisted as JSON by the settings engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    pub general: GeneralSettings,
    pub visibility: VisibilitySettings,
    pub gestures: GestureSettings,
    pub carousel: CarouselSettings,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            visibility: VisibilitySettings::default(),
            gestures: GestureSettings::default(),
            carousel: CarouselSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Url the homescreen frame is started at.
    pub homescreen_url: String,
    /// Url opened for a blank new frame.
    pub new_frame_url: String,
    /// Urls under this prefix belong to the shell itself.
    pub system_url_prefix: String,
    /// Wide/desktop layout instead of the compact one.
    pub desktop_mode: bool,
    /// When false, frame creation for non-exempt urls is refused until the
    /// first-run sequence posts its completion.
    pub first_run_done: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            homescreen_url: "shell://homescreen".to_string(),
            new_frame_url: "about:newtab".to_string(),
            system_url_prefix: "shell://".to_string(),
            desktop_mode: false,
            first_run_done: true,
        }
    }
}

/// Hysteresis band for visibility arbitration. Frames crossing the high
/// threshold become activation candidates; frames falling under the low one
/// while not active are deactivated. The band in between changes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySettings {
    pub activation_threshold: f64,
    pub deactivation_threshold: f64,
}

impl Default for VisibilitySettings {
    fn default() -> Self {
        Self {
            activation_threshold: 0.75,
            deactivation_threshold: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// A swipe taking longer than this is discarded.
    pub max_duration_ms: u64,
    /// Minimum gap between two committed gestures.
    pub commit_debounce_ms: u64,
    /// Minimum travel, as a fraction of the viewport dimension.
    pub min_travel: f64,
    /// Width of the edge bands that arm edge swipes, as a viewport fraction.
    pub edge_fraction: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            max_duration_ms: 1000,
            commit_debounce_ms: 400,
            min_travel: 0.2,
            edge_fraction: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselSettings {
    /// Width of the margin pseudo-column on each side of the wide track.
    pub margin_fraction: f64,
    /// Track scroll distance per directional keypress, as a viewport fraction.
    pub scroll_step: f64,
}

impl Default for CarouselSettings {
    fn default() -> Self {
        Self {
            margin_fraction: 0.25,
            scroll_step: 0.2,
        }
    }
}
