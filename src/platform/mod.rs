// Frameshell platform abstraction
// Resolves the per-OS configuration directory for the settings engine.

use std::env;
use std::path::PathBuf;

/// Returns the platform-specific configuration directory for frameshell.
///
/// - **Linux**: `$XDG_CONFIG_HOME/frameshell`, otherwise `~/.config/frameshell`
/// - **macOS**: `~/Library/Application Support/Frameshell`
/// - **Windows**: `%APPDATA%/Frameshell`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("frameshell")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
            PathBuf::from(home).join(".config").join("frameshell")
        }
    }
    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join("Frameshell")
    }
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Temp"));
        PathBuf::from(appdata).join("Frameshell")
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let home = env::var("HOME").unwrap_or_else(|_| String::from("/tmp"));
        PathBuf::from(home).join(".frameshell")
    }
}
