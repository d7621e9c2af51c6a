// Smart Bookmarks platform paths
// Config and data directories per operating system, selected with `cfg(target_os)`.
//
// - Linux:   $XDG_CONFIG_HOME/smart-bookmarks, $XDG_DATA_HOME/smart-bookmarks
// - macOS:   ~/Library/Application Support/SmartBookmarks
// - Windows: %APPDATA%\SmartBookmarks

use std::env;
use std::path::PathBuf;

fn home_dir() -> PathBuf {
    let var = if cfg!(target_os = "windows") { "USERPROFILE" } else { "HOME" };
    PathBuf::from(env::var(var).unwrap_or_else(|_| String::from("/tmp")))
}

#[cfg(target_os = "linux")]
fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    match env::var(var) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir).join("smart-bookmarks"),
        _ => fallback
            .iter()
            .fold(home_dir(), |path, part| path.join(part))
            .join("smart-bookmarks"),
    }
}

/// Directory holding `settings.json`.
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_CONFIG_HOME", &[".config"])
    }
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("SmartBookmarks")
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join("SmartBookmarks")
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        home_dir().join(".smart-bookmarks")
    }
}

/// Directory holding the local bookmarks database.
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        xdg_dir("XDG_DATA_HOME", &[".local", "share"])
    }
    #[cfg(not(target_os = "linux"))]
    {
        get_config_dir()
    }
}
