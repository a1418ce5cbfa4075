//! Application directories and the persisted editor config.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Directory name of the drop slot, resolved by the viewer relative to
/// its working directory.
pub const DROP_DIR_NAME: &str = "preview";

/// Get the application data directory, creating it if needed.
///
/// - Linux: ~/.local/share/phototag
/// - macOS: ~/Library/Application Support/phototag
/// - Windows: %APPDATA%\phototag
pub fn data_dir() -> Result<PathBuf> {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| std::io::Error::other("could not determine user data directory"))?;
    path.push("phototag");
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// Directory for log files; falls back to the system temp dir.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("phototag"))
        .unwrap_or_else(|| std::env::temp_dir().join("phototag"))
}

/// Location of the user-editable suggestion file.
pub fn suggestion_file() -> Result<PathBuf> {
    Ok(data_dir()?.join("TagSuggestions.txt"))
}

/// The drop directory shared with the viewer process.
pub fn drop_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join(DROP_DIR_NAME))
}

/// Persisted editor state, stored as `config.json` in the data dir.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Last directory the user browsed; the default for prompts
    pub last_directory: Option<PathBuf>,
}

impl EditorConfig {
    /// Load the config, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Ok(dir) = data_dir() else {
            return EditorConfig::default();
        };
        let path = dir.join("config.json");
        let Ok(contents) = fs::read_to_string(path) else {
            return EditorConfig::default();
        };
        serde_json::from_str(&contents).unwrap_or_default()
    }

    /// Save the config. Failures are not fatal to the editor.
    pub fn save(&self) -> Result<()> {
        let path = data_dir()?.join("config.json");
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_directory() {
        let config = EditorConfig::default();
        assert!(config.last_directory.is_none());
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EditorConfig {
            last_directory: Some(PathBuf::from("/photos")),
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: EditorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.last_directory, Some(PathBuf::from("/photos")));
    }
}
