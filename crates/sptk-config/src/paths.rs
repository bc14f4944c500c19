//! Preset directories and name resolution.
//!
//! # Platform Paths
//!
//! | Platform | User presets |
//! |----------|--------------|
//! | Linux    | `~/.config/sptk/presets/` |
//! | macOS    | `~/Library/Application Support/sptk/presets/` |
//! | Windows  | `%APPDATA%\sptk\presets\` |

use std::path::{Path, PathBuf};

use crate::{AnalysisPreset, ConfigError, get_factory_preset};

const APP_NAME: &str = "sptk";

const PRESETS_SUBDIR: &str = "presets";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform has none.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user-specific presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Ensure the user presets directory exists.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}

/// List the preset files in the user presets directory.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Get the preset name from a file path (the file stem).
///
/// ```rust
/// use sptk_config::preset_name_from_path;
/// use std::path::Path;
///
/// let name = preset_name_from_path(Path::new("/path/to/wideband.toml"));
/// assert_eq!(name, Some("wideband".to_string()));
/// ```
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(ToString::to_string)
}

/// Find a preset file by name.
///
/// Searches the user presets directory (adding `.toml` when missing), then
/// treats `name` as a literal path.
pub fn find_preset_file(name: &str) -> Option<PathBuf> {
    find_in(&user_presets_dir(), name)
}

fn find_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let has_extension = Path::new(name).extension().is_some_and(|ext| ext == "toml");
    let filename = if has_extension {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let user_path = dir.join(&filename);
    if user_path.is_file() {
        return Some(user_path);
    }

    let path = PathBuf::from(name);
    path.is_file().then_some(path)
}

/// Resolve a preset by name.
///
/// Factory presets take precedence, then user presets, then a literal path.
///
/// ```rust
/// use sptk_config::find_preset;
///
/// let preset = find_preset("speech-22k").unwrap();
/// assert_eq!(preset.sample_rate, 22050);
/// ```
pub fn find_preset(name: &str) -> Result<AnalysisPreset, ConfigError> {
    if let Some(preset) = get_factory_preset(name) {
        return Ok(preset);
    }
    match find_preset_file(name) {
        Some(path) => AnalysisPreset::load(path),
        None => Err(ConfigError::PresetNotFound(name.to_string())),
    }
}
