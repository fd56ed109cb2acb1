//! Configuration file loading and discovery.
//!
//! Also hosts [`read_structured`], the YAML/JSON reader shared by rubric,
//! facet and category files.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::types::AppConfig;
use crate::error::{JudgeError, Result};

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".relevance-judge.yaml",
    ".relevance-judge.yml",
    "relevance-judge.yaml",
    "relevance-judge.yml",
];

/// Read a YAML or JSON document. `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| JudgeError::io(path, e))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml_ng::from_str(&content)?)
    }
}

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (`~/.config/relevance-judge/`)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    let candidates = [
        cwd.clone(),
        cwd.as_deref().and_then(find_git_root),
        dirs::config_dir().map(|dir| dir.join("relevance-judge")),
        dirs::home_dir(),
    ];

    candidates
        .iter()
        .flatten()
        .find_map(|dir| find_config_in_dir(dir))
}

fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Load an `AppConfig` from a YAML (or `.json`) file.
pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(JudgeError::config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    read_structured(path)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

/// Commented example configuration.
#[must_use]
pub fn generate_example_config() -> String {
    format!(
        "# relevance-judge configuration\n\
         # Place this file at .relevance-judge.yaml in your project root or ~/.config/relevance-judge/\n\n{}",
        serde_yaml_ng::to_string(&AppConfig::default()).unwrap_or_default()
    )
}
