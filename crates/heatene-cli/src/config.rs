//! Locating and loading operator overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde_json::Value;
use tracing::{debug, info};

use heatene_lib::{defaults, resolve_with_notes, Resolution};

/// Environment variable naming an overrides file.
pub const OVERRIDES_ENV: &str = "HEATENE_OVERRIDES";

/// File name looked up in the platform config directory.
pub const OVERRIDES_FILENAME: &str = "overrides.json";

/// Where the overrides in effect came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverridesSource {
    Flag(PathBuf),
    Env(PathBuf),
    ConfigDir(PathBuf),
    None,
}

impl OverridesSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            OverridesSource::Flag(p) | OverridesSource::Env(p) | OverridesSource::ConfigDir(p) => {
                Some(p.as_path())
            }
            OverridesSource::None => None,
        }
    }
}

/// Pick the overrides file: explicit flag, then `HEATENE_OVERRIDES`, then the
/// platform config directory. A missing config-directory file means no overrides;
/// a missing flag or env path is an error at load time.
pub fn locate_overrides(flag: Option<&Path>) -> OverridesSource {
    if let Some(path) = flag {
        return OverridesSource::Flag(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(OVERRIDES_ENV).filter(|v| !v.is_empty()) {
        return OverridesSource::Env(PathBuf::from(path));
    }
    if let Some(path) = default_overrides_path().filter(|p| p.exists()) {
        return OverridesSource::ConfigDir(path);
    }
    OverridesSource::None
}

/// `<config dir>/overrides.json` for this platform, if a home directory is known.
pub fn default_overrides_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "heatene", "heatene")
        .map(|dirs| dirs.config_dir().join(OVERRIDES_FILENAME))
}

pub fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse JSON in {}", path.display()))
}

/// Resolve effective parameters from the built-in defaults and any overrides.
pub fn load_parameters(flag: Option<&Path>) -> Result<Resolution> {
    let source = locate_overrides(flag);
    let overrides = match source.path() {
        Some(path) => {
            info!(path = %path.display(), "applying parameter overrides");
            Some(read_json(path)?)
        }
        None => {
            debug!("no parameter overrides found");
            None
        }
    };
    resolve_with_notes(defaults(), overrides.as_ref())
        .context("failed to resolve effective parameters")
}
