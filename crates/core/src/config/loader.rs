//! Configuration file loading

use crate::error::{Error, ErrorCode, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Standard project file locations, relative to the project directory
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "droidsign.toml",
    ".droidsign.toml",
    ".config/droidsign.toml",
];

/// A loaded configuration value and where it came from
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    /// Parsed configuration
    pub value: T,
    /// `None` when no file was found and defaults were used
    pub path: Option<PathBuf>,
}

/// Load configuration from an explicit path, a discovered file, or defaults.
///
/// An explicit path must exist. Otherwise the first existing candidate under
/// `dir` is used, and when none exists `T::default()` is returned.
pub fn load_toml<T>(explicit: Option<&Path>, candidates: &[&str], dir: &Path) -> Result<Loaded<T>>
where
    T: DeserializeOwned + Default,
{
    let config_path = match explicit {
        Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(dir, candidates),
    };

    let value = match &config_path {
        Some(p) => load_config_file(p)?,
        None => {
            tracing::debug!(dir = %dir.display(), "No config file found, using defaults");
            T::default()
        }
    };

    Ok(Loaded {
        value,
        path: config_path,
    })
}

/// Find configuration file in standard locations
pub fn find_config_file(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|candidate| dir.join(candidate))
        .find(|path| path.is_file())
}

/// Load and parse a TOML configuration file
fn load_config_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::new(
            ErrorCode::ConfigError,
            format!("Failed to read config file {}: {}", path.display(), e),
        )
        .with_source(e)
    })?;

    tracing::debug!(path = %path.display(), "Loaded config file");

    toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
        .with_source(e)
    })
}
