//! Locating and reading `.docprobe.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use super::core::{ProbeConfig, CONFIG_FILE_NAME};
use crate::errors::{Error, Result};

/// How many directories, starting with the working directory, are searched.
const MAX_SEARCH_DEPTH: usize = 10;

/// Parse TOML config text. `origin` only names the source in errors.
pub fn parse_config(contents: &str, origin: &Path) -> Result<ProbeConfig> {
    toml::from_str::<ProbeConfig>(contents)
        .map_err(|e| Error::Configuration(format!("Invalid {}: {}", origin.display(), e)))
}

/// Read and parse the config file at `path`. Relative search paths in it are
/// taken relative to the file's directory.
pub fn load_config_file(path: &Path) -> Result<ProbeConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Configuration(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let config = parse_config(&contents, path)?;

    Ok(match path.parent() {
        Some(dir) => config.anchored_at(dir),
        None => config,
    })
}

/// The nearest `.docprobe.toml` in `start` or one of its ancestors.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MAX_SEARCH_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Discover and load the config for the working directory.
///
/// Discovery never fails the run: without a file, or with one that cannot be
/// used, the defaults apply.
pub fn load_config() -> ProbeConfig {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            tracing::warn!(error = %e, "Working directory unavailable, using default config");
            return ProbeConfig::default();
        }
    };

    let Some(path) = find_config_file(&cwd) else {
        tracing::debug!(start = %cwd.display(), "No {} found", CONFIG_FILE_NAME);
        return ProbeConfig::default();
    };

    match load_config_file(&path) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "Loaded config");
            config
        }
        Err(e) => {
            tracing::warn!("{}. Using default config.", e);
            ProbeConfig::default()
        }
    }
}
