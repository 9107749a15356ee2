// src/core/paths.rs

use crate::constants::{APP_DIR_NAME, CONFIG_DIR_ENV, ENVIRONMENTS_FILENAME};
use lazy_static::lazy_static;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expand path '{template}': {reason}")]
    Expansion { template: String, reason: String },
}

/// Returns the stagehand configuration directory, creating it if needed.
///
/// `$STAGEHAND_CONFIG_DIR` wins over the platform default (`~/.config/stagehand`).
/// The first successful lookup is cached for the rest of the process.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONFIG_DIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(APP_DIR_NAME),
    };

    if !config_path.exists() {
        fs::create_dir_all(&config_path).map_err(|e| PathError::ConfigDirCreation {
            path: config_path.display().to_string(),
            source: e,
        })?;
    }

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path of `environments.toml` inside the config directory.
pub fn get_environments_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(ENVIRONMENTS_FILENAME))
}

/// Expands `~` and `$VAR` / `${VAR}` references in a user-supplied path.
pub fn expand_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_resolves_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path("~/work").unwrap(), home.join("work"));
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(expand_path("/opt/tools").unwrap(), PathBuf::from("/opt/tools"));
    }

    #[test]
    fn test_expand_path_reports_unknown_variable() {
        let err = expand_path("$STAGEHAND_SURELY_UNDEFINED_VAR/x").unwrap_err();
        assert!(matches!(err, PathError::Expansion { .. }));
    }
}
