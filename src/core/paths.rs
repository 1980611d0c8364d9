// src/core/paths.rs

use crate::constants::{APP_NAME, CONFIG_FILENAME};
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref QUILL_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not expand path '{template}': {message}")]
    Expansion { template: String, message: String },
}

/// Returns the path to the quill configuration directory (`~/.config/quill`).
/// The directory is not created; a missing one simply means no configuration.
///
/// This function is memoized: the first call computes and caches the path,
/// subsequent calls return the cached value.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = QUILL_CONFIG_DIR
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(APP_NAME);

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the default `config.toml`.
pub fn get_default_config_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a user-supplied path.
///
/// # Errors
/// Fails when the template references an undefined variable.
pub fn expand_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        message: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_memoized() {
        let Ok(first) = get_config_dir() else {
            return;
        };
        assert!(first.ends_with(APP_NAME));
        assert_eq!(get_config_dir().unwrap(), first);
        assert_eq!(get_default_config_path().unwrap(), first.join(CONFIG_FILENAME));
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/tmp/plain").unwrap(), PathBuf::from("/tmp/plain"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/hist").unwrap(), home.join("hist"));
        }

        let err = expand_path("$QUILL_SURELY_UNDEFINED_VARIABLE/x").unwrap_err();
        assert!(matches!(err, PathError::Expansion { .. }));
    }
}
