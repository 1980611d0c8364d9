//! # Config Loader
//!
//! Reads the optional `config.toml` and folds it together with command-line flags and
//! the environment into the [`Settings`] the session runs with.
use crate::{
    constants::{DEFAULT_PROMPT, HISTFILE_ENV},
    core::{color, paths},
};
use colored::Color;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid 'prompt_color' in config: {0}")]
    InvalidColor(String),
    #[error(transparent)]
    Path(#[from] paths::PathError),
}

/// The on-disk configuration. Every key is optional.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub prompt: String,
    pub prompt_color: Option<String>,
    pub banner: bool,
    pub history_file: Option<String>,
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            prompt_color: None,
            banner: true,
            history_file: None,
            log_file: None,
        }
    }
}

/// Values given on the command line, which take precedence over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub prompt: Option<String>,
    pub history_file: Option<PathBuf>,
    pub no_banner: bool,
}

/// The fully resolved settings of one session.
#[derive(Debug, Clone)]
pub struct Settings {
    pub prompt: String,
    pub prompt_color: Option<Color>,
    pub banner: bool,
    pub history_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

/// Loads the configuration file.
///
/// With `explicit` set, that file must exist. Otherwise the default location is tried
/// and a missing file (or an undeterminable config directory) yields the defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match paths::get_default_config_path() {
            Ok(path) => (path, false),
            Err(e) => {
                log::debug!("No default config location: {}", e);
                return Ok(Config::default());
            }
        },
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            log::debug!("No config file at '{}', using defaults.", path.display());
            return Ok(Config::default());
        }
        Err(source) => return Err(ConfigError::Read { path, source }),
    };

    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    log::debug!("Loaded config from '{}'.", path.display());
    Ok(config)
}

impl Config {
    /// Applies overrides and the environment. The history file is taken from the
    /// flag, then `HISTFILE`, then the config key.
    pub fn resolve(self, overrides: Overrides) -> Result<Settings, ConfigError> {
        self.resolve_with_histfile_env(overrides, std::env::var_os(HISTFILE_ENV).map(PathBuf::from))
    }

    fn resolve_with_histfile_env(
        self,
        overrides: Overrides,
        histfile_env: Option<PathBuf>,
    ) -> Result<Settings, ConfigError> {
        let prompt_color = match &self.prompt_color {
            Some(name) => color::parse_color_name(name).map_err(ConfigError::InvalidColor)?,
            None => None,
        };

        let history_file = match (overrides.history_file, histfile_env) {
            (Some(path), _) => Some(path),
            (None, Some(path)) if !path.as_os_str().is_empty() => Some(path),
            _ => self.history_file.as_deref().map(paths::expand_path).transpose()?,
        };
        let log_file = self.log_file.as_deref().map(paths::expand_path).transpose()?;

        Ok(Settings {
            prompt: overrides.prompt.unwrap_or(self.prompt),
            prompt_color,
            banner: self.banner && !overrides.no_banner,
            history_file,
            log_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            prompt = "> "
            prompt_color = "cyan"
            banner = false
            history_file = "/tmp/quill_history"
            "#,
        )
        .unwrap();
        assert_eq!(config.prompt, "> ");
        assert!(!config.banner);
        assert_eq!(config.log_file, None);

        let settings = config.resolve_with_histfile_env(Overrides::default(), None).unwrap();
        assert_eq!(settings.prompt_color, Some(Color::Cyan));
        assert_eq!(settings.history_file, Some(PathBuf::from("/tmp/quill_history")));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(toml::from_str::<Config>("unknown_key = 1").is_err());
    }

    #[test]
    fn test_history_file_precedence() {
        let config = Config {
            history_file: Some("/from/config".into()),
            ..Config::default()
        };

        let from_flag = Overrides {
            history_file: Some("/from/flag".into()),
            ..Overrides::default()
        };
        let settings = config
            .clone()
            .resolve_with_histfile_env(from_flag, Some("/from/env".into()))
            .unwrap();
        assert_eq!(settings.history_file, Some(PathBuf::from("/from/flag")));

        let settings = config
            .clone()
            .resolve_with_histfile_env(Overrides::default(), Some("/from/env".into()))
            .unwrap();
        assert_eq!(settings.history_file, Some(PathBuf::from("/from/env")));

        let settings = config
            .resolve_with_histfile_env(Overrides::default(), None)
            .unwrap();
        assert_eq!(settings.history_file, Some(PathBuf::from("/from/config")));
    }

    #[test]
    fn test_overrides_and_bad_color() {
        let settings = Config::default()
            .resolve_with_histfile_env(
                Overrides {
                    prompt: Some("% ".into()),
                    no_banner: true,
                    ..Overrides::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(settings.prompt, "% ");
        assert!(!settings.banner);
        assert_eq!(settings.history_file, None);

        let config = Config {
            prompt_color: Some("mauve".into()),
            ..Config::default()
        };
        assert!(matches!(
            config.resolve_with_histfile_env(Overrides::default(), None),
            Err(ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        assert!(matches!(load(Some(&path)), Err(ConfigError::Read { .. })));

        fs::write(&path, "banner = false\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert!(!config.banner);
        assert_eq!(config.prompt, DEFAULT_PROMPT);

        fs::write(&path, "banner = \"yes\"\n").unwrap();
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse { .. })));
    }
}
