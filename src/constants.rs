// src/constants.rs

/// The application name, used for the configuration directory.
pub const APP_NAME: &str = "quill";

/// The name of the configuration file (inside the config directory).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Environment variable naming the history file.
pub const HISTFILE_ENV: &str = "HISTFILE";

/// Prompt printed before every line unless configured otherwise.
pub const DEFAULT_PROMPT: &str = "$ ";

/// Default `RUST_LOG`-style filter.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Printed once at startup unless disabled.
pub const BANNER: &str = "quill: type 'help' for the list of internal commands, 'exit' to leave.";
