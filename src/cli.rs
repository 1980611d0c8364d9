// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::core::config_loader::Overrides;

pub mod dispatcher;
pub mod handlers;

/// quill: an interactive command interpreter.
///
/// Reads lines from the terminal in raw mode with Tab completion and history recall,
/// and runs them as pipelines of internal commands and programs found on PATH.
///
/// Supported syntax:
/// - `cmd1 | cmd2 | cmd3` pipes each command's output into the next.
/// - `<`, `>`, `1>`, `>>`, `1>>`, `2>`, `2>>`, `&>`, `&>>` redirect streams to files.
/// - `'...'` and `"..."` quote arguments; `\` escapes the next character.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// Read settings from this file instead of `<config dir>/quill/config.toml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// History file to load at startup and append to on exit (overrides `HISTFILE`).
    #[arg(long, value_name = "PATH")]
    pub histfile: Option<PathBuf>,

    /// The prompt printed before every line.
    #[arg(long, value_name = "STRING")]
    pub prompt: Option<String>,

    /// Do not print the startup banner.
    #[arg(long)]
    pub no_banner: bool,
}

impl Cli {
    /// The flags that take precedence over the configuration file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            prompt: self.prompt.clone(),
            history_file: self.histfile.clone(),
            no_banner: self.no_banner,
        }
    }
}
