// src/bin/quill.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use env_logger::{Env, Target};
use quill::{
    cli::Cli,
    constants::DEFAULT_LOG_FILTER,
    core::config_loader,
    system::{shell::Shell, terminal},
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::fd::AsFd;
use std::path::Path;

/// The main entry point of the `quill` application.
/// It loads the configuration, sets up logging, runs the interactive session and
/// performs centralized error handling.
fn main() {
    let code = match run_session(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            // --- Centralized Error Handling ---
            // The terminal is back in its original mode by the time we get here.
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            1
        }
    };
    std::process::exit(code);
}

/// Runs one interactive session and returns the status the process should exit with.
fn run_session(cli: Cli) -> Result<i32> {
    let config = config_loader::load(cli.config.as_deref())?;
    let settings = config.resolve(cli.overrides())?;
    init_logging(settings.log_file.as_deref());
    log::debug!("Settings: {:?}", settings);

    let raw_mode = terminal::enable_raw_mode().context("Cannot start an interactive session")?;
    let _restore = scopeguard::guard(raw_mode, |raw_mode| {
        if let Err(e) = raw_mode.restore() {
            log::warn!("Failed to restore terminal: {}", e);
        }
    });

    // Read keystrokes through an unbuffered handle so no byte waits in a buffer.
    let input = File::from(io::stdin().as_fd().try_clone_to_owned()?);
    let mut shell = Shell::new(&settings, input, io::stdout())?;
    let code = shell.run()?;
    log::debug!("Session finished with status {}.", code);
    Ok(code)
}

/// Sends log records to `log_file` when configured, otherwise to stderr with `\r\n`
/// line endings so they render correctly while the terminal is in raw mode.
fn init_logging(log_file: Option<&Path>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER));

    let file = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("{}: cannot open log file '{}': {}", "Warning".yellow().bold(), path.display(), e);
            None
        }
    });

    match file {
        Some(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .format(|buf, record| {
                    writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
                });
        }
        None => {
            builder.format(|buf, record| {
                write!(buf, "[{} {}] {}\r\n", record.level(), record.target(), record.args())
            });
        }
    }
    builder.init();
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
