// src/cli/handlers/pwd.rs

use anyhow::{Context, Result};
use std::{env, io::Write};

use crate::{
    cli::dispatcher::StageIo,
    state::{self, SharedSession},
};

pub fn handle(_args: &[String], io: &mut StageIo, session: &SharedSession) -> Result<()> {
    let cwd = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            // The directory may have been removed underneath us; fall back to the last known one.
            let known = state::lock(session).current_dir.clone();
            if known.as_os_str().is_empty() {
                return Err(e).context("cannot determine current directory");
            }
            known
        }
    };
    writeln!(io.stdout, "{}", dunce::simplified(&cwd).display())?;
    io.stdout.flush()?;
    Ok(())
}
