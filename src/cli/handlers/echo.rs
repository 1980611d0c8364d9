// src/cli/handlers/echo.rs

use anyhow::Result;
use std::io::Write;

use crate::{cli::dispatcher::StageIo, state::SharedSession};

pub fn handle(args: &[String], io: &mut StageIo, _session: &SharedSession) -> Result<()> {
    writeln!(io.stdout, "{}", args.join(" "))?;
    io.stdout.flush()?;
    Ok(())
}
