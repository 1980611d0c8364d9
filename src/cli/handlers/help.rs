// src/cli/handlers/help.rs

use anyhow::Result;
use std::io::Write;

use crate::{
    cli::dispatcher::{COMMAND_REGISTRY, StageIo},
    state::SharedSession,
};

pub fn handle(_args: &[String], io: &mut StageIo, _session: &SharedSession) -> Result<()> {
    let width = COMMAND_REGISTRY
        .iter()
        .map(|cmd| cmd.usage.len())
        .max()
        .unwrap_or_default();

    writeln!(io.stdout, "Internal commands:")?;
    for cmd in COMMAND_REGISTRY {
        writeln!(io.stdout, "  {:<width$}  {}", cmd.usage, cmd.description)?;
    }
    writeln!(io.stdout, "Anything else is run from PATH. Use '|' to pipe and <, >, >>, 2>, &> to redirect.")?;
    io.stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::test_support::{run, session};

    #[test]
    fn test_help_lists_every_command() {
        let out = run(handle, &[], &session());
        out.result.unwrap();
        for cmd in COMMAND_REGISTRY {
            assert!(out.stdout.contains(cmd.usage), "{}", cmd.name);
            assert!(out.stdout.contains(cmd.description), "{}", cmd.name);
        }
    }
}
