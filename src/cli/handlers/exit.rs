// src/cli/handlers/exit.rs

use anyhow::{Result, anyhow};

use crate::{
    cli::dispatcher::StageIo,
    state::{self, SharedSession},
};

/// Requests termination. The driver leaves its loop once the current line finishes.
pub fn handle(args: &[String], _io: &mut StageIo, session: &SharedSession) -> Result<()> {
    let code = match args {
        [] => 0,
        [code] => code
            .parse::<i32>()
            .map_err(|_| anyhow!("{code}: numeric argument required"))?,
        [_, ..] => return Err(anyhow!("too many arguments")),
    };
    log::debug!("Exit requested with status {}.", code);
    state::lock(session).exit_code = Some(code);
    Ok(())
}
