// src/cli/handlers/cd.rs

use anyhow::{Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};

use crate::{
    cli::dispatcher::StageIo,
    state::{self, SharedSession},
};

pub fn handle(args: &[String], _io: &mut StageIo, session: &SharedSession) -> Result<()> {
    let requested = match args {
        [] => None,
        [dir] => Some(dir.as_str()),
        [_, ..] => return Err(anyhow!("too many arguments")),
    };

    let home = state::lock(session).home_dir.clone();
    let target = resolve_target(requested, home.as_deref())?;

    env::set_current_dir(&target).map_err(|e| {
        log::debug!("set_current_dir('{}') failed: {}", target.display(), e);
        anyhow!("{}: No such file or directory", requested.unwrap_or("~"))
    })?;

    let cwd = dunce::canonicalize(&target).unwrap_or(target);
    log::debug!("Working directory is now '{}'.", cwd.display());
    state::lock(session).current_dir = cwd;
    Ok(())
}

/// Maps the argument to a directory: nothing or `~` is home, `~/x` is below home.
fn resolve_target(requested: Option<&str>, home: Option<&Path>) -> Result<PathBuf> {
    let home_or_err = || {
        home.map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("home directory is not known"))
    };
    match requested {
        None | Some("~") => home_or_err(),
        Some(dir) => match dir.strip_prefix("~/") {
            Some(rest) => Ok(home_or_err()?.join(rest)),
            None => Ok(PathBuf::from(dir)),
        },
    }
}
