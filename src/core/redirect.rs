// src/core/redirect.rs

use crate::models::{ParseError, RedirectOperator, Stage, StageInput, StageOutput, Word};
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Applies the redirections found in a stage's arguments.
///
/// Arguments are scanned left to right. Only bare words are operators, so `'>'` stays an
/// argument. Every operator must be followed by a file name; both words are removed from
/// `args` and the named file is bound to the matching stream. Later redirections of the
/// same stream replace earlier ones.
///
/// # Placement rules:
/// - `<` is only valid on the first stage (one whose stdin is not a pipe).
/// - Operators that rebind stdout (`>`, `>>`, `&>`, `&>>` and the `1>` forms) are only
///   valid on the terminal stage (one whose stdout is not a pipe).
pub fn resolve(stage: &mut Stage) -> Result<(), ParseError> {
    let mut remaining = Vec::with_capacity(stage.args.len());
    let mut args = std::mem::take(&mut stage.args).into_iter();

    while let Some(arg) = args.next() {
        let Some(operator) = arg.redirect_operator() else {
            remaining.push(arg);
            continue;
        };
        let token = arg.as_str();
        check_placement(stage, operator, token)?;

        let target = args
            .next()
            .filter(|next| next.redirect_operator().is_none())
            .ok_or_else(|| ParseError::MissingRedirectTarget {
                token: token.to_string(),
            })?;
        bind(stage, operator, token, &target)?;
        log::debug!("Stage '{}': {} bound to '{}'.", stage.name, token, target);
    }

    stage.args = remaining;
    Ok(())
}

fn check_placement(stage: &Stage, operator: RedirectOperator, token: &str) -> Result<(), ParseError> {
    let misplaced = |reason| ParseError::InvalidRedirectPlacement {
        token: token.to_string(),
        reason,
    };
    if operator == RedirectOperator::Input && stage.stdin.is_pipe() {
        return Err(misplaced(
            "input redirection is only allowed on the first command of a pipeline",
        ));
    }
    if operator.binds_stdout() && stage.stdout.is_pipe() {
        return Err(misplaced(
            "output is already sent to the next command of the pipeline",
        ));
    }
    Ok(())
}

fn bind(stage: &mut Stage, operator: RedirectOperator, token: &str, target: &Word) -> Result<(), ParseError> {
    let target = target.as_str();
    let unavailable = |source| ParseError::RedirectTargetUnavailable {
        token: token.to_string(),
        path: target.to_string(),
        source,
    };

    match operator {
        RedirectOperator::Input => {
            let file = File::open(target).map_err(unavailable)?;
            stage.stdin = StageInput::File(file);
        }
        RedirectOperator::Output { append } => {
            let file = open_for_writing(target, append).map_err(unavailable)?;
            stage.stdout = StageOutput::File(file);
        }
        RedirectOperator::Error { append } => {
            let file = open_for_writing(target, append).map_err(unavailable)?;
            stage.stderr = StageOutput::File(file);
        }
        RedirectOperator::Both { append } => {
            let file = open_for_writing(target, append).map_err(unavailable)?;
            let copy = file.try_clone().map_err(unavailable)?;
            stage.stdout = StageOutput::File(file);
            stage.stderr = StageOutput::File(copy);
        }
    }
    Ok(())
}

/// Opens (creating if needed) a file for a `>`-style (truncate) or `>>`-style (append) target.
fn open_for_writing(path: impl AsRef<Path>, append: bool) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path)
}
