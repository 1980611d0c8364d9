// src/cli/handlers/history.rs

use anyhow::{Context, Result, anyhow};
use std::io::Write;
use std::path::Path;

use crate::{
    cli::dispatcher::StageIo,
    core::history,
    state::{self, SharedSession},
};

/// What one `history` invocation asks for.
#[derive(Debug, PartialEq, Eq)]
enum HistoryAction<'a> {
    List { last: Option<usize> },
    Read(&'a str),
    Write(&'a str),
    Append(&'a str),
}

fn parse_args(args: &[String]) -> Result<HistoryAction<'_>> {
    match args {
        [] => Ok(HistoryAction::List { last: None }),
        [flag, file] if flag == "-r" => Ok(HistoryAction::Read(file)),
        [flag, file] if flag == "-w" => Ok(HistoryAction::Write(file)),
        [flag, file] if flag == "-a" => Ok(HistoryAction::Append(file)),
        [flag] if matches!(flag.as_str(), "-r" | "-w" | "-a") => {
            Err(anyhow!("{flag}: option requires an argument"))
        }
        [arg] => match arg.parse::<usize>() {
            Ok(n) => Ok(HistoryAction::List { last: Some(n) }),
            Err(_) if arg.starts_with('-') => Err(anyhow!("{arg}: invalid option")),
            Err(_) => Err(anyhow!("{arg}: numeric argument required")),
        },
        [flag, _] if flag.starts_with('-') => Err(anyhow!("{flag}: invalid option")),
        _ => Err(anyhow!("too many arguments")),
    }
}

pub fn handle(args: &[String], io: &mut StageIo, session: &SharedSession) -> Result<()> {
    match parse_args(args)? {
        HistoryAction::List { last } => {
            let entries = state::lock(session).history.clone();
            let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
            for (number, entry) in entries.iter().enumerate().skip(skip) {
                writeln!(io.stdout, "{:>5}  {}", number + 1, entry)?;
            }
            io.stdout.flush()?;
        }
        HistoryAction::Read(file) => {
            let loaded = history::load(Path::new(file)).with_context(|| file.to_string())?;
            let mut session = state::lock(session);
            session.history.extend(loaded);
        }
        HistoryAction::Write(file) => {
            let mut session = state::lock(session);
            history::write(Path::new(file), &session.history).with_context(|| file.to_string())?;
            session.history_saved_up_to = session.history.len();
        }
        HistoryAction::Append(file) => {
            let mut session = state::lock(session);
            let mark = session.history_saved_up_to;
            let unsaved = session.take_unsaved();
            if let Err(e) = history::append(Path::new(file), &unsaved) {
                session.history_saved_up_to = mark;
                return Err(e).with_context(|| file.to_string());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::test_support::run;
    use crate::state::{SessionState, new_shared};
    use std::fs;
    use tempfile::TempDir;

    fn session_with(entries: &[&str]) -> SharedSession {
        let mut state = SessionState::default();
        for entry in entries {
            state.record(entry);
        }
        new_shared(state)
    }

    #[test]
    fn test_list_all_and_last_n() {
        let session = session_with(&["echo one", "pwd", "history"]);

        let out = run(handle, &[], &session);
        out.result.unwrap();
        assert_eq!(out.stdout, "    1  echo one\n    2  pwd\n    3  history\n");

        let out = run(handle, &["2"], &session);
        assert_eq!(out.stdout, "    2  pwd\n    3  history\n");

        let out = run(handle, &["10"], &session);
        assert_eq!(out.stdout.lines().count(), 3);
    }

    #[test]
    fn test_argument_errors() {
        let session = session_with(&[]);
        let message = |args: &[&str]| run(handle, args, &session).result.unwrap_err().to_string();

        assert_eq!(message(&["abc"]), "abc: numeric argument required");
        assert_eq!(message(&["-x"]), "-x: invalid option");
        assert_eq!(message(&["-r"]), "-r: option requires an argument");
        assert_eq!(message(&["-z", "file"]), "-z: invalid option");
        assert_eq!(message(&["1", "2", "3"]), "too many arguments");
    }

    #[test]
    fn test_read_write_append() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");
        let source_str = source.to_string_lossy().into_owned();
        let target_str = target.to_string_lossy().into_owned();
        fs::write(&source, "ls\ncat file\n").unwrap();

        let session = session_with(&["echo start"]);
        run(handle, &["-r", &source_str], &session).result.unwrap();
        assert_eq!(state::lock(&session).history, vec!["echo start", "ls", "cat file"]);

        run(handle, &["-w", &target_str], &session).result.unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "echo start\nls\ncat file\n");

        state::lock(&session).record("echo later");
        run(handle, &["-a", &target_str], &session).result.unwrap();
        run(handle, &["-a", &target_str], &session).result.unwrap();
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "echo start\nls\ncat file\necho later\n"
        );
    }

    #[test]
    fn test_failed_append_keeps_entries_unsaved() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("missing-dir").join("hist");
        let session = session_with(&["one", "two"]);

        assert!(run(handle, &["-a", &bad.to_string_lossy()], &session).result.is_err());
        assert_eq!(state::lock(&session).history_saved_up_to, 0);
    }
}
