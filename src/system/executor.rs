// src/system/executor.rs

use crate::{
    cli::dispatcher::{self, BuiltinHandler, Registry, StageIo},
    models::{Pipeline, Stage, StageOutput, Word},
    state::SharedSession,
    system::{relay, search_path::SearchPath},
};
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWrite;
use tokio::process::{Child, Command};
use tokio::task::JoinSet;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0}: command not found")]
    CommandNotFound(String),
    #[error("{command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The command ran and finished with this status. Internal commands report 0 or 1.
    Exited(i32),
    /// The process was terminated by a signal.
    Signaled,
    /// The command could not be started.
    NotStarted,
}

impl StageStatus {
    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

/// Runs every stage of `pipeline` concurrently and waits for all of them.
///
/// Stages start in pipeline order. Internal commands run on the blocking pool; external
/// commands are spawned as child processes whose terminal-bound output is relayed with
/// `\n` -> `\r\n` translation. The returned statuses are in pipeline order.
///
/// A stage that cannot be started reports the error on its own error stream and drops
/// its handles at once. Its neighbours keep running and see end-of-file or a broken
/// pipe instead of blocking.
pub async fn execute(pipeline: Pipeline, registry: &Registry, session: &SharedSession) -> Vec<StageStatus> {
    let search_path = SearchPath::from_env();
    let mut statuses = vec![StageStatus::NotStarted; pipeline.len()];
    let mut tasks = JoinSet::new();

    for (index, stage) in pipeline.into_iter().enumerate() {
        log::debug!("Starting stage {} '{}' {:?}.", index, stage.name, stage.args);

        if let Some(definition) = registry.find(&stage.name) {
            let handler = definition.handler;
            let session = Arc::clone(session);
            tasks.spawn_blocking(move || (index, run_builtin(stage, handler, &session)));
            continue;
        }

        match search_path.find(&stage.name) {
            Some(program) => {
                tasks.spawn(async move { (index, run_external(stage, program).await) });
            }
            None => {
                let error = ExecutionError::CommandNotFound(stage.name.clone());
                report_launch_failure(stage, &error);
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, status)) => {
                log::debug!("Stage {} finished: {:?}.", index, status);
                if let Some(slot) = statuses.get_mut(index) {
                    *slot = status;
                }
            }
            Err(e) => log::warn!("A pipeline stage task failed: {}", e),
        }
    }
    statuses
}

// --- Internal Commands ---

fn run_builtin(stage: Stage, handler: BuiltinHandler, session: &SharedSession) -> StageStatus {
    let Stage {
        name,
        args,
        stdin,
        stdout,
        stderr,
    } = stage;
    let args: Vec<String> = args.into_iter().map(Word::into_string).collect();
    let mut io = StageIo::new(stdin, stdout, stderr);

    match handler(&args, &mut io, session) {
        Ok(()) => StageStatus::Exited(0),
        Err(e) if is_broken_pipe(&e) => {
            log::debug!("'{}' stopped writing: downstream closed the pipe.", name);
            StageStatus::Exited(1)
        }
        Err(e) => {
            let _ = writeln!(io.stderr, "{name}: {e:#}");
            let _ = io.stderr.flush();
            StageStatus::Exited(1)
        }
    }
}

fn is_broken_pipe(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == ErrorKind::BrokenPipe)
}

// --- External Commands ---

/// Converts an output handle for a child. Terminal-bound streams become pipes so the
/// relay can translate line endings.
fn child_output(output: StageOutput) -> Stdio {
    match output {
        StageOutput::Terminal => Stdio::piped(),
        StageOutput::Pipe(writer) => writer.into(),
        StageOutput::File(file) => file.into(),
    }
}

async fn run_external(stage: Stage, program: PathBuf) -> StageStatus {
    let name = stage.name.clone();
    match launch(stage, program) {
        Some(child) => reap(child, &name, tokio::io::stdout(), tokio::io::stderr()).await,
        None => StageStatus::NotStarted,
    }
}

/// Spawns the child for an external stage. On failure the error is written where the
/// stage's errors go and `None` is returned.
fn launch(stage: Stage, program: PathBuf) -> Option<Child> {
    let Stage {
        name,
        args,
        stdin,
        stdout,
        stderr,
    } = stage;
    // Kept only until the spawn outcome is known, to report a failure where the stage's
    // errors are meant to go.
    let failure_stream = stderr.try_clone().unwrap_or_default();

    let mut command = Command::new(&program);
    #[cfg(unix)]
    command.arg0(&name);
    command
        .args(args.iter().map(Word::as_str))
        .stdin(stdin.into_stdio())
        .stdout(child_output(stdout))
        .stderr(child_output(stderr));

    let spawned = command.spawn();
    // The command holds the parent's copies of the pipe ends; close them so the
    // neighbours see end-of-file when this child exits.
    drop(command);

    match spawned {
        Ok(child) => Some(child),
        Err(source) => {
            let error = ExecutionError::Spawn {
                command: name,
                source,
            };
            write_failure(failure_stream, &error);
            None
        }
    }
}

/// Relays the child's terminal-bound output to `out` and `err`, then waits for it.
async fn reap<O, E>(mut child: Child, name: &str, out: O, err: E) -> StageStatus
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();
    let stdout_relay = async {
        match child_stdout {
            Some(pipe) => relay::relay_crlf(pipe, out).await,
            None => Ok(0),
        }
    };
    let stderr_relay = async {
        match child_stderr {
            Some(pipe) => relay::relay_crlf(pipe, err).await,
            None => Ok(0),
        }
    };
    let (stdout_result, stderr_result) = tokio::join!(stdout_relay, stderr_relay);
    for (stream, result) in [("stdout", stdout_result), ("stderr", stderr_result)] {
        match result {
            Ok(bytes) => log::debug!("'{}' relayed {} {} bytes.", name, bytes, stream),
            Err(e) => log::warn!("Relaying {} of '{}' failed: {}", stream, name, e),
        }
    }

    match child.wait().await {
        Ok(status) => status
            .code()
            .map_or(StageStatus::Signaled, StageStatus::Exited),
        Err(e) => {
            log::warn!("Could not wait for '{}': {}", name, e);
            StageStatus::Signaled
        }
    }
}

/// Reports a stage that never started on its own error stream, then drops the stage so
/// every handle it owns is closed.
fn report_launch_failure(stage: Stage, error: &ExecutionError) {
    let Stage { stderr, .. } = stage;
    write_failure(stderr, error);
}

fn write_failure(stderr: StageOutput, error: &ExecutionError) {
    log::debug!("{}", error);
    let mut writer = dispatcher::error_writer(stderr);
    let _ = writeln!(writer, "{error}");
    let _ = writer.flush();
}
