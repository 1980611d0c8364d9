// src/system/shell.rs

use crate::{
    cli::dispatcher::Registry,
    constants::BANNER,
    core::{
        color,
        completion::CommandCompleter,
        config_loader::Settings,
        history,
        line_editor::{LineEditor, ReadLineError},
        pipeline, redirect, tokenizer,
    },
    models::{ParseError, Pipeline},
    state::{self, SessionState, SharedSession},
    system::executor,
};
use colored::Colorize;
use std::env;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;
use tokio::runtime::Runtime;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Could not start the task runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// The interactive read-parse-execute loop.
///
/// Owns the line editor, the session state shared with internal commands, and the
/// runtime pipelines execute on. Lines are processed strictly one at a time.
pub struct Shell<R, W> {
    editor: LineEditor<R, W>,
    session: SharedSession,
    registry: Registry,
    completer: CommandCompleter,
    runtime: Runtime,
    banner: bool,
}

impl<R: Read, W: Write> Shell<R, W> {
    pub fn new(settings: &Settings, input: R, output: W) -> Result<Self, ShellError> {
        Self::with_registry(settings, input, output, Registry::builtin())
    }

    pub fn with_registry(
        settings: &Settings,
        input: R,
        output: W,
        registry: Registry,
    ) -> Result<Self, ShellError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(ShellError::Runtime)?;

        let current_dir = env::current_dir().unwrap_or_default();
        let mut session = SessionState::new(current_dir, dirs::home_dir());
        session.history_file = settings.history_file.clone();
        if let Some(path) = &settings.history_file {
            load_history(&mut session, path);
        }

        let prompt = color::paint_prompt(&settings.prompt, settings.prompt_color);
        let completer = CommandCompleter::new(registry.names());

        Ok(Self {
            editor: LineEditor::new(input, output, prompt),
            session: state::new_shared(session),
            registry,
            completer,
            runtime,
            banner: settings.banner,
        })
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Runs until `exit` or end of input and returns the status to exit with.
    ///
    /// New history entries are appended to the history file on the way out, whether
    /// the loop ended normally or with an error.
    pub fn run(&mut self) -> Result<i32, ShellError> {
        let outcome = self.repl();
        self.save_history();
        outcome
    }

    fn repl(&mut self) -> Result<i32, ShellError> {
        if self.banner {
            let output = self.editor.output_mut();
            write!(output, "{}\r\n", BANNER.dimmed())?;
            output.flush()?;
        }

        loop {
            let history = state::lock(&self.session).history.clone();
            match self.editor.read_line(&history, &self.completer) {
                Ok(line) => self.run_line(&line),
                Err(ReadLineError::Interrupted) => continue,
                Err(ReadLineError::EndOfInput) => {
                    log::debug!("End of input, leaving.");
                    return Ok(0);
                }
                Err(ReadLineError::Io(e)) => return Err(e.into()),
            }

            if let Some(code) = state::lock(&self.session).exit_code {
                return Ok(code);
            }
        }
    }

    /// Records, parses and executes one submitted line.
    pub fn run_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        state::lock(&self.session).record(line);

        match parse_line(line) {
            Ok(pipeline) => {
                let statuses = self
                    .runtime
                    .block_on(executor::execute(pipeline, &self.registry, &self.session));
                log::debug!("Line finished with {:?}.", statuses);
            }
            Err(e) => {
                log::debug!("Parse error: {:?}", e);
                let mut stderr = io::stderr();
                let _ = write!(stderr, "{}\r\n", e.to_string().red());
                let _ = stderr.flush();
            }
        }
    }

    fn save_history(&self) {
        let mut session = state::lock(&self.session);
        let Some(path) = session.history_file.clone() else {
            return;
        };
        let unsaved = session.take_unsaved();
        if unsaved.is_empty() {
            return;
        }
        if let Err(e) = history::append(&path, &unsaved) {
            log::warn!("Could not save history to '{}': {}", path.display(), e);
        }
    }
}

impl<R, W> std::fmt::Debug for Shell<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("session", &self.session)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Tokenizes, assembles and resolves a line into a runnable pipeline.
pub fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
    let tokens = tokenizer::tokenize(line)?;
    log::debug!("Tokens: {:?}", tokens);
    let mut pipeline = pipeline::assemble(tokens)?;
    for stage in &mut pipeline.stages {
        redirect::resolve(stage)?;
    }
    Ok(pipeline)
}

fn load_history(session: &mut SessionState, path: &Path) {
    match history::load(path) {
        Ok(entries) => {
            session.history = entries;
            session.history_saved_up_to = session.history.len();
        }
        Err(e) => log::warn!("Could not read history file '{}': {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings(history_file: Option<PathBuf>) -> Settings {
        Settings {
            prompt: "$ ".into(),
            prompt_color: None,
            banner: false,
            history_file,
            log_file: None,
        }
    }

    fn quoted(path: &Path) -> String {
        shlex::try_quote(&path.to_string_lossy()).unwrap().into_owned()
    }

    fn run_session(input: &str, history_file: Option<PathBuf>) -> (i32, String) {
        let mut output = Vec::new();
        let code = {
            let mut shell = Shell::new(&settings(history_file), input.as_bytes(), &mut output).unwrap();
            shell.run().unwrap()
        };
        (code, String::from_utf8_lossy(&output).into_owned())
    }

    #[test]
    fn test_session_runs_lines_until_exit() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");

        let input = format!("echo hello world > {}\rexit 3\recho unreachable\r", quoted(&out));
        let (code, output) = run_session(&input, None);

        assert_eq!(code, 3);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello world\n");
        assert!(output.starts_with("$ echo hello world"));
        assert!(!output.contains("unreachable"));
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let (code, output) = run_session("\r  \r", None);
        assert_eq!(code, 0);
        assert_eq!(output.matches("$ ").count(), 3);
    }

    #[test]
    fn test_interrupt_and_parse_errors_do_not_end_the_session() {
        let (code, output) = run_session("partial\x03echo 'open\rexit 4\r", None);
        assert_eq!(code, 4);
        assert!(output.contains("^C\r\n"));
    }

    #[test]
    fn test_history_is_loaded_and_appended() {
        let dir = TempDir::new().unwrap();
        let history_file = dir.path().join("history");
        fs::write(&history_file, "echo old\n").unwrap();

        // Up arrow recalls the loaded entry; the recalled line is redirected away.
        let out = dir.path().join("out.txt");
        let input = format!("\x1b[A > {}\rexit\r", quoted(&out));
        let (code, _) = run_session(&input, Some(history_file.clone()));

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "old\n");
        let saved = fs::read_to_string(&history_file).unwrap();
        assert_eq!(
            saved,
            format!("echo old\necho old > {}\nexit\n", quoted(&out))
        );
    }

    #[test]
    fn test_parse_line() {
        let pipeline = parse_line("echo a | wc -l").unwrap();
        assert_eq!(pipeline.len(), 2);
        assert!(matches!(parse_line("echo \"x"), Err(ParseError::UnterminatedQuote { .. })));
        assert!(matches!(parse_line("| wc"), Err(ParseError::EmptyPipelineSegment)));
        assert!(matches!(parse_line("echo >"), Err(ParseError::MissingRedirectTarget { .. })));
    }

    #[test]
    fn test_quoted_operators_reach_echo_unchanged() {
        // --- Setup ---
        let dir = TempDir::new().unwrap();
        let out = |name: &str| dir.path().join(name);

        // --- Execute ---
        let input = format!(
            "echo '|' > {}\recho \"a\" '>' b > {}\recho \\| > {}\rexit\r",
            quoted(&out("pipe.txt")),
            quoted(&out("gt.txt")),
            quoted(&out("escaped.txt")),
        );
        let (code, _) = run_session(&input, None);

        // --- Assert ---
        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(out("pipe.txt")).unwrap(), "|\n");
        assert_eq!(fs::read_to_string(out("gt.txt")).unwrap(), "a > b\n");
        assert_eq!(fs::read_to_string(out("escaped.txt")).unwrap(), "|\n");

        let pipeline = parse_line("echo '|'").unwrap();
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.stages[0].args, vec!["|"]);
    }
}
