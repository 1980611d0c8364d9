// src/cli/dispatcher.rs

use anyhow::Result;
use std::fmt;
use std::io::{self, Read, Write};

use crate::{
    cli::handlers,
    models::{StageInput, StageOutput},
    state::SharedSession,
    system::relay::CrlfWriter,
};

// --- Stage Streams ---

/// The three streams an internal command runs with.
///
/// Terminal-bound outputs are wrapped so `\n` reaches the raw-mode terminal as `\r\n`;
/// pipes and files receive bytes unchanged.
pub struct StageIo {
    pub stdin: Box<dyn Read + Send>,
    pub stdout: Box<dyn Write + Send>,
    pub stderr: Box<dyn Write + Send>,
}

impl StageIo {
    pub fn new(stdin: StageInput, stdout: StageOutput, stderr: StageOutput) -> Self {
        Self {
            stdin: match stdin {
                StageInput::Terminal => Box::new(io::stdin()),
                StageInput::Pipe(reader) => Box::new(reader),
                StageInput::File(file) => Box::new(file),
            },
            stdout: writer_for(stdout, || Box::new(CrlfWriter::new(io::stdout()))),
            stderr: error_writer(stderr),
        }
    }

    /// In-memory streams, for tests and for commands that run detached from a stage.
    pub fn from_parts(
        stdin: Box<dyn Read + Send>,
        stdout: Box<dyn Write + Send>,
        stderr: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            stdin,
            stdout,
            stderr,
        }
    }
}

fn writer_for(
    output: StageOutput,
    terminal: impl FnOnce() -> Box<dyn Write + Send>,
) -> Box<dyn Write + Send> {
    match output {
        StageOutput::Terminal => terminal(),
        StageOutput::Pipe(writer) => Box::new(writer),
        StageOutput::File(file) => Box::new(file),
    }
}

/// A writer for a stage's error stream, used on its own when the stage never starts.
pub fn error_writer(output: StageOutput) -> Box<dyn Write + Send> {
    writer_for(output, || Box::new(CrlfWriter::new(io::stderr())))
}

impl fmt::Debug for StageIo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageIo").finish_non_exhaustive()
    }
}

// --- Command Definition and Registry ---

/// The universal signature of an internal command.
///
/// A returned error is reported on the stage's error stream as `<name>: <error>`.
pub type BuiltinHandler = fn(&[String], &mut StageIo, &SharedSession) -> Result<()>;

/// Defines an internal command and its handler.
#[derive(Clone, Copy)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub handler: BuiltinHandler,
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// The single source of truth for all internal commands.
pub static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "cd",
        usage: "cd [dir]",
        description: "Change the working directory (default: home).",
        handler: handlers::cd::handle,
    },
    CommandDefinition {
        name: "echo",
        usage: "echo [arg...]",
        description: "Print the arguments separated by spaces.",
        handler: handlers::echo::handle,
    },
    CommandDefinition {
        name: "exit",
        usage: "exit [code]",
        description: "Leave the interpreter with the given status (default: 0).",
        handler: handlers::exit::handle,
    },
    CommandDefinition {
        name: "help",
        usage: "help",
        description: "List the internal commands.",
        handler: handlers::help::handle,
    },
    CommandDefinition {
        name: "history",
        usage: "history [n] | history -r|-w|-a <file>",
        description: "Show, read, write or append the command history.",
        handler: handlers::history::handle,
    },
    CommandDefinition {
        name: "pwd",
        usage: "pwd",
        description: "Print the working directory.",
        handler: handlers::pwd::handle,
    },
    CommandDefinition {
        name: "type",
        usage: "type <name>...",
        description: "Tell whether each name is an internal command or where it is on PATH.",
        handler: handlers::type_cmd::handle,
    },
];

/// Finds a command definition in the static registry by its name.
pub fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY.iter().find(|cmd| cmd.name == name)
}

/// The set of internal commands one executor run dispatches against.
///
/// Normally just the static registry; tests extend it with their own commands.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Vec<CommandDefinition>,
}

impl Registry {
    pub fn builtin() -> Self {
        Self {
            commands: COMMAND_REGISTRY.to_vec(),
        }
    }

    /// Adds a command, replacing any existing one with the same name.
    pub fn with_command(mut self, definition: CommandDefinition) -> Self {
        self.commands.retain(|cmd| cmd.name != definition.name);
        self.commands.push(definition);
        self
    }

    pub fn find(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.iter().find(|cmd| cmd.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|cmd| cmd.name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &[String], _: &mut StageIo, _: &SharedSession) -> Result<()> {
        Ok(())
    }

    #[test]
    fn test_required_commands_are_registered() {
        for name in ["exit", "echo", "type", "pwd", "cd", "help", "history"] {
            assert!(find_command(name).is_some(), "{name}");
        }
        assert!(find_command("ls").is_none());
    }

    #[test]
    fn test_registry_extension() {
        let registry = Registry::builtin().with_command(CommandDefinition {
            name: "noop",
            usage: "noop",
            description: "Does nothing.",
            handler: noop,
        });
        assert!(registry.find("noop").is_some());
        assert!(registry.find("echo").is_some());
        assert_eq!(registry.names().count(), COMMAND_REGISTRY.len() + 1);

        let replaced = registry.with_command(CommandDefinition {
            name: "echo",
            usage: "echo",
            description: "Replaced.",
            handler: noop,
        });
        assert_eq!(replaced.find("echo").unwrap().description, "Replaced.");
        assert_eq!(replaced.names().count(), COMMAND_REGISTRY.len() + 1);
    }
}
