// src/models.rs

use os_pipe::{PipeReader, PipeWriter};
use std::fmt;
use std::fs::File;
use std::io;
use std::process::Stdio;
use thiserror::Error;

// --- Parse-time Errors ---

/// Everything that can go wrong between the raw line and a runnable [`Pipeline`].
///
/// These abort only the current line; the interpreter reports them and reads the next one.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{quote}: missing closing quote")]
    UnterminatedQuote { quote: char },
    #[error("|: syntax error, empty pipeline segment")]
    EmptyPipelineSegment,
    #[error("{token}: {reason}")]
    InvalidRedirectPlacement { token: String, reason: &'static str },
    #[error("{token}: expected a file name")]
    MissingRedirectTarget { token: String },
    #[error("{token}: {path}: {source}")]
    RedirectTargetUnavailable {
        token: String,
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("|: could not create pipe: {0}")]
    PipeCreationFailed(#[source] io::Error),
}

// --- Words ---

/// One word of a tokenized line, with its quotes and escapes already removed.
///
/// `quoted` is set when any part of the word came from quotes or a backslash escape.
/// Such a word is always an ordinary argument, even if it reads `|` or `>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The text with quotes and escapes removed.
    pub text: String,
    /// Whether any part of the word was quoted or escaped.
    pub quoted: bool,
}

impl Word {
    /// A word typed without any quoting.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// A word with at least one quoted or escaped character.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    /// Whether this word separates pipeline stages.
    pub fn is_pipe(&self) -> bool {
        !self.quoted && self.text == PIPE
    }

    /// The redirection this word spells, if it is a bare operator.
    pub fn redirect_operator(&self) -> Option<RedirectOperator> {
        if self.quoted {
            return None;
        }
        RedirectOperator::parse(&self.text)
    }

    /// The word's text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Takes the text out of the word.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl PartialEq<&str> for Word {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The bare word that separates pipeline stages.
pub const PIPE: &str = "|";

// --- Redirection Vocabulary ---

/// The redirection operators understood by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOperator {
    /// `<`
    Input,
    /// `>` or `1>`
    Output { append: bool },
    /// `2>` or `2>>`
    Error { append: bool },
    /// `&>` or `&>>`
    Both { append: bool },
}

impl RedirectOperator {
    /// Recognizes a token as an operator. Anything else is an ordinary argument.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "<" => Some(Self::Input),
            ">" | "1>" => Some(Self::Output { append: false }),
            ">>" | "1>>" => Some(Self::Output { append: true }),
            "2>" => Some(Self::Error { append: false }),
            "2>>" => Some(Self::Error { append: true }),
            "&>" => Some(Self::Both { append: false }),
            "&>>" => Some(Self::Both { append: true }),
            _ => None,
        }
    }

    /// Whether this operator rebinds the stage's standard output.
    pub fn binds_stdout(&self) -> bool {
        matches!(self, Self::Output { .. } | Self::Both { .. })
    }
}

// --- Stage Handles ---

/// Where a stage reads its standard input from.
#[derive(Debug, Default)]
pub enum StageInput {
    /// The interpreter's own (inherited) terminal input.
    #[default]
    Terminal,
    /// Read end of the pipe fed by the previous stage.
    Pipe(PipeReader),
    /// A file opened by a `<` redirection.
    File(File),
}

impl StageInput {
    /// Whether the stage reads from the previous stage.
    pub fn is_pipe(&self) -> bool {
        matches!(self, Self::Pipe(_))
    }

    /// Converts the handle for a child process. The terminal is inherited.
    pub fn into_stdio(self) -> Stdio {
        match self {
            Self::Terminal => Stdio::inherit(),
            Self::Pipe(reader) => reader.into(),
            Self::File(file) => file.into(),
        }
    }
}

/// Where a stage writes its standard output or standard error.
#[derive(Debug, Default)]
pub enum StageOutput {
    /// The interpreter's terminal. Output bound here needs `\n` -> `\r\n` translation.
    #[default]
    Terminal,
    /// Write end of the pipe feeding the next stage.
    Pipe(PipeWriter),
    /// A file opened by an output redirection.
    File(File),
}

impl StageOutput {
    /// Whether the stream feeds the next stage.
    pub fn is_pipe(&self) -> bool {
        matches!(self, Self::Pipe(_))
    }

    /// Whether the stream still goes to the interpreter's terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Duplicates the underlying descriptor, if any.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(match self {
            Self::Terminal => Self::Terminal,
            Self::Pipe(writer) => Self::Pipe(writer.try_clone()?),
            Self::File(file) => Self::File(file.try_clone()?),
        })
    }
}

// --- Pipeline ---

/// One command of a pipeline together with its resolved I/O bindings.
#[derive(Debug)]
pub struct Stage {
    /// Program or internal-command identifier.
    pub name: String,
    /// Arguments after tokenization and, once resolved, with redirections stripped.
    pub args: Vec<Word>,
    /// Standard input binding.
    pub stdin: StageInput,
    /// Standard output binding.
    pub stdout: StageOutput,
    /// Standard error binding.
    pub stderr: StageOutput,
}

impl Stage {
    /// A stage bound to the terminal on all three streams.
    pub fn new(name: impl Into<String>, args: Vec<Word>) -> Self {
        Self {
            name: name.into(),
            args,
            stdin: StageInput::Terminal,
            stdout: StageOutput::Terminal,
            stderr: StageOutput::Terminal,
        }
    }
}

/// The chain of stages built from one submitted line, in pipeline order.
///
/// Stage `i` feeds stage `i + 1`; the last stage is the terminal stage. Dropping the
/// pipeline closes every handle it still owns.
#[derive(Debug, Default)]
pub struct Pipeline {
    /// The stages, first to last.
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The stages in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }
}

impl IntoIterator for Pipeline {
    type Item = Stage;
    type IntoIter = std::vec::IntoIter<Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_vocabulary() {
        for token in ["<", ">", "1>", "2>", "&>", ">>", "1>>", "2>>", "&>>"] {
            assert!(RedirectOperator::parse(token).is_some(), "{token}");
        }
        assert_eq!(RedirectOperator::parse("1>"), RedirectOperator::parse(">"));
        assert_eq!(RedirectOperator::parse("3>"), None);
        assert_eq!(RedirectOperator::parse("|"), None);
    }

    #[test]
    fn test_error_messages_lead_with_token() {
        let err = ParseError::MissingRedirectTarget { token: "1>>".into() };
        assert_eq!(err.to_string(), "1>>: expected a file name");

        let err = ParseError::UnterminatedQuote { quote: '"' };
        assert!(err.to_string().starts_with("\":"));
    }

    #[test]
    fn test_quoted_words_are_never_operators() {
        assert!(Word::bare("|").is_pipe());
        assert!(!Word::quoted("|").is_pipe());
        assert_eq!(
            Word::bare("2>>").redirect_operator(),
            Some(RedirectOperator::Error { append: true })
        );
        assert_eq!(Word::quoted(">").redirect_operator(), None);
        assert_eq!(Word::bare("out.txt").redirect_operator(), None);
    }
}
