// src/core/line_editor.rs

use crate::core::completion::{Completer, longest_common_prefix};
use std::io::{self, ErrorKind, Read, Write};
use thiserror::Error;

// --- Control Bytes ---

const ETX: u8 = 0x03; // Ctrl+C
const EOT: u8 = 0x04; // Ctrl+D
const BEL: &[u8] = b"\x07";
const BACKSPACE: u8 = 0x08;
const TAB: u8 = b'\t';
const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Moves the cursor to column 0 and clears the row.
const CLEAR_LINE: &[u8] = b"\r\x1b[K";
/// Steps back one column, blanks it, and steps back again.
const ERASE_COLUMN: &[u8] = b"\x08 \x08";

/// Why `read_line` returned without a line.
#[derive(Error, Debug)]
pub enum ReadLineError {
    #[error("Line input was interrupted.")]
    Interrupted,
    #[error("End of input.")]
    EndOfInput,
    #[error("Could not read from the terminal: {0}")]
    Io(#[from] io::Error),
}

/// State scoped to a single `read_line` call.
#[derive(Debug, Default)]
struct EditState {
    /// Exactly what is rendered after the prompt.
    buffer: Vec<u8>,
    /// `None` while not browsing history, otherwise an index into it.
    history_index: Option<usize>,
    /// The line being composed when history browsing started.
    draft: Vec<u8>,
    /// Whether the previous keystroke was a completion request that left several candidates.
    pending_completion: bool,
}

/// A raw-mode line reader with completion and history recall.
///
/// It reads one byte per keystroke from `input` and echoes to `output`, which is
/// expected to be a terminal with automatic echo and carriage returns disabled.
#[derive(Debug)]
pub struct LineEditor<R, W> {
    input: R,
    output: W,
    prompt: String,
}

impl<R: Read, W: Write> LineEditor<R, W> {
    /// Creates an editor reading keystrokes from `input` and echoing to `output`.
    pub fn new(input: R, output: W, prompt: impl Into<String>) -> Self {
        Self {
            input,
            output,
            prompt: prompt.into(),
        }
    }

    /// Replaces the prompt shown by the next `read_line`.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// The prompt as printed, color codes included.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The terminal the editor echoes to, for output printed outside of line editing.
    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    /// Gives back the input and output streams.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Prints the prompt and edits a line until Enter is pressed.
    ///
    /// `history` is only read, never modified; the caller decides what gets recorded.
    ///
    /// # Errors
    /// - [`ReadLineError::Interrupted`] on Ctrl+C; the partial line is discarded.
    /// - [`ReadLineError::EndOfInput`] when the input is exhausted, or on Ctrl+D with an
    ///   empty line.
    pub fn read_line<C>(&mut self, history: &[String], completer: &C) -> Result<String, ReadLineError>
    where
        C: Completer + ?Sized,
    {
        let mut state = EditState::default();
        self.emit(self.prompt.clone().as_bytes())?;

        loop {
            let byte = self.next_byte()?;
            match byte {
                b'\r' | b'\n' => {
                    self.emit(b"\r\n")?;
                    return Ok(String::from_utf8_lossy(&state.buffer).into_owned());
                }
                ETX => {
                    self.emit(b"^C\r\n")?;
                    return Err(ReadLineError::Interrupted);
                }
                EOT if state.buffer.is_empty() => {
                    self.emit(b"\r\n")?;
                    return Err(ReadLineError::EndOfInput);
                }
                TAB => self.complete(&mut state, completer)?,
                BACKSPACE | DEL => {
                    state.pending_completion = false;
                    self.backspace(&mut state)?;
                }
                ESC => {
                    state.pending_completion = false;
                    self.escape_sequence(&mut state, history)?;
                }
                b if b >= 0x20 => {
                    state.pending_completion = false;
                    self.insert(&mut state, &[b])?;
                }
                other => log::trace!("Ignoring control byte {:#04x}.", other),
            }
        }
    }

    // --- Keystroke Handlers ---

    fn insert(&mut self, state: &mut EditState, bytes: &[u8]) -> io::Result<()> {
        state.buffer.extend_from_slice(bytes);
        self.emit(bytes)
    }

    fn backspace(&mut self, state: &mut EditState) -> io::Result<()> {
        if state.buffer.is_empty() {
            return Ok(());
        }
        // Drop a whole UTF-8 sequence so the buffer never holds half a character.
        while let Some(byte) = state.buffer.pop() {
            if byte & 0xc0 != 0x80 {
                break;
            }
        }
        self.emit(ERASE_COLUMN)
    }

    fn complete<C>(&mut self, state: &mut EditState, completer: &C) -> io::Result<()>
    where
        C: Completer + ?Sized,
    {
        let prefix = String::from_utf8_lossy(&state.buffer).into_owned();
        let candidates = completer.candidates(&prefix);
        log::debug!("{} completion candidate(s) for {:?}.", candidates.len(), prefix);

        match candidates.as_slice() {
            [] => {
                state.pending_completion = false;
                self.emit(BEL)
            }
            [only] => {
                state.pending_completion = false;
                state.buffer = format!("{only} ").into_bytes();
                self.redraw(state)
            }
            many if state.pending_completion => {
                let listing = format!("\r\n{}\r\n", many.join("  "));
                self.emit(listing.as_bytes())?;
                self.redraw(state)
            }
            many => {
                // A following Tab lists the candidates, partial completion or not.
                state.pending_completion = true;
                self.emit(BEL)?;
                let common = longest_common_prefix(many);
                if common.len() > state.buffer.len() {
                    state.buffer = common.into_bytes();
                    self.redraw(state)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Handles `ESC [ A` / `ESC [ B`. Anything else is inserted literally.
    fn escape_sequence(&mut self, state: &mut EditState, history: &[String]) -> Result<(), ReadLineError> {
        let second = self.next_byte()?;
        if second != b'[' {
            self.insert(state, &[ESC, second])?;
            return Ok(());
        }
        match self.next_byte()? {
            b'A' => self.history_up(state, history)?,
            b'B' => self.history_down(state, history)?,
            other => self.insert(state, &[ESC, b'[', other])?,
        }
        Ok(())
    }

    fn history_up(&mut self, state: &mut EditState, history: &[String]) -> io::Result<()> {
        let index = match state.history_index {
            Some(index) => index,
            None => history.len(),
        };
        let Some(entry) = index.checked_sub(1).and_then(|i| history.get(i).map(|e| (i, e))) else {
            return self.emit(BEL);
        };
        if state.history_index.is_none() {
            state.draft = std::mem::take(&mut state.buffer);
        }
        let (new_index, line) = entry;
        state.history_index = Some(new_index);
        state.buffer = line.as_bytes().to_vec();
        self.redraw(state)
    }

    fn history_down(&mut self, state: &mut EditState, history: &[String]) -> io::Result<()> {
        let Some(index) = state.history_index else {
            return self.emit(BEL);
        };
        match history.get(index + 1) {
            Some(line) => {
                state.history_index = Some(index + 1);
                state.buffer = line.as_bytes().to_vec();
            }
            None => {
                state.history_index = None;
                state.buffer = std::mem::take(&mut state.draft);
            }
        }
        self.redraw(state)
    }

    // --- Terminal I/O ---

    fn redraw(&mut self, state: &EditState) -> io::Result<()> {
        let mut frame = Vec::with_capacity(CLEAR_LINE.len() + self.prompt.len() + state.buffer.len());
        frame.extend_from_slice(CLEAR_LINE);
        frame.extend_from_slice(self.prompt.as_bytes());
        frame.extend_from_slice(&state.buffer);
        self.emit(&frame)
    }

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)?;
        self.output.flush()
    }

    fn next_byte(&mut self) -> Result<u8, ReadLineError> {
        let mut byte = [0u8; 1];
        loop {
            match self.input.read(&mut byte) {
                Ok(0) => return Err(ReadLineError::EndOfInput),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
