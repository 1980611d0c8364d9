// src/system/terminal.rs

use nix::sys::termios::{self, SetArg, Termios};
use std::io::{self, IsTerminal};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Standard input is not a terminal.")]
    NotATerminal,
    #[error("Could not change terminal attributes: {0}")]
    Attributes(#[from] nix::errno::Errno),
}

/// Proof that standard input was switched to raw mode, holding the attributes to go back to.
///
/// Restoring is explicit; callers pair [`enable_raw_mode`] with a scope guard so the
/// terminal is handed back on every exit path.
#[derive(Debug)]
pub struct RawMode {
    original: Termios,
}

/// Puts standard input in raw mode: no line buffering, no echo, no signal keys, and no
/// output post-processing (so `\n` is not turned into `\r\n` by the driver).
pub fn enable_raw_mode() -> Result<RawMode, TerminalError> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(TerminalError::NotATerminal);
    }

    let original = termios::tcgetattr(&stdin)?;
    let mut raw = original.clone();
    termios::cfmakeraw(&mut raw);
    termios::tcsetattr(&stdin, SetArg::TCSAFLUSH, &raw)?;
    log::debug!("Terminal switched to raw mode.");

    Ok(RawMode { original })
}

impl RawMode {
    /// Reapplies the attributes captured when raw mode was enabled.
    pub fn restore(&self) -> Result<(), TerminalError> {
        termios::tcsetattr(&io::stdin(), SetArg::TCSAFLUSH, &self.original)?;
        log::debug!("Terminal attributes restored.");
        Ok(())
    }
}
