// src/state.rs

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Process-wide facts the interpreter carries from one line to the next.
///
/// Internal commands receive it through [`SharedSession`]; the line editor only ever
/// reads `history`.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    /// Every submitted non-blank line, oldest first.
    pub history: Vec<String>,
    /// Index of the first `history` entry not yet written to the history file.
    pub history_saved_up_to: usize,
    pub current_dir: PathBuf,
    pub home_dir: Option<PathBuf>,
    /// Set by `exit`; the driver leaves the loop once this holds a value.
    pub exit_code: Option<i32>,
    pub history_file: Option<PathBuf>,
}

impl SessionState {
    pub fn new(current_dir: PathBuf, home_dir: Option<PathBuf>) -> Self {
        Self {
            current_dir,
            home_dir,
            ..Self::default()
        }
    }

    /// Records a submitted line. Blank lines are not history.
    pub fn record(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.history.push(line.to_string());
        }
    }

    /// The entries added since the last save, advancing the save mark past them.
    pub fn take_unsaved(&mut self) -> Vec<String> {
        let start = self.history_saved_up_to.min(self.history.len());
        self.history_saved_up_to = self.history.len();
        self.history.get(start..).map(<[String]>::to_vec).unwrap_or_default()
    }
}

/// The session handle shared between the driver and concurrently running commands.
pub type SharedSession = Arc<Mutex<SessionState>>;

pub fn new_shared(state: SessionState) -> SharedSession {
    Arc::new(Mutex::new(state))
}

/// Locks the session. A command that panicked while holding the lock leaves the
/// state as it was, so poisoning is ignored.
pub fn lock(session: &SharedSession) -> MutexGuard<'_, SessionState> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
