//! # System Interaction Layer
//!
//! This module provides abstractions for interacting with the underlying operating system.
//! It serves as a boundary between the parsing logic in `core` and the specifics of
//! terminals, processes and the search path.
//!
//! ## Modules
//!
//! - **`terminal`**: Switches standard input to raw mode and restores it.
//! - **`search_path`**: Looks up external commands in the `PATH` directories.
//! - **`relay`**: Copies child output to the terminal, turning `\n` into `\r\n`.
//! - **`executor`**: Runs the stages of a pipeline concurrently and joins them.
//! - **`shell`**: The interactive loop tying the line editor, parser and executor together.

pub mod executor;
pub mod relay;
pub mod search_path;
pub mod shell;
pub mod terminal;
