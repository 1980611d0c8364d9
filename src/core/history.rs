// src/core/history.rs

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Reads a history file, one entry per non-empty line.
///
/// A file that does not exist holds no history and is not an error.
pub fn load(path: &Path) -> io::Result<Vec<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No history file at '{}'.", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };
    let entries: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();
    log::debug!("Loaded {} history entries from '{}'.", entries.len(), path.display());
    Ok(entries)
}

/// Appends entries to the file, creating it if needed.
pub fn append(path: &Path, entries: &[String]) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_entries(file, entries)?;
    log::debug!("Appended {} history entries to '{}'.", entries.len(), path.display());
    Ok(())
}

/// Replaces the file's content with the given entries.
pub fn write(path: &Path, entries: &[String]) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    write_entries(file, entries)?;
    log::debug!("Wrote {} history entries to '{}'.", entries.len(), path.display());
    Ok(())
}

fn write_entries(file: fs::File, entries: &[String]) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for entry in entries {
        writeln!(writer, "{entry}")?;
    }
    writer.flush()
}
