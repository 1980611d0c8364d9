// src/cli/handlers/type_cmd.rs

use anyhow::{Result, anyhow};
use std::io::Write;

use crate::{
    cli::dispatcher::{self, StageIo},
    state::SharedSession,
    system::search_path::SearchPath,
};

/// Reports how each name would be run. Every name is looked up even after a miss.
pub fn handle(args: &[String], io: &mut StageIo, _session: &SharedSession) -> Result<()> {
    describe(args, io, &SearchPath::from_env())
}

fn describe(names: &[String], io: &mut StageIo, search_path: &SearchPath) -> Result<()> {
    if names.is_empty() {
        return Err(anyhow!("usage: type <name>..."));
    }

    for name in names {
        if dispatcher::find_command(name).is_some() {
            writeln!(io.stdout, "{name} is a shell builtin")?;
        } else if let Some(path) = search_path.find(name) {
            writeln!(io.stdout, "{name} is {}", path.display())?;
        } else {
            writeln!(io.stderr, "type: {name}: not found")?;
        }
    }
    io.stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::test_support::{Capture, run, session};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtins_and_path_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mytool"), "").unwrap();
        let search_path = SearchPath::new(vec![dir.path().into()]);

        let stdout = Capture::default();
        let stderr = Capture::default();
        let mut io = StageIo::from_parts(
            Box::new(std::io::empty()),
            Box::new(stdout.clone()),
            Box::new(stderr.clone()),
        );
        let names: Vec<String> = ["echo", "mytool", "nosuch"].iter().map(|s| s.to_string()).collect();
        describe(&names, &mut io, &search_path).unwrap();

        let expected = format!(
            "echo is a shell builtin\nmytool is {}\n",
            dir.path().join("mytool").display()
        );
        assert_eq!(stdout.text(), expected);
        assert_eq!(stderr.text(), "type: nosuch: not found\n");
    }

    #[test]
    fn test_type_requires_a_name() {
        assert!(run(handle, &[], &session()).result.is_err());
    }
}
