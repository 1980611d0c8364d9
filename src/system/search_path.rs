// src/system/search_path.rs

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// The ordered list of directories searched for external commands.
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Reads the directory list from the `PATH` environment variable.
    pub fn from_env() -> Self {
        Self::from_path_var(env::var_os("PATH").as_deref())
    }

    pub fn from_path_var(path_var: Option<&OsStr>) -> Self {
        let dirs = path_var
            .map(|value| env::split_paths(value).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Locates an executable by name. The first directory holding a non-directory entry
    /// with that name wins. Names containing a `/` are taken as paths and not searched.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        if name.contains('/') {
            let candidate = PathBuf::from(name);
            return is_command_file(&candidate).then_some(candidate);
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_command_file(candidate))
    }

    /// Every entry name starting with `prefix` across all readable directories.
    ///
    /// Unreadable or missing directories are skipped. The result may contain duplicates
    /// when the same name lives in several directories.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut names = Vec::new();
        for dir in &self.dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                log::trace!("Skipping unreadable search directory '{}'.", dir.display());
                continue;
            };
            for entry in entries.flatten() {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if name.starts_with(prefix) && is_command_file(&entry.path()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// A command candidate is anything that exists and is not a directory.
fn is_command_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|meta| !meta.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "#!/bin/sh\n").unwrap();
    }

    #[test]
    fn test_first_match_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(second.path(), "tool");
        touch(first.path(), "tool");

        let search = SearchPath::new(vec![first.path().into(), second.path().into()]);
        assert_eq!(search.find("tool"), Some(first.path().join("tool")));
        assert_eq!(search.find("missing"), None);
    }

    #[test]
    fn test_directories_are_not_commands() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        let search = SearchPath::new(vec![dir.path().into()]);
        assert_eq!(search.find("subdir"), None);
        assert!(search.names_with_prefix("sub").is_empty());
    }

    #[test]
    fn test_names_with_prefix_skips_bad_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "git-push");
        touch(dir.path(), "git-pull");
        touch(dir.path(), "grep");

        let search = SearchPath::new(vec![
            dir.path().join("nope"),
            dir.path().into(),
        ]);
        let mut names = search.names_with_prefix("git-");
        names.sort();
        assert_eq!(names, vec!["git-pull", "git-push"]);
    }

    #[test]
    fn test_path_var_parsing_and_explicit_paths() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "script.sh");
        let joined = env::join_paths([dir.path(), Path::new("/nonexistent")]).unwrap();

        let search = SearchPath::from_path_var(Some(&joined));
        assert_eq!(search.dirs().len(), 2);

        let explicit = dir.path().join("script.sh");
        let explicit_str = explicit.to_string_lossy();
        assert_eq!(search.find(&explicit_str), Some(explicit.clone()));
        assert!(SearchPath::from_path_var(None).dirs().is_empty());
    }
}
