// src/core/completion.rs

use crate::system::search_path::SearchPath;
use std::collections::BTreeSet;

/// Source of command-name completions for the line editor.
pub trait Completer {
    /// Every completable name that starts with `prefix`, deduplicated and sorted.
    fn candidates(&self, prefix: &str) -> Vec<String>;
}

/// Completes internal command names and executables found on the search path.
#[derive(Debug, Clone)]
pub struct CommandCompleter {
    builtin_names: Vec<String>,
    search_path: Option<SearchPath>,
}

impl CommandCompleter {
    /// The search path is read from `PATH` on every request, so changes made by child
    /// processes or the user are picked up.
    pub fn new<I, S>(builtin_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            builtin_names: builtin_names.into_iter().map(Into::into).collect(),
            search_path: None,
        }
    }

    /// Pins the completer to a fixed search path.
    pub fn with_search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = Some(search_path);
        self
    }
}

impl Completer for CommandCompleter {
    fn candidates(&self, prefix: &str) -> Vec<String> {
        let external = match &self.search_path {
            Some(search_path) => search_path.names_with_prefix(prefix),
            None => SearchPath::from_env().names_with_prefix(prefix),
        };
        self.builtin_names
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .chain(external)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Completer for [&str] {
    fn candidates(&self, prefix: &str) -> Vec<String> {
        self.iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| name.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// The longest byte prefix shared by every candidate.
///
/// Comparison runs over all candidates at once and stops at the first mismatch or at
/// the end of the shortest one, so the result does not depend on input order. A cut
/// that would split a multi-byte character is moved back to the previous boundary.
pub fn longest_common_prefix<S: AsRef<str>>(candidates: &[S]) -> String {
    let Some((first, rest)) = candidates.split_first() else {
        return String::new();
    };
    let first = first.as_ref();

    let mut len = 0;
    'scan: for (index, byte) in first.bytes().enumerate() {
        for other in rest {
            if other.as_ref().as_bytes().get(index) != Some(&byte) {
                break 'scan;
            }
        }
        len = index + 1;
    }

    while !first.is_char_boundary(len) {
        len -= 1;
    }
    first.get(..len).unwrap_or_default().to_string()
}
