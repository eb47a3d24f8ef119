// src/paths.rs - Path normalization and file URI helpers

use std::path::{Component, Path, PathBuf};
use url::Url;

/// Resolve `path` into the form used for open-file deduplication.
///
/// `~` is expanded, relative paths are joined onto the current directory and
/// the result is canonicalized when the file exists. When canonicalization
/// fails (missing file, permissions) the path is cleaned lexically instead, so
/// two spellings of a not-yet-created file still compare equal.
pub fn normalize_path(path: &Path) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    };

    match std::fs::canonicalize(&absolute) {
        Ok(resolved) => resolved,
        Err(_) => clean_lexically(&absolute),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => match dirs::home_dir() {
            Some(home) => home.join(components.as_path()),
            None => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

fn clean_lexically(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, like `cd /..`
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Encode an absolute path as a `file://` URI.
pub fn to_file_uri(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(|url| url.to_string())
}

/// Accept either a `file:` URI (as handed out by file dialogs and the
/// single-instance channel) or a plain path. Empty input yields `None`.
pub fn parse_path_or_uri(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("file:") {
        return Url::parse(trimmed).ok()?.to_file_path().ok();
    }

    Some(PathBuf::from(trimmed))
}
