// Common test utilities for document-set and session tests

use smarttext::document_set::DocumentSet;
use smarttext::editor::Editor;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Utilities for creating files on disk to open
pub mod fixtures {
    use super::*;

    /// A temp directory holding `files` as (name, content) pairs.
    /// Returns the directory guard and the absolute path of each file.
    #[allow(dead_code)]
    pub fn workspace_with(files: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
        let temp_dir = TempDir::new().unwrap();
        let paths = files
            .iter()
            .map(|(name, content)| {
                let path = temp_dir.path().join(name);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).unwrap();
                }
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        (temp_dir, paths)
    }

    /// Editor with every path opened in order.
    #[allow(dead_code)]
    pub fn editor_with_open(paths: &[PathBuf]) -> Editor {
        let mut editor = Editor::new();
        for path in paths {
            editor.open(&path.to_string_lossy()).unwrap();
        }
        editor.take_events();
        editor
    }
}

/// Validation utilities for checking invariants
pub mod validation {
    use super::*;

    /// Assert the set is non-empty, the index valid and every cursor in range
    #[allow(dead_code)]
    pub fn assert_set_valid(set: &DocumentSet) {
        assert!(set.len() >= 1, "Document set must never be empty");
        assert!(
            set.current_index() < set.len(),
            "Current index {} out of bounds (len: {})",
            set.current_index(),
            set.len()
        );
        for (i, doc) in set.iter().enumerate() {
            assert!(
                doc.cursor() <= doc.len_chars(),
                "Cursor {} past end of document {} (len: {})",
                doc.cursor(),
                i,
                doc.len_chars()
            );
            assert!(doc.scroll_y() >= 0.0, "Negative scroll in document {}", i);
        }
    }
}
