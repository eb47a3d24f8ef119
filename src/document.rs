// src/document.rs - A single open document (one tab)

use log::debug;
use ropey::Rope;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Title shown for documents that have never been saved.
pub const UNTITLED: &str = "Untitled";

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DocumentError {
    pub(crate) fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => DocumentError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => DocumentError::PermissionDenied(path.to_path_buf()),
            _ => DocumentError::Io(err),
        }
    }
}

/// Text plus the per-tab view state that survives a restart.
///
/// The cursor is a character offset and never exceeds the text length; every
/// mutator re-clamps it.
#[derive(Debug, Clone)]
pub struct Document {
    text: Rope,
    path: Option<PathBuf>,
    modified: bool,
    cursor: usize,
    scroll_y: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            text: Rope::new(),
            path: None,
            modified: false,
            cursor: 0,
            scroll_y: 0.0,
        }
    }

    /// Build a document from untrusted parts (a session file), clamping the
    /// cursor and scroll offset into range.
    pub fn from_parts(
        text: &str,
        path: Option<PathBuf>,
        modified: bool,
        cursor: usize,
        scroll_y: f64,
    ) -> Self {
        let mut doc = Self {
            text: Rope::from_str(text),
            path,
            modified,
            cursor: 0,
            scroll_y: 0.0,
        };
        doc.set_cursor(cursor);
        doc.set_scroll(scroll_y);
        doc
    }

    /// Read `path` from disk. Bytes that are not valid UTF-8 are replaced
    /// rather than failing the load.
    pub fn load_from_file(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|e| DocumentError::from_io(e, path))?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                debug!(
                    "{} is not valid UTF-8, decoding lossily",
                    path.display()
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };

        Ok(Self {
            text: Rope::from_str(&content),
            path: Some(path.to_path_buf()),
            modified: false,
            cursor: 0,
            scroll_y: 0.0,
        })
    }

    /// Write the text to `path`, creating parent directories, and adopt
    /// `path` as this document's location.
    pub fn save_to_file(&mut self, path: &Path) -> Result<(), DocumentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| DocumentError::from_io(e, parent))?;
        }
        fs::write(path, self.text.to_string()).map_err(|e| DocumentError::from_io(e, path))?;
        self.path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.text.len_chars() == 0
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn modified(&self) -> bool {
        self.modified
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn title(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Tab label: the title with a trailing marker while unsaved.
    pub fn display_title(&self) -> String {
        if self.modified {
            format!("{} *", self.title())
        } else {
            self.title()
        }
    }

    /// Replace the text. Returns false (and changes nothing) when the text is
    /// identical. Cursor and scroll are kept, the cursor re-clamped.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = Rope::from_str(text);
        self.modified = true;
        self.set_cursor(self.cursor);
        true
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.text.len_chars());
    }

    pub fn set_scroll(&mut self, y: f64) {
        self.scroll_y = if y.is_finite() && y > 0.0 { y } else { 0.0 };
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// An untouched "Untitled" tab that can be silently replaced.
    pub fn is_pristine_placeholder(&self) -> bool {
        self.path.is_none() && !self.modified && self.is_empty()
    }
}
