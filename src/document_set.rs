// src/document_set.rs - Ordered set of open documents (the tab list)

use crate::document::{Document, DocumentError};
use crate::paths::normalize_path;
use log::debug;
use std::path::Path;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentSetError {
    #[error("Index {index} out of range ({len} documents open)")]
    OutOfRange { index: usize, len: usize },
    #[error("Refusing to remove the last open document")]
    LastDocument,
}

/// How an open request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The path was already open; only the selection moved.
    Switched(usize),
    /// An untouched "Untitled" tab was overwritten in place.
    ReplacedPlaceholder(usize),
    /// A new tab was appended.
    Appended(usize),
}

impl OpenOutcome {
    pub fn index(&self) -> usize {
        match *self {
            OpenOutcome::Switched(i) | OpenOutcome::ReplacedPlaceholder(i) | OpenOutcome::Appended(i) => i,
        }
    }

    pub fn changed_tab_list(&self) -> bool {
        !matches!(self, OpenOutcome::Switched(_))
    }
}

/// Sole owner of the open documents. Other components refer to documents by
/// index only.
///
/// Never empty; `current` is always a valid index.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    docs: Vec<Document>,
    current: usize,
}

impl Default for DocumentSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSet {
    /// A set holding one empty placeholder document.
    pub fn new() -> Self {
        Self {
            docs: vec![Document::new()],
            current: 0,
        }
    }

    /// Build from restored documents. An empty list seeds a placeholder and an
    /// out-of-range index falls back to 0.
    pub fn from_documents(docs: Vec<Document>, current: usize) -> Self {
        let mut set = Self { docs, current };
        if set.docs.is_empty() {
            set.docs.push(Document::new());
        }
        set.fix_current();
        set
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// A live set is never empty.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Document {
        &self.docs[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Document {
        &mut self.docs[self.current]
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.docs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    /// Append without touching the selection.
    pub fn add(&mut self, doc: Document) -> usize {
        self.docs.push(doc);
        self.docs.len() - 1
    }

    /// Select `index`. Returns true only when the selection actually moved,
    /// in which case everything observers derive from the current document
    /// is stale.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index >= self.docs.len() || index == self.current {
            return false;
        }
        self.current = index;
        true
    }

    pub fn remove(&mut self, index: usize) -> Result<Document, DocumentSetError> {
        let len = self.docs.len();
        if index >= len {
            return Err(DocumentSetError::OutOfRange { index, len });
        }
        if len == 1 {
            return Err(DocumentSetError::LastDocument);
        }

        let removed = self.docs.remove(index);
        if index == self.current {
            self.current = index.min(self.docs.len() - 1);
        } else if index < self.current {
            self.current -= 1;
        }
        self.fix_current();
        Ok(removed)
    }

    /// Drop everything and start over with one placeholder.
    pub fn reset(&mut self) {
        self.docs.clear();
        self.docs.push(Document::new());
        self.current = 0;
    }

    pub fn find_by_path(&self, path: &Path) -> Option<usize> {
        let wanted = normalize_path(path);
        self.docs.iter().position(|doc| {
            doc.path()
                .map(|p| normalize_path(p) == wanted)
                .unwrap_or(false)
        })
    }

    pub fn find_pristine_placeholder(&self) -> Option<usize> {
        self.docs.iter().position(Document::is_pristine_placeholder)
    }

    /// Open `path`, or switch to it when it is already open.
    ///
    /// A file that is already open is never re-read. New files take over a
    /// pristine placeholder tab if there is one, otherwise they are appended.
    /// Either way the opened document becomes current with its cursor at 0.
    pub fn open_or_switch(&mut self, path: &Path) -> Result<OpenOutcome, DocumentError> {
        let normalized = normalize_path(path);

        if let Some(index) = self.find_by_path(&normalized) {
            debug!("{} already open at tab {}", normalized.display(), index);
            self.set_current(index);
            return Ok(OpenOutcome::Switched(index));
        }

        let mut doc = Document::load_from_file(&normalized)?;
        doc.set_cursor(0);

        let outcome = match self.find_pristine_placeholder() {
            Some(index) => {
                self.docs[index] = doc;
                OpenOutcome::ReplacedPlaceholder(index)
            }
            None => OpenOutcome::Appended(self.add(doc)),
        };
        self.set_current(outcome.index());
        Ok(outcome)
    }

    /// Replace the text of document `index`. No-op when unchanged.
    pub fn update_text(&mut self, index: usize, text: &str) -> Result<bool, DocumentSetError> {
        let len = self.docs.len();
        let doc = self
            .docs
            .get_mut(index)
            .ok_or(DocumentSetError::OutOfRange { index, len })?;
        Ok(doc.set_text(text))
    }

    pub fn set_cursor(&mut self, index: usize, pos: usize) -> Result<(), DocumentSetError> {
        let len = self.docs.len();
        let doc = self
            .docs
            .get_mut(index)
            .ok_or(DocumentSetError::OutOfRange { index, len })?;
        doc.set_cursor(pos);
        Ok(())
    }

    pub fn set_scroll(&mut self, index: usize, y: f64) -> Result<(), DocumentSetError> {
        let len = self.docs.len();
        let doc = self
            .docs
            .get_mut(index)
            .ok_or(DocumentSetError::OutOfRange { index, len })?;
        doc.set_scroll(y);
        Ok(())
    }

    fn fix_current(&mut self) {
        if self.current >= self.docs.len() {
            self.current = 0;
        }
    }
}
