// src/editor.rs - Facade between the document state and the presentation layer

use crate::command::Command;
use crate::document::{Document, DocumentError};
use crate::document_set::{DocumentSet, OpenOutcome};
use crate::paths::{normalize_path, parse_path_or_uri};
use crate::session::SessionRecord;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::PathBuf;

/// Change notifications for the presentation layer. Each one means "re-read
/// this part of the state"; none carries data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    DocumentChanged,
    TabListChanged,
    StatusMessageChanged,
    CurrentIndexChanged,
    /// `save` was asked for on a document that has no path yet.
    SaveAsRequested,
    /// Another launch forwarded a file; the window should come to front.
    ActivateRequested,
}

/// What closing the only open document does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LastTabPolicy {
    /// Reset to a single empty document and exit.
    #[default]
    ResetAndQuit,
    /// Reset to a single empty document and keep running.
    ReplaceWithEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    Replaced,
    Quit,
    NoSuchTab,
}

pub struct Editor {
    documents: DocumentSet,
    status_message: String,
    events: Vec<EditorEvent>,
    last_tab_policy: LastTabPolicy,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_policy(LastTabPolicy::default())
    }

    pub fn with_policy(last_tab_policy: LastTabPolicy) -> Self {
        Self {
            documents: DocumentSet::new(),
            status_message: "Ready".to_string(),
            events: Vec::new(),
            last_tab_policy,
        }
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn current(&self) -> &Document {
        self.documents.current()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn tab_titles(&self) -> Vec<String> {
        self.documents.iter().map(Document::display_title).collect()
    }

    /// Hand pending notifications to the presentation layer.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Returns true when the editor should shut down.
    pub fn execute_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Quit => return true,
            Command::NewFile => self.new_file(),
            Command::Open(target) => {
                let _ = self.open(&target);
            }
            Command::Save => {
                let _ = self.save();
            }
            Command::SaveAs(target) => {
                let _ = self.save_as(&target);
            }
            Command::Close(index) => {
                if self.close(index) == CloseOutcome::Quit {
                    return true;
                }
            }
            Command::SwitchTo(index) => {
                if !self.switch_to(index) && index >= self.documents.len() {
                    self.set_status(format!("No tab {}", index + 1));
                }
            }
            Command::NextTab => self.cycle_tab(true),
            Command::PrevTab => self.cycle_tab(false),
            Command::AppendLine(line) => self.append_line(&line),
            Command::SetCursor(pos) => self.set_cursor(pos),
            Command::ListTabs => self.emit(EditorEvent::TabListChanged),
            // Settings belong to the presentation layer
            Command::SetFontSize(_) | Command::SetTheme(_) | Command::SetShortcut(..) => {}
        }
        false
    }

    pub fn new_file(&mut self) {
        let index = self.documents.add(Document::new());
        self.documents.set_current(index);
        self.set_status("New file");
        self.emit(EditorEvent::TabListChanged);
        self.emit_selection_changed();
    }

    /// Open a path or `file:` URI, switching to it if it is already open.
    pub fn open(&mut self, target: &str) -> Result<OpenOutcome, DocumentError> {
        let Some(path) = parse_path_or_uri(target) else {
            self.set_status("Open cancelled / file not found");
            return Err(DocumentError::NotFound(PathBuf::new()));
        };

        match self.documents.open_or_switch(&path) {
            Ok(outcome) => {
                info!("Opened {} ({:?})", path.display(), outcome);
                let title = self.documents.current().title();
                self.set_status(format!("Opened: {}", title));
                if outcome.changed_tab_list() {
                    self.emit(EditorEvent::TabListChanged);
                }
                self.emit_selection_changed();
                Ok(outcome)
            }
            Err(err @ DocumentError::NotFound(_)) => {
                self.set_status("Open cancelled / file not found");
                Err(err)
            }
            Err(err) => {
                warn!("Open of {} failed: {}", path.display(), err);
                self.set_status(format!("Open failed: {}", err));
                Err(err)
            }
        }
    }

    /// Save the current document to its path. Returns `Ok(false)` when it
    /// has no path yet and a save-as was requested instead.
    pub fn save(&mut self) -> Result<bool, DocumentError> {
        let Some(path) = self.documents.current().path().map(|p| p.to_path_buf()) else {
            self.set_status("No path yet - use Save As");
            self.emit(EditorEvent::SaveAsRequested);
            return Ok(false);
        };
        self.write_current(path)
    }

    /// Save the current document under a new path. Empty input cancels.
    pub fn save_as(&mut self, target: &str) -> Result<bool, DocumentError> {
        let Some(path) = parse_path_or_uri(target) else {
            self.set_status("Save cancelled");
            return Ok(false);
        };
        self.write_current(normalize_path(&path))
    }

    fn write_current(&mut self, path: PathBuf) -> Result<bool, DocumentError> {
        match self.documents.current_mut().save_to_file(&path) {
            Ok(()) => {
                let title = self.documents.current().title();
                info!("Saved {}", path.display());
                self.set_status(format!("Saved: {}", title));
                self.emit(EditorEvent::DocumentChanged);
                self.emit(EditorEvent::TabListChanged);
                Ok(true)
            }
            Err(err) => {
                warn!("Save to {} failed: {}", path.display(), err);
                self.set_status(format!("Save failed: {}", err));
                Err(err)
            }
        }
    }

    /// Close tab `index` (the current one when `None`).
    ///
    /// Closing the only document resets to an empty one; whether the editor
    /// keeps running afterwards is decided by the last-tab policy.
    pub fn close(&mut self, index: Option<usize>) -> CloseOutcome {
        let index = index.unwrap_or(self.documents.current_index());
        let Some(title) = self.documents.get(index).map(Document::title) else {
            self.set_status(format!("No tab {}", index + 1));
            return CloseOutcome::NoSuchTab;
        };

        if self.documents.len() > 1 {
            let before = self.documents.current_index();
            if self.documents.remove(index).is_err() {
                return CloseOutcome::NoSuchTab;
            }
            self.set_status(format!("Closed: {}", title));
            self.emit(EditorEvent::TabListChanged);
            if index <= before {
                self.emit_selection_changed();
            }
            return CloseOutcome::Closed;
        }

        debug!("Closing the last document ({:?})", self.last_tab_policy);
        self.documents.reset();
        self.set_status(format!("Closed: {}", title));
        self.emit(EditorEvent::TabListChanged);
        self.emit_selection_changed();
        match self.last_tab_policy {
            LastTabPolicy::ResetAndQuit => CloseOutcome::Quit,
            LastTabPolicy::ReplaceWithEmpty => CloseOutcome::Replaced,
        }
    }

    pub fn switch_to(&mut self, index: usize) -> bool {
        if self.documents.set_current(index) {
            self.emit_selection_changed();
            true
        } else {
            false
        }
    }

    fn cycle_tab(&mut self, forward: bool) {
        let len = self.documents.len();
        let current = self.documents.current_index();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.switch_to(next);
    }

    /// Replace the current document's text. No-op when unchanged.
    pub fn set_text(&mut self, text: &str) {
        let index = self.documents.current_index();
        let was_modified = self.documents.current().modified();
        if let Ok(true) = self.documents.update_text(index, text) {
            self.emit(EditorEvent::DocumentChanged);
            if !was_modified {
                self.emit(EditorEvent::TabListChanged);
            }
        }
    }

    pub fn append_line(&mut self, line: &str) {
        let mut text = self.documents.current().text();
        text.push_str(line);
        text.push('\n');
        self.set_text(&text);
    }

    pub fn set_cursor(&mut self, pos: usize) {
        let index = self.documents.current_index();
        let _ = self.documents.set_cursor(index, pos);
    }

    pub fn set_scroll(&mut self, y: f64) {
        let index = self.documents.current_index();
        let _ = self.documents.set_scroll(index, y);
    }

    /// A message from another launch: open it and ask to be brought to front.
    pub fn handle_forwarded(&mut self, message: &str) {
        debug!("Forwarded open request: {}", message);
        let _ = self.open(message);
        self.emit(EditorEvent::ActivateRequested);
    }

    pub fn snapshot(&self) -> SessionRecord {
        SessionRecord::capture(&self.documents)
    }

    pub fn restore(&mut self, record: SessionRecord) {
        self.documents = record.into_document_set();
        self.emit(EditorEvent::TabListChanged);
        self.emit_selection_changed();
    }

    fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message == self.status_message {
            return;
        }
        self.status_message = message;
        self.emit(EditorEvent::StatusMessageChanged);
    }

    fn emit_selection_changed(&mut self) {
        self.emit(EditorEvent::CurrentIndexChanged);
        self.emit(EditorEvent::DocumentChanged);
    }

    fn emit(&mut self, event: EditorEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }
}
