// src/session.rs - Persisting the open tabs between runs

use crate::document::Document;
use crate::document_set::DocumentSet;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SESSION_FILE_NAME: &str = "session.json";

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("No session file at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    #[error("Malformed session file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Session has no tabs")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SessionError {
    fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SessionError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => SessionError::PermissionDenied(path.to_path_buf()),
            _ => SessionError::Io(err),
        }
    }
}

/// One persisted tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub path: Option<PathBuf>,
    pub text: String,
    pub modified: bool,
    pub cursor_pos: usize,
    pub scroll_y: f64,
}

/// Snapshot of every open tab plus the selected one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub current_index: usize,
    pub tabs: Vec<TabRecord>,
}

impl SessionRecord {
    pub fn capture(set: &DocumentSet) -> Self {
        Self {
            current_index: set.current_index(),
            tabs: set
                .iter()
                .map(|doc| TabRecord {
                    path: doc.path().map(Path::to_path_buf),
                    text: doc.text(),
                    modified: doc.modified(),
                    cursor_pos: doc.cursor(),
                    scroll_y: doc.scroll_y(),
                })
                .collect(),
        }
    }

    pub fn into_document_set(self) -> DocumentSet {
        let docs = self
            .tabs
            .into_iter()
            .map(|tab| Document::from_parts(&tab.text, tab.path, tab.modified, tab.cursor_pos, tab.scroll_y))
            .collect();
        DocumentSet::from_documents(docs, self.current_index)
    }
}

// On-disk shape. Numbers are signed and every field optional so a
// hand-edited file still loads; `validate` clamps into a SessionRecord.
// A field of the wrong JSON type falls back on its own instead of failing
// the whole file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSession {
    #[serde(deserialize_with = "lenient_i64")]
    current_index: i64,
    tabs: Vec<RawTab>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTab {
    #[serde(deserialize_with = "lenient_path")]
    path: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    text: String,
    #[serde(deserialize_with = "lenient_bool")]
    modified: bool,
    #[serde(deserialize_with = "lenient_i64")]
    cursor_pos: i64,
    #[serde(deserialize_with = "lenient_f64")]
    scroll_y: f64,
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().map(|f| f as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    Ok(parsed.unwrap_or(0))
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    Ok(parsed.unwrap_or(0.0))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl RawSession {
    fn validate(self) -> Result<SessionRecord, SessionError> {
        if self.tabs.is_empty() {
            return Err(SessionError::Empty);
        }

        let tabs: Vec<TabRecord> = self
            .tabs
            .into_iter()
            .map(|raw| {
                let len = raw.text.chars().count();
                let cursor_pos = usize::try_from(raw.cursor_pos.max(0))
                    .unwrap_or(usize::MAX)
                    .min(len);
                let scroll_y = if raw.scroll_y.is_finite() && raw.scroll_y > 0.0 {
                    raw.scroll_y
                } else {
                    0.0
                };
                TabRecord {
                    path: raw.path.filter(|p| !p.is_empty()).map(PathBuf::from),
                    text: raw.text,
                    modified: raw.modified,
                    cursor_pos,
                    scroll_y,
                }
            })
            .collect();

        let last = tabs.len() - 1;
        let current_index = usize::try_from(self.current_index.max(0))
            .unwrap_or(usize::MAX)
            .min(last);

        Ok(SessionRecord { current_index, tabs })
    }
}

/// Reads and writes the session file in the per-user data directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self::at(data_dir.join(SESSION_FILE_NAME))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the session file with `record`.
    ///
    /// The JSON is written to a sibling temp file and renamed into place, so
    /// an interrupted save leaves the previous session intact.
    pub fn save(&self, record: &SessionRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::from_io(e, parent))?;
        }

        let json = serde_json::to_string_pretty(record)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| SessionError::from_io(e, &tmp_path))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| SessionError::from_io(e, &self.path))?;

        debug!(
            "Saved session with {} tabs to {}",
            record.tabs.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn try_load(&self) -> Result<SessionRecord, SessionError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| SessionError::from_io(e, &self.path))?;
        let raw: RawSession = serde_json::from_str(&content)?;
        raw.validate()
    }

    /// Load the previous session. Anything short of a usable record (missing
    /// file, bad JSON, no tabs) is reported as `None`.
    pub fn load(&self) -> Option<SessionRecord> {
        match self.try_load() {
            Ok(record) => Some(record),
            Err(SessionError::NotFound(_)) | Err(SessionError::Empty) => {
                debug!("No previous session at {}", self.path.display());
                None
            }
            Err(err) => {
                warn!("Ignoring session file {}: {}", self.path.display(), err);
                None
            }
        }
    }
}
