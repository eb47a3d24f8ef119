// src/settings.rs - User settings for the presentation layer
//
// The core never reads these; they are stored here so every front end shares
// one file and one normalization rule for shortcuts.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed settings file: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub const THEMES: &[&str] = &["Dark", "White", "Purple"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    New,
    Open,
    Save,
    SaveAs,
}

impl ShortcutAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "new" => Some(ShortcutAction::New),
            "open" => Some(ShortcutAction::Open),
            "save" => Some(ShortcutAction::Save),
            "saveas" | "save-as" | "save_as" => Some(ShortcutAction::SaveAs),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Shortcuts {
    pub new: String,
    pub open: String,
    pub save: String,
    pub save_as: String,
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            new: "Ctrl+N".to_string(),
            open: "Ctrl+O".to_string(),
            save: "Ctrl+S".to_string(),
            save_as: "Ctrl+Shift+S".to_string(),
        }
    }
}

impl Shortcuts {
    pub fn get(&self, action: ShortcutAction) -> &str {
        match action {
            ShortcutAction::New => &self.new,
            ShortcutAction::Open => &self.open,
            ShortcutAction::Save => &self.save,
            ShortcutAction::SaveAs => &self.save_as,
        }
    }

    fn slot_mut(&mut self, action: ShortcutAction) -> &mut String {
        match action {
            ShortcutAction::New => &mut self.new,
            ShortcutAction::Open => &mut self.open,
            ShortcutAction::Save => &mut self.save,
            ShortcutAction::SaveAs => &mut self.save_as,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub font_size: u32,
    pub theme: String,
    pub shortcuts: Shortcuts,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 11,
            theme: "Dark".to_string(),
            shortcuts: Shortcuts::default(),
        }
    }
}

/// Strip all whitespace and fix modifier casing: `ctrl + shift+s` becomes
/// `Ctrl+Shift+s`.
pub fn normalize_sequence(seq: &str) -> String {
    let compact: String = seq.chars().filter(|c| !c.is_whitespace()).collect();
    [
        ("CTRL", "Ctrl"),
        ("ctrl", "Ctrl"),
        ("SHIFT", "Shift"),
        ("shift", "Shift"),
        ("ALT", "Alt"),
        ("alt", "Alt"),
        ("META", "Meta"),
        ("meta", "Meta"),
    ]
    .iter()
    .fold(compact, |acc, (from, to)| acc.replace(from, to))
}

/// Settings backed by a JSON file. Every effective change is written
/// through immediately.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load from `path`. A missing file is created with defaults; a corrupt
    /// one is replaced by defaults.
    pub fn open(path: &Path) -> Self {
        let mut store = Self {
            path: path.to_path_buf(),
            settings: Settings::default(),
        };

        match store.read() {
            Ok(Some(settings)) => store.settings = settings,
            Ok(None) => {
                debug!("No settings at {}, writing defaults", path.display());
                store.persist();
            }
            Err(e) => {
                warn!("Resetting settings {}: {}", path.display(), e);
                store.persist();
            }
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Returns whether the value changed.
    pub fn set_font_size(&mut self, size: u32) -> Result<bool, SettingsError> {
        if size == self.settings.font_size {
            return Ok(false);
        }
        self.settings.font_size = size;
        self.save()?;
        Ok(true)
    }

    pub fn set_theme(&mut self, theme: &str) -> Result<bool, SettingsError> {
        if theme == self.settings.theme {
            return Ok(false);
        }
        if !THEMES.contains(&theme) {
            debug!("Unknown theme {:?}, storing as given", theme);
        }
        self.settings.theme = theme.to_string();
        self.save()?;
        Ok(true)
    }

    pub fn set_shortcut(&mut self, action: ShortcutAction, seq: &str) -> Result<bool, SettingsError> {
        let normalized = normalize_sequence(seq);
        let slot = self.settings.shortcuts.slot_mut(action);
        if *slot == normalized {
            return Ok(false);
        }
        *slot = normalized;
        self.save()?;
        Ok(true)
    }

    fn read(&self) -> Result<Option<Settings>, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut settings: Settings = serde_json::from_str(&content)?;
        let shortcuts = &mut settings.shortcuts;
        for slot in [
            &mut shortcuts.new,
            &mut shortcuts.open,
            &mut shortcuts.save,
            &mut shortcuts.save_as,
        ] {
            *slot = normalize_sequence(slot.as_str());
        }
        Ok(Some(settings))
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Could not write settings {}: {}", self.path.display(), e);
        }
    }
}
