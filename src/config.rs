use crate::app_dirs;
use crate::editor::LastTabPolicy;
use crate::ipc::instance::{DEFAULT_PROBE_TIMEOUT, DEFAULT_SEND_TIMEOUT, ENDPOINT_NAME};
use log::warn;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    Format(#[from] toml::de::Error),
}

/// Process configuration from `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SmarttextConfig {
    pub endpoint_name: Option<String>,
    pub probe_timeout_ms: Option<u64>,
    pub send_timeout_ms: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub last_tab_policy: Option<LastTabPolicy>,
}

impl SmarttextConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: SmarttextConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `explicit` if given, else the first config file found in the
    /// usual places. A broken file is logged and replaced by defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match app_dirs::find_config_file() {
                Some(path) => path,
                None => return Self::default(),
            },
        };

        Self::from_file(&path).unwrap_or_else(|e| {
            warn!("Ignoring config {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn endpoint_name(&self) -> &str {
        self.endpoint_name.as_deref().unwrap_or(ENDPOINT_NAME)
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT)
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SEND_TIMEOUT)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(app_dirs::get_data_dir)
    }

    pub fn last_tab_policy(&self) -> LastTabPolicy {
        self.last_tab_policy.unwrap_or_default()
    }
}
