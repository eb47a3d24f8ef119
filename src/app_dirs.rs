use std::path::{Path, PathBuf};

const APP_DIR: &str = "smarttext";

pub fn get_config_dir() -> PathBuf {
    let config_home = dirs::config_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".config")
    });
    config_home.join(APP_DIR)
}

pub fn find_config_file() -> Option<PathBuf> {
    let config_dir = get_config_dir();
    let paths = vec![
        config_dir.join("config.toml"),
        dirs::home_dir()?.join(".smarttext").join("config.toml"),
    ];

    paths.into_iter().find(|p| p.exists())
}

/// Per-user location for the session and settings files.
pub fn get_data_dir() -> PathBuf {
    let data_home = dirs::data_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".local").join("share")
    });
    data_home.join(APP_DIR)
}

/// Socket path for the single-instance endpoint `name`.
///
/// The runtime dir is already per-user. The shared temp dir fallback gets the
/// user name appended so two users on one machine don't collide.
pub fn endpoint_path(name: &str) -> PathBuf {
    match dirs::runtime_dir() {
        Some(dir) => dir.join(format!("{name}.sock")),
        None => {
            let user = std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "default".to_string());
            std::env::temp_dir().join(format!("{name}-{user}.sock"))
        }
    }
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("userSettings.json")
}
