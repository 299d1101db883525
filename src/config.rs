use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::finger::Alphabet;
use crate::session::{
    Orientation, SessionSettings, DEFAULT_MAX_ERRORS, DEFAULT_SOURCE_TEXT, DEFAULT_TEXT_HEIGHT,
    MAX_TEXT_HEIGHT,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub max_errors: usize,
    pub alphabet: Alphabet,
    pub orientation: Orientation,
    pub text_height: u16,
    pub source_text: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            alphabet: Alphabet::Latin,
            orientation: Orientation::Horizontal,
            text_height: DEFAULT_TEXT_HEIGHT,
            source_text: DEFAULT_SOURCE_TEXT.to_string(),
        }
    }
}

impl Config {
    /// Settings for a new session. Out-of-range values fall back to defaults.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_errors: if self.max_errors == 0 {
                DEFAULT_MAX_ERRORS
            } else {
                self.max_errors
            },
            alphabet: self.alphabet,
            orientation: self.orientation,
            text_height: if self.text_height == 0 {
                DEFAULT_TEXT_HEIGHT
            } else {
                self.text_height.min(MAX_TEXT_HEIGHT)
            },
        }
    }
}

impl From<&crate::session::Session> for Config {
    fn from(session: &crate::session::Session) -> Self {
        let settings = session.settings();
        Self {
            max_errors: settings.max_errors,
            alphabet: settings.alphabet,
            orientation: settings.orientation,
            text_height: settings.text_height,
            source_text: session.source_text().to_string(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("typesim_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring unreadable config {}: {}", self.path.display(), e);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            max_errors: 15,
            alphabet: Alphabet::Cyrillic,
            orientation: Orientation::Vertical,
            text_height: 12,
            source_text: "съешь же ещё этих мягких французских булок".into(),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_yields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ definitely not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "max_errors": 10, "alphabet": "cyrillic" }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.max_errors, 10);
        assert_eq!(cfg.alphabet, Alphabet::Cyrillic);
        assert_eq!(cfg.text_height, DEFAULT_TEXT_HEIGHT);
        assert_eq!(cfg.source_text, DEFAULT_SOURCE_TEXT);
    }

    #[test]
    fn zero_values_fall_back_in_session_settings() {
        let cfg = Config {
            max_errors: 0,
            text_height: 0,
            ..Config::default()
        };
        let settings = cfg.session_settings();
        assert_eq!(settings.max_errors, DEFAULT_MAX_ERRORS);
        assert_eq!(settings.text_height, DEFAULT_TEXT_HEIGHT);
    }

    #[test]
    fn oversized_height_is_clamped_in_session_settings() {
        let cfg = Config {
            text_height: u16::MAX,
            ..Config::default()
        };
        assert_eq!(cfg.session_settings().text_height, MAX_TEXT_HEIGHT);
    }
}
