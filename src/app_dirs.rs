use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "typesim")
    }

    /// Directory holding the saved-text records.
    pub fn data_dir() -> Option<PathBuf> {
        Self::project().map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Log file; the terminal itself belongs to the UI.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("typesim");
            Some(state_dir.join("typesim.log"))
        } else {
            Self::data_dir().map(|dir| dir.join("typesim.log"))
        }
    }
}
