//! Unified path management for coach configuration and session data.
//!
//! Paths follow the platform conventions reported by the `dirs` crate.

use std::path::PathBuf;

const APP_DIR: &str = "coach";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for coach.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/coach/             # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/coach/        # Data directory
/// └── sessions/                # Persisted session tables
///     ├── code-by-key.json
///     ├── chat-by-problem.json
///     └── language-by-problem.json
/// ```
pub struct CoachPaths;

impl CoachPaths {
    /// Returns the coach configuration directory (e.g., `~/.config/coach/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the coach data directory (e.g., `~/.local/share/coach/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default directory of the persisted session tables.
    pub fn sessions_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("sessions"))
    }
}
