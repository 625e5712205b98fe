//! TOML configuration for coach.
//!
//! Every section and key is optional; a missing file yields the defaults.
//!
//! ```toml
//! [storage]
//! directory = "/tmp/coach-sessions"
//!
//! [session]
//! debounce_ms = 500
//! fallback_language = "javascript"
//! skill_level = "beginner"
//!
//! [backend]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 30
//!
//! [backend.routes]
//! hint = "/hint-agent/hint"
//!
//! [catalog]
//! path = "/srv/coach/problems.json"
//!
//! [logging]
//! directory = "/var/log/coach"
//! ```

use crate::paths::{CoachPaths, PathError};
use coach_core::gateway::GatewayAction;
use coach_core::language::{DEFAULT_FALLBACK_LANGUAGE, Language};
use coach_core::problem::ProblemCatalog;
use coach_core::session::{DEFAULT_DEBOUNCE, SessionSettings};
use coach_core::skill::SkillLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors that can occur while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// File I/O error.
    IoError(std::io::Error),
    /// TOML parsing error.
    TomlParseError(toml::de::Error),
    /// JSON parsing error (problem catalog).
    JsonError(serde_json::Error),
    /// Platform directories could not be resolved.
    PathError(PathError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::TomlParseError(e) => write!(f, "TOML parse error: {}", e),
            ConfigError::JsonError(e) => write!(f, "JSON parse error: {}", e),
            ConfigError::PathError(e) => write!(f, "Path error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::TomlParseError(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::JsonError(e)
    }
}

impl From<PathError> for ConfigError {
    fn from(e: PathError) -> Self {
        ConfigError::PathError(e)
    }
}

impl From<ConfigError> for coach_core::CoachError {
    fn from(e: ConfigError) -> Self {
        coach_core::CoachError::config(e.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the session tables. Defaults to `<data_dir>/coach/sessions`.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub debounce_ms: u64,
    pub fallback_language: String,
    /// `beginner`, `intermediate` or `advanced`.
    pub skill_level: SkillLevel,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            skill_level: SkillLevel::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Per-action route overrides, keyed by action name.
    pub routes: BTreeMap<String, String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            routes: BTreeMap::new(),
        }
    }
}

impl BackendConfig {
    /// Route path of `action`, honoring overrides.
    pub fn route(&self, action: GatewayAction) -> &str {
        self.routes
            .get(action.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| default_route(action))
    }

    /// Request timeout; never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Routes of the mentor backend.
///
/// `/hint` and `/submit` are the paths the backend's hint and judge routers
/// declare; the stock backend app only mounts chat and analyze, so deployments
/// must mount those two routers or override the routes.
fn default_route(action: GatewayAction) -> &'static str {
    match action {
        GatewayAction::Analyze => "/code-agent/analyze",
        GatewayAction::Hint => "/hint",
        GatewayAction::Submit => "/submit",
        GatewayAction::Chat => "/mentor-agent/chat",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON file with `[{id, title, description, difficulty}]`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files. Logs go to stderr only when unset.
    pub directory: Option<PathBuf>,
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub backend: BackendConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

impl CoachConfig {
    /// Loads configuration from `path`, or from the default location when `None`.
    ///
    /// A missing file is not an error: the defaults are returned instead.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => CoachPaths::config_file()?,
        };

        if !path.exists() {
            tracing::debug!("[Config] No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("[Config] Loaded {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            debounce: Duration::from_millis(self.session.debounce_ms),
            fallback_language: Language::new(&self.session.fallback_language),
            skill_level: self.session.skill_level,
        }
    }

    /// Directory of the session tables.
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(CoachPaths::sessions_dir()?),
        }
    }

    /// The configured problem catalog, or the built-in one.
    pub fn catalog(&self) -> Result<ProblemCatalog, ConfigError> {
        match &self.catalog.path {
            Some(path) => load_catalog(path),
            None => Ok(ProblemCatalog::default()),
        }
    }
}

/// Reads a problem catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<ProblemCatalog, ConfigError> {
    let content = fs::read_to_string(path)?;
    let catalog: ProblemCatalog = serde_json::from_str(&content)?;
    tracing::info!(
        "[Config] Loaded {} problem(s) from {:?}",
        catalog.problems().len(),
        path
    );
    Ok(catalog)
}
