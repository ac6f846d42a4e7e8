// Run settings
// Loaded from --config, else ~/.config/sheetflag/config.toml, else defaults

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_SHEETS_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DRIVE_BASE: &str = "https://www.googleapis.com";

/// Everything one run needs to know. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Service-account JSON key file
    pub credentials: PathBuf,

    /// Spreadsheet title, matched exactly against Drive file names
    pub spreadsheet: String,

    /// Worksheet title (None = first worksheet)
    pub worksheet: Option<String>,

    /// Numeric column fed to the model
    pub feature_column: String,

    /// Column receiving the flag text
    pub alert_column: String,

    /// Text written for flagged rows (normal rows get "")
    pub flag_label: String,

    pub model: ModelSettings,

    pub api: ApiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from("service_account.json"),
            spreadsheet: "Hires - ADT Preboarding".to_string(),
            worksheet: None,
            feature_column: "DaysSinceOffer".to_string(),
            alert_column: "AI_Alert".to_string(),
            flag_label: "FLAGGED".to_string(),
            model: ModelSettings::default(),
            api: ApiSettings::default(),
        }
    }
}

/// Isolation forest parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Number of isolation trees
    pub trees: usize,

    /// Rows sampled per tree (None = min(256, rows))
    pub max_samples: Option<usize>,

    /// RNG seed; fixed so reruns flag the same rows
    pub seed: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            trees: 100,
            max_samples: None,
            seed: 42,
        }
    }
}

/// Google API endpoints. Overridable for testing against a local server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub sheets_base: String,
    pub drive_base: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            sheets_base: DEFAULT_SHEETS_BASE.to_string(),
            drive_base: DEFAULT_DRIVE_BASE.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Settings plus the file they came from (None = built-in defaults).
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Parse and validate settings from a TOML string.
    /// Relative paths are left as written; see [`Settings::load_file`].
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings =
            toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a settings file. A relative `credentials` path is resolved
    /// against the directory containing the file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut settings = Self::from_toml(&contents)?;

        if settings.credentials.is_relative() {
            if let Some(dir) = path.parent() {
                settings.credentials = dir.join(&settings.credentials);
            }
        }

        Ok(settings)
    }

    /// Default user settings location.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|c| c.join("sheetflag").join("config.toml"))
    }

    /// Resolve settings for a run.
    ///
    /// An explicit path must exist. Without one, the user settings file is
    /// used when present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedSettings, ConfigError> {
        Self::load_with_fallback(explicit, Self::user_path())
    }

    fn load_with_fallback(
        explicit: Option<&Path>,
        user_path: Option<PathBuf>,
    ) -> Result<LoadedSettings, ConfigError> {
        if let Some(path) = explicit {
            let settings = Self::load_file(path)?;
            return Ok(LoadedSettings { settings, source: Some(path.to_path_buf()) });
        }

        match user_path {
            Some(path) if path.is_file() => {
                log::debug!("Using settings from {}", path.display());
                let settings = Self::load_file(&path)?;
                Ok(LoadedSettings { settings, source: Some(path) })
            }
            _ => Ok(LoadedSettings { settings: Self::default(), source: None }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet.trim().is_empty() {
            return Err(ConfigError::Invalid("spreadsheet name is blank".into()));
        }
        if self.feature_column.trim().is_empty() {
            return Err(ConfigError::Invalid("feature_column is blank".into()));
        }
        if self.alert_column.trim().is_empty() {
            return Err(ConfigError::Invalid("alert_column is blank".into()));
        }
        if self.feature_column == self.alert_column {
            return Err(ConfigError::Invalid(format!(
                "feature_column and alert_column are both '{}'",
                self.feature_column,
            )));
        }
        if matches!(&self.worksheet, Some(w) if w.trim().is_empty()) {
            return Err(ConfigError::Invalid("worksheet is blank (omit it to use the first worksheet)".into()));
        }
        if self.model.trees == 0 {
            return Err(ConfigError::Invalid("model.trees must be at least 1".into()));
        }
        if self.model.max_samples == Some(0) {
            return Err(ConfigError::Invalid("model.max_samples must be at least 1".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }
}
