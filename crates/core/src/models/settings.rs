use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// Default Gemini model used for planning and diagnosis text.
pub const DEFAULT_AI_MODEL: &str = "gemini-3-flash-preview";

/// Default Gemini API endpoint.
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Longest confirmation window a removal may be given.
pub const MAX_REMOVAL_WINDOW_SECS: u64 = 3600;

/// User-configurable settings, loaded from a TOML file.
///
/// Every field has a default, so a partial (or missing) file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Budget (TWD) used to size the first lot when an ETF is added.
    pub target_budget: f64,

    /// Shares per board lot.
    pub lot_size: u64,

    /// How long an armed removal waits for confirmation.
    pub removal_confirm_window_secs: u64,

    /// URL or file path of the reference CSV.
    pub reference_source: Option<String>,

    /// Directory holding persisted state. Frontends pick a platform default when unset.
    pub storage_dir: Option<PathBuf>,

    pub ai: AiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_budget: 500_000.0,
            lot_size: 1000,
            removal_confirm_window_secs: 3,
            reference_source: None,
            storage_dir: None,
            ai: AiSettings::default(),
        }
    }
}

/// Text-generation backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub model: String,
    pub base_url: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_AI_MODEL.to_string(),
            base_url: DEFAULT_AI_BASE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text and validate them.
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`. A missing file yields the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.lot_size == 0 {
            return Err(CoreError::Config("lot_size must be positive".into()));
        }
        if !(self.target_budget.is_finite() && self.target_budget > 0.0) {
            return Err(CoreError::Config(format!(
                "target_budget must be a positive number, got {}",
                self.target_budget
            )));
        }
        if !(1..=MAX_REMOVAL_WINDOW_SECS).contains(&self.removal_confirm_window_secs) {
            return Err(CoreError::Config(format!(
                "removal_confirm_window_secs must be between 1 and {MAX_REMOVAL_WINDOW_SECS}, got {}",
                self.removal_confirm_window_secs
            )));
        }
        if self.ai.model.trim().is_empty() {
            return Err(CoreError::Config("ai.model must not be empty".into()));
        }
        Ok(())
    }

    pub fn removal_window(&self) -> Result<chrono::Duration, CoreError> {
        i64::try_from(self.removal_confirm_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                CoreError::Config(format!(
                    "removal_confirm_window_secs out of range: {}",
                    self.removal_confirm_window_secs
                ))
            })
    }
}
