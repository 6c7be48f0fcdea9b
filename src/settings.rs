use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::categorizer::RuleSet;
use crate::error::{PassbookError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_monthly_budget")]
    pub monthly_budget: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub default_format: Option<String>,
    /// JSON rule file replacing the built-in rules and tag overrides.
    #[serde(default)]
    pub rules_file: Option<String>,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_monthly_budget() -> f64 {
    20000.0
}

fn default_top_n() -> usize {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            monthly_budget: default_monthly_budget(),
            top_n: default_top_n(),
            default_format: None,
            rules_file: None,
        }
    }
}

impl Settings {
    /// Rule set from `override_path`, else the configured rule file, else defaults.
    pub fn rule_set(&self, override_path: Option<&str>) -> Result<RuleSet> {
        match override_path.or(self.rules_file.as_deref()) {
            Some(path) => RuleSet::load(&PathBuf::from(shellexpand_path(path))),
            None => Ok(RuleSet::default()),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("passbook")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(path).unwrap_or_default();
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring invalid settings file");
        Settings::default()
    })
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PassbookError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}
