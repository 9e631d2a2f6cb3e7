use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, HISTORY_FILE_NAME,
};
use crate::orchestrator::Pacing;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub history_path: PathBuf,
    pub request_timeout_secs: u64,
    pub stage_pacing: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            history_path: default_history_path(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            stage_pacing: true,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pacing(&self) -> Pacing {
        if self.stage_pacing {
            Pacing::standard()
        } else {
            Pacing::none()
        }
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("heatshield").join(HISTORY_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILE_NAME))
}

/// Defaults, then the TOML file, then `HEATSHIELD_*` environment variables.
/// An explicit `config_path` must exist; the default file is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match config_path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(CONFIG_FILE_NAME).exists() => {
            read_settings_file(Path::new(CONFIG_FILE_NAME))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let settings: Settings = toml::from_str(&raw)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    anyhow::ensure!(
        settings.request_timeout_secs > 0,
        "request_timeout_secs in {} must be greater than zero",
        path.display()
    );
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("HEATSHIELD_API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("HEATSHIELD_HISTORY_PATH") {
        settings.history_path = PathBuf::from(v);
    }

    if let Some(v) = lookup("HEATSHIELD_REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_secs = parsed,
            _ => tracing::warn!("Ignoring invalid HEATSHIELD_REQUEST_TIMEOUT_SECS: {}", v),
        }
    }

    if let Some(v) = lookup("HEATSHIELD_STAGE_PACING") {
        match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => settings.stage_pacing = true,
            "0" | "false" | "no" | "off" => settings.stage_pacing = false,
            _ => tracing::warn!("Ignoring invalid HEATSHIELD_STAGE_PACING: {}", v),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
