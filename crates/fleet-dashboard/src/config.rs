use fleet_core::config::{API_BASE_ENV, BUILD_TIME_API_BASE, DEFAULT_API_BASE};
use fleet_core::{resolve_api_base, ConfigError};
use reqwest::Url;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub api_base: Url,
    pub state_dir: PathBuf,
    pub log_stdout: bool,
}

impl DashboardConfig {
    /// Resolved once at startup and handed down by value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let runtime_base = std::env::var(API_BASE_ENV).ok();
        let api_base = resolve_api_base(BUILD_TIME_API_BASE, runtime_base.as_deref(), DEFAULT_API_BASE)?;
        Ok(Self {
            api_base,
            state_dir: resolve_state_dir(),
            log_stdout: resolve_log_stdout(),
        })
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.state_dir.join("preferences.json")
    }

    pub fn chart_export_path(&self) -> PathBuf {
        self.state_dir.join("instance-chart.svg")
    }
}

pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn resolve_log_stdout() -> bool {
    std::env::var("FLEET_LOG_STDOUT")
        .ok()
        .and_then(|value| parse_bool_flag(&value))
        .unwrap_or(false)
}

fn resolve_state_dir() -> PathBuf {
    if let Ok(value) = std::env::var("FLEET_STATE_DIR") {
        if !value.trim().is_empty() {
            return PathBuf::from(value);
        }
    }
    if let Ok(value) = std::env::var("XDG_STATE_HOME") {
        if !value.trim().is_empty() {
            return PathBuf::from(value).join("fleet-dashboard");
        }
    }
    if let Ok(value) = std::env::var("HOME") {
        return PathBuf::from(value)
            .join(".local")
            .join("state")
            .join("fleet-dashboard");
    }
    PathBuf::from(".fleet-dashboard/state")
}
