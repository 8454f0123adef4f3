use fleet_core::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to write preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(rename = "app-theme", default)]
    app_theme: Option<String>,
}

/// Single-key preference file holding the active theme name.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable preferences fall back to the dark theme.
    pub fn load_theme(&self) -> Theme {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return Theme::default();
        };
        match serde_json::from_str::<StoredPreferences>(&content) {
            Ok(stored) => stored
                .app_theme
                .as_deref()
                .and_then(Theme::parse)
                .unwrap_or_default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable preferences");
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let stored = StoredPreferences {
            app_theme: Some(theme.as_str().to_string()),
        };
        let body = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, body).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
