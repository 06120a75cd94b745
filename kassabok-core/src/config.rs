//! Configuration management
//!
//! Settings live in `settings.json` in the app directory:
//! ```json
//! {
//!   "app": { "defaultOwner": 1, "minNewRows": 1 }
//! }
//! ```
//! Unknown fields are preserved on save so other front-ends can keep
//! their own settings in the same file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::result::Result;
use crate::domain::OwnerId;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    default_owner: Option<OwnerId>,
    #[serde(default)]
    min_new_rows: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Kassabok configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Owner used when the caller does not name one explicitly
    pub default_owner: OwnerId,
    /// Watermark dedup acceptance threshold: an import must leave
    /// strictly more rows than this after the cut. Historically 1; the
    /// exact value is a policy knob, not a law of nature.
    pub min_new_rows: usize,
    // Keep the raw settings for preservation when saving
    raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_owner: 1,
            min_new_rows: 1,
            raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the app directory
    ///
    /// The dedup threshold can be overridden with the
    /// `KASSABOK_MIN_NEW_ROWS` environment variable (for CI/testing).
    pub fn load(app_dir: &Path) -> Result<Self> {
        let settings_path = app_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let min_new_rows = std::env::var("KASSABOK_MIN_NEW_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(raw.app.min_new_rows)
            .unwrap_or(1);

        Ok(Self {
            default_owner: raw.app.default_owner.unwrap_or(1),
            min_new_rows,
            raw_settings: raw,
        })
    }

    /// Save config to the app directory, preserving fields this crate
    /// does not manage
    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let settings_path = app_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.default_owner = Some(self.default_owner);
        settings.app.min_new_rows = Some(self.min_new_rows);
        settings.app.other = self.raw_settings.app.other.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
