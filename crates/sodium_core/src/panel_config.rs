//! The panel configuration document.
//!
//! Settings live outside the collections as a single JSON file. Reads merge
//! missing keys from defaults section by section, so a partially-populated
//! file from an older install never errors; unknown keys inside a section
//! are preserved across load/save cycles.

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Branding and address settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelSection {
    /// Display name of the panel.
    pub name: String,
    /// Public base URL.
    pub url: String,
    /// Extra keys carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PanelSection {
    fn default() -> Self {
        Self {
            name: "Sodium".to_string(),
            url: "http://localhost:3000".to_string(),
            extra: Map::new(),
        }
    }
}

/// Account registration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationSection {
    /// Whether new accounts can self-register.
    pub enabled: bool,
    /// Extra keys carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RegistrationSection {
    fn default() -> Self {
        Self {
            enabled: true,
            extra: Map::new(),
        }
    }
}

/// Default resource limits applied to new servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultsSection {
    /// Memory limit in MiB.
    pub memory: u64,
    /// Disk limit in MiB.
    pub disk: u64,
    /// CPU limit in percent.
    pub cpu: u64,
    /// Extra keys carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            memory: 1024,
            disk: 5120,
            cpu: 100,
            extra: Map::new(),
        }
    }
}

/// Feature toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturesSection {
    /// Whether announcements are shown.
    pub announcements: bool,
    /// Whether users may create API keys.
    pub api_keys: bool,
    /// Extra keys carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for FeaturesSection {
    fn default() -> Self {
        Self {
            announcements: true,
            api_keys: true,
            extra: Map::new(),
        }
    }
}

/// The full configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Branding and address.
    pub panel: PanelSection,
    /// Registration policy.
    pub registration: RegistrationSection,
    /// New-server resource defaults.
    pub defaults: DefaultsSection,
    /// Feature toggles.
    pub features: FeaturesSection,
}

impl PanelConfig {
    /// Loads the config file, filling missing keys from defaults.
    ///
    /// A missing or unreadable file yields the defaults, which are written
    /// back so the file exists for the next operator edit. This path never
    /// fails on bad content.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the defaulted file fails.
    pub fn load(path: &Path) -> CoreResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => Ok(config),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "config unreadable, restoring defaults");
                    let config = Self::default();
                    config.save(path)?;
                    Ok(config)
                }
            },
            Err(_) => {
                let config = Self::default();
                config.save(path)?;
                Ok(config)
            }
        }
    }

    /// Writes the config file, pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults_and_writes_them() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = PanelConfig::load(&path).unwrap();
        assert_eq!(config.panel.name, "Sodium");
        assert!(config.registration.enabled);
        assert!(path.exists());
    }

    #[test]
    fn partial_file_gains_defaulted_sections() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"panel": {"name": "My Host"}}"#).unwrap();

        let config = PanelConfig::load(&path).unwrap();
        assert_eq!(config.panel.name, "My Host");
        // Unspecified keys inside a present section default too.
        assert_eq!(config.panel.url, "http://localhost:3000");
        assert_eq!(config.defaults.memory, 1024);
        assert!(config.features.api_keys);
    }

    #[test]
    fn unknown_keys_survive_a_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r##"{"panel": {"name": "X", "accentColor": "#f00"}}"##,
        )
        .unwrap();

        let config = PanelConfig::load(&path).unwrap();
        assert_eq!(config.panel.extra.get("accentColor"), Some(&json!("#f00")));

        config.save(&path).unwrap();
        let reloaded = PanelConfig::load(&path).unwrap();
        assert_eq!(reloaded.panel.extra.get("accentColor"), Some(&json!("#f00")));
    }

    #[test]
    fn corrupt_file_is_replaced_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        let config = PanelConfig::load(&path).unwrap();
        assert_eq!(config.panel.name, "Sodium");

        // The file on disk is valid again.
        let reparsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reparsed["panel"]["name"], json!("Sodium"));
    }
}
