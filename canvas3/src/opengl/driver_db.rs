//! Per-driver configuration overrides.
//!
//! The database is a JSON document:
//!
//! ```json
//! { "rules": [
//!     { "vendor": "ati", "renderer": "radeon 9",
//!       "extensions": ["GL_ARB_multisample"],
//!       "config": { "Video.OpenGL.MultiSamples": 0 } }
//! ] }
//! ```
//!
//! Every rule whose vendor, renderer and version substrings match (case
//! insensitive, absent means any) and whose extensions are all present
//! contributes its `config` entries. Later rules win.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    config::{ConfigFile, SharedConfig, PRIORITY_PLUGIN},
    error::DriverDatabaseError,
    opengl::extensions::ExtensionManager,
};

/// Name of the configuration layer holding the overrides.
pub const DRIVER_DB_LAYER: &str = "driverdb";
pub const DRIVER_DB_PRIORITY: i32 = PRIORITY_PLUGIN + 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverRule {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub renderer: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
}

/// What the context reports about itself.
#[derive(Debug, Copy, Clone, Default)]
pub struct HardwareInfo<'a> {
    pub vendor: Option<&'a str>,
    pub renderer: Option<&'a str>,
    pub version: Option<&'a str>,
}

fn substring_matches(pattern: &Option<String>, value: Option<&str>) -> bool {
    match (pattern, value) {
        (None, _) => true,
        (Some(pattern), Some(value)) => value.to_lowercase().contains(&pattern.to_lowercase()),
        (Some(_), None) => false,
    }
}

impl DriverRule {
    pub fn matches(&self, hw: &HardwareInfo<'_>, extensions: &ExtensionManager) -> bool {
        substring_matches(&self.vendor, hw.vendor)
            && substring_matches(&self.renderer, hw.renderer)
            && substring_matches(&self.version, hw.version)
            && self.extensions.iter().all(|ext| extensions.has(ext))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriverDatabase {
    #[serde(default)]
    rules: Vec<DriverRule>,
}

impl DriverDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, DriverDatabaseError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn rules(&self) -> &[DriverRule] {
        &self.rules
    }

    /// Merges the overrides of every matching rule.
    pub fn overrides(&self, hw: &HardwareInfo<'_>, extensions: &ExtensionManager) -> ConfigFile {
        let mut file = ConfigFile::new();
        for rule in self.rules.iter().filter(|rule| rule.matches(hw, extensions)) {
            if let Some(ref description) = rule.description {
                log::debug!("Driver database rule applies: {description}");
            }
            for (key, value) in &rule.config {
                match value {
                    serde_json::Value::String(s) => file.set(key, s.as_str()),
                    other => file.set(key, other.to_string()),
                }
            }
        }
        file
    }

    /// Installs the overrides as the driver database layer of `config`,
    /// replacing an earlier one. Returns how many keys were overridden.
    pub fn apply(&self, config: &SharedConfig, hw: &HardwareInfo<'_>, extensions: &ExtensionManager) -> usize {
        let overrides = self.overrides(hw, extensions);
        let count = overrides.len();
        let mut config = config.write();
        if overrides.is_empty() {
            config.remove_layer(DRIVER_DB_LAYER);
        } else {
            config.add_layer(DRIVER_DB_LAYER, DRIVER_DB_PRIORITY, overrides);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigManager, ConfigSource, PRIORITY_APPLICATION};

    const DB: &str = r#"{ "rules": [
        { "description": "old radeon", "vendor": "ATI", "renderer": "radeon 9",
          "config": { "Video.OpenGL.MultiSamples": 0, "Video.OpenGL.Tweak": "a" } },
        { "extensions": ["GL_EXT_bar"], "config": { "Video.OpenGL.Tweak": "b" } }
    ] }"#;

    #[test]
    fn rules_match_case_insensitively() {
        let db = DriverDatabase::from_json(DB).unwrap();
        let mut ext = ExtensionManager::new();
        let hw = HardwareInfo {
            vendor: Some("ati technologies"),
            renderer: Some("Radeon 9600"),
            version: None,
        };

        let overrides = db.overrides(&hw, &ext);
        assert_eq!(overrides.get_str("Video.OpenGL.MultiSamples"), Some("0"));
        assert_eq!(overrides.get_str("Video.OpenGL.Tweak"), Some("a"));

        ext.initialize("GL_EXT_bar");
        assert_eq!(db.overrides(&hw, &ext).get_str("Video.OpenGL.Tweak"), Some("b"));

        let other = HardwareInfo::default();
        assert_eq!(db.overrides(&other, &ExtensionManager::new()).len(), 0);
    }

    #[test]
    fn apply_layers_below_application() {
        let db = DriverDatabase::from_json(DB).unwrap();
        let mut manager = ConfigManager::new();
        manager.add_layer("app", PRIORITY_APPLICATION, ConfigFile::from_pairs([("Video.OpenGL.Tweak", "app")]));
        let config = manager.into_shared();

        let hw = HardwareInfo {
            vendor: Some("ATI"),
            renderer: Some("RADEON 9800"),
            version: Some("2.0"),
        };
        assert_eq!(db.apply(&config, &hw, &ExtensionManager::new()), 2);
        assert_eq!(config.read().get_str("Video.OpenGL.Tweak"), Some("app"));
        assert_eq!(config.read().get_int("Video.OpenGL.MultiSamples", 4), 0);

        assert_eq!(db.apply(&config, &HardwareInfo::default(), &ExtensionManager::new()), 0);
        assert!(!config.read().has_layer(DRIVER_DB_LAYER));
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(DriverDatabase::from_json("{ rules: ").is_err());
    }
}
