//! SettingsManager: environment-backed settings with defaults and validation.

use std::collections::HashMap;

use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;
use super::SettingInfo;

/// Resolves setting keys against a snapshot of overrides, falling back to defaults.
pub struct SettingsManager {
    overrides: HashMap<String, String>,
}

impl SettingsManager {
    /// Snapshot every known setting present in the process environment.
    pub fn from_env() -> Self {
        let overrides = DEFAULT_SETTINGS
            .keys()
            .filter_map(|key| {
                std::env::var(key)
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(|v| (key.to_string(), v))
            })
            .collect();
        Self { overrides }
    }

    /// Build from explicit key/value pairs instead of the environment.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            overrides: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Get a setting value. Invalid overrides are logged and replaced by the default.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        let def = DEFAULT_SETTINGS
            .get(key)
            .ok_or_else(|| anyhow::anyhow!("setting not found: {key}"))?;

        if let Some(value) = self.overrides.get(key) {
            match validate_setting(key, value) {
                Ok(()) => return Ok(value.clone()),
                Err(e) => {
                    tracing::warn!(key, value = %value, "Invalid setting ({e}), using default");
                }
            }
        }
        Ok(def.default.to_string())
    }

    /// All settings with their effective values, sorted by key.
    pub fn get_all_settings(&self) -> Vec<SettingInfo> {
        let mut result: Vec<SettingInfo> = DEFAULT_SETTINGS
            .values()
            .map(|def| SettingInfo {
                key: def.key.to_string(),
                value: self.get_setting(def.key).unwrap_or_else(|_| def.default.to_string()),
                description: def.description.to_string(),
                overridden: self.overrides.contains_key(def.key),
            })
            .collect();
        result.sort_by(|a, b| a.key.cmp(&b.key));
        result
    }
}
