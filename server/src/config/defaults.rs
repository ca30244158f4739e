//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_HOST", "0.0.0.0", "Address the HTTP server binds to"),
    ("SERVER_PORT", "8080", "Port the HTTP server listens on"),
    ("ENABLE_VERBOSE_LOGGING", "false", "Log at debug level when RUST_LOG is unset"),
    ("ENABLE_RATE_LIMITING", "true", "Enforce the per-minute generation quota"),
    ("RATE_LIMIT_MAX_REQUESTS_PER_MINUTE", "100", "Generations allowed per rolling minute"),
    ("DEBOUNCE_MS", "500", "Quiet period before a live-preview generation runs"),
    ("DEFAULT_ERROR_CORRECTION", "H", "Error-correction level when none is requested"),
    ("DEFAULT_WIDTH", "256", "Image width in pixels when none is requested"),
    ("DEFAULT_MARGIN", "4", "Quiet-zone modules when none is requested"),
    ("DEFAULT_DARK_COLOR", "#3A5233", "Module color when none is requested"),
    ("DEFAULT_LIGHT_COLOR", "#FFFFFF", "Background color when none is requested"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
