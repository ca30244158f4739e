//! Runtime application configuration loaded from the environment.

use std::time::Duration;

use image_engine::{Color, ErrorCorrection, Palette, RenderOptions};

use super::manager::SettingsManager;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub verbose_logging: bool,
    pub rate_limit_enabled: bool,
    pub rate_limit_per_minute: u32,
    pub debounce: Duration,
    pub render_defaults: RenderOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 8080,
            verbose_logging: false,
            rate_limit_enabled: true,
            rate_limit_per_minute: 100,
            debounce: Duration::from_millis(500),
            render_defaults: RenderOptions::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager.
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> Result<String, anyhow::Error> { sm.get_setting(key) };
        let defaults = Self::default();

        let render_defaults = RenderOptions {
            error_correction: g("DEFAULT_ERROR_CORRECTION")?
                .parse::<ErrorCorrection>()
                .unwrap_or(defaults.render_defaults.error_correction),
            width: parse_or(&g("DEFAULT_WIDTH")?, defaults.render_defaults.width),
            margin: parse_or(&g("DEFAULT_MARGIN")?, defaults.render_defaults.margin),
            color: Palette {
                dark: g("DEFAULT_DARK_COLOR")?
                    .parse::<Color>()
                    .unwrap_or(defaults.render_defaults.color.dark),
                light: g("DEFAULT_LIGHT_COLOR")?
                    .parse::<Color>()
                    .unwrap_or(defaults.render_defaults.color.light),
            },
        }
        .clamped();

        Ok(Self {
            server_host: g("SERVER_HOST")?,
            server_port: parse_or(&g("SERVER_PORT")?, defaults.server_port),
            verbose_logging: g("ENABLE_VERBOSE_LOGGING")? == "true",
            rate_limit_enabled: g("ENABLE_RATE_LIMITING")? == "true",
            rate_limit_per_minute: parse_or(
                &g("RATE_LIMIT_MAX_REQUESTS_PER_MINUTE")?,
                defaults.rate_limit_per_minute,
            ),
            debounce: Duration::from_millis(parse_or(&g("DEBOUNCE_MS")?, 500)),
            render_defaults,
        })
    }

    /// `host:port` the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
