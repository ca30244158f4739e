//! Startup helpers shared by the binary and tests.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, SettingsManager};

/// Load .env from multiple candidate paths. Returns the one that was used.
pub fn load_dotenv() -> Option<&'static str> {
    let candidates = [".env", "../.env", "../../.env"];
    candidates
        .into_iter()
        .find(|path| dotenvy::from_filename(path).is_ok())
}

/// Filter used when `RUST_LOG` is unset.
pub fn fallback_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Install the fmt subscriber. `RUST_LOG` wins over `ENABLE_VERBOSE_LOGGING`.
pub fn init_tracing(settings: &SettingsManager) {
    let verbose = settings
        .get_setting("ENABLE_VERBOSE_LOGGING")
        .map(|v| v == "true")
        .unwrap_or(false);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_filter(verbose)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load .env, install tracing and build the runtime config.
pub fn init_foundation() -> Result<(AppConfig, SettingsManager), anyhow::Error> {
    let env_file = load_dotenv();
    let settings = SettingsManager::from_env();
    init_tracing(&settings);

    match env_file {
        Some(path) => tracing::info!("Loaded .env from: {path}"),
        None => tracing::info!("No .env file found, using system environment variables"),
    }

    let config = AppConfig::load(&settings)?;
    tracing::debug!(
        addr = %config.bind_addr(),
        rate_limit = config.rate_limit_enabled,
        per_minute = config.rate_limit_per_minute,
        debounce_ms = config.debounce.as_millis() as u64,
        "Configuration loaded"
    );
    Ok((config, settings))
}
