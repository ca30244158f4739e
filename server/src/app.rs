use std::sync::Arc;

use image_engine::{Encoder, QrEncoder};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::{AppConfig, SettingsManager};
use crate::services::quota::GenerationQuota;
use crate::services::session::SessionConfig;

/// Application state shared by every axum handler and WebSocket session.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration, fixed at startup
    config: AppConfig,
    /// Settings source the config was built from
    settings: SettingsManager,
    /// QR encoder shared by the API and sessions
    encoder: Arc<dyn Encoder>,
    /// Quota for the JSON API, shared by all callers
    api_quota: Mutex<GenerationQuota>,
    /// Cancelled on shutdown; sessions and the server watch it
    shutdown: CancellationToken,
}

impl SharedState {
    pub fn new(config: AppConfig, settings: SettingsManager) -> Self {
        Self::with_encoder(config, settings, Arc::new(QrEncoder))
    }

    pub fn with_encoder(
        config: AppConfig,
        settings: SettingsManager,
        encoder: Arc<dyn Encoder>,
    ) -> Self {
        let api_quota =
            GenerationQuota::new(config.rate_limit_per_minute, config.rate_limit_enabled);
        Self {
            inner: Arc::new(SharedStateInner {
                config,
                settings,
                encoder,
                api_quota: Mutex::new(api_quota),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.inner.settings
    }

    pub fn encoder(&self) -> Arc<dyn Encoder> {
        self.inner.encoder.clone()
    }

    pub fn api_quota(&self) -> &Mutex<GenerationQuota> {
        &self.inner.api_quota
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// Settings for a new live session.
    pub fn session_config(&self) -> SessionConfig {
        let config = self.config();
        SessionConfig {
            encoder: self.encoder(),
            defaults: config.render_defaults,
            debounce: config.debounce,
            rate_limit_per_minute: config.rate_limit_per_minute,
            rate_limit_enabled: config.rate_limit_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn config_is_read_without_locking() {
        let config = AppConfig {
            server_port: 9191,
            rate_limit_per_minute: 7,
            debounce: Duration::from_millis(250),
            ..AppConfig::default()
        };
        let state = SharedState::new(config, SettingsManager::from_pairs([]));

        assert_eq!(state.server_port(), 9191);
        assert_eq!(state.config().rate_limit_per_minute, 7);
        let session = state.session_config();
        assert_eq!(session.debounce, Duration::from_millis(250));
        assert_eq!(session.rate_limit_per_minute, 7);
    }
}
