//! Transient notifications pushed to the page.
//!
//! The server only ever reports errors; copy and download confirmations are
//! raised by the page itself.

use serde::Serialize;

/// How long the page keeps a notification on screen.
pub const NOTIFICATION_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub intent: Intent,
    pub message: String,
    pub timeout_ms: u64,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            intent: Intent::Error,
            message: message.into(),
            timeout_ms: NOTIFICATION_TIMEOUT_MS,
        }
    }
}
