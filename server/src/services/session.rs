//! Live-preview sessions: debounced, latest-wins generation per client.
//!
//! Input and option changes overwrite a single `watch` slot. A worker task
//! waits for the quiet period, restarting it on every change, then runs the
//! pipeline once for the newest snapshot. A result that comes back after
//! newer input has arrived is dropped.

use std::sync::Arc;
use std::time::Duration;

use image_engine::{Encoder, RenderOptions, RenderRequest};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::pipeline::{self, Generation, Prepared};
use super::quota::GenerationQuota;

const UPDATE_CAPACITY: usize = 16;

/// Latest input and options, tagged with a revision.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    revision: u64,
    text: String,
    request: RenderRequest,
}

/// A pipeline result for a given revision.
#[derive(Debug, Clone)]
pub struct SessionUpdate {
    pub revision: u64,
    pub generation: Generation,
}

/// Settings shared by every session.
#[derive(Clone)]
pub struct SessionConfig {
    pub encoder: Arc<dyn Encoder>,
    pub defaults: RenderOptions,
    pub debounce: Duration,
    pub rate_limit_per_minute: u32,
    pub rate_limit_enabled: bool,
}

/// Handle used by event handlers to feed a session.
pub struct Session {
    tx: watch::Sender<Snapshot>,
}

impl Session {
    /// Start a worker. Updates are delivered on the returned receiver until
    /// the handle is dropped or `cancel` fires.
    pub fn spawn(
        config: SessionConfig,
        cancel: CancellationToken,
    ) -> (Self, mpsc::Receiver<SessionUpdate>) {
        let (tx, rx) = watch::channel(Snapshot::default());
        let (update_tx, update_rx) = mpsc::channel(UPDATE_CAPACITY);
        tokio::spawn(worker_loop(config, rx, update_tx, cancel));
        (Self { tx }, update_rx)
    }

    /// Replace the input text. Returns the new revision.
    pub fn set_text(&self, text: impl Into<String>) -> u64 {
        let text = text.into();
        self.bump(|s| s.text = text)
    }

    /// Overlay option changes onto the current options. Returns the new revision.
    pub fn set_options(&self, request: RenderRequest) -> u64 {
        self.bump(|s| s.request = s.request.merge(&request))
    }

    fn bump(&self, change: impl FnOnce(&mut Snapshot)) -> u64 {
        let mut revision = 0;
        self.tx.send_modify(|s| {
            change(s);
            s.revision += 1;
            revision = s.revision;
        });
        revision
    }
}

async fn worker_loop(
    config: SessionConfig,
    mut rx: watch::Receiver<Snapshot>,
    updates: mpsc::Sender<SessionUpdate>,
    cancel: CancellationToken,
) {
    let mut quota = GenerationQuota::new(config.rate_limit_per_minute, config.rate_limit_enabled);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = rx.changed() => if changed.is_err() { break },
        }

        if !wait_quiet_period(&mut rx, config.debounce, &cancel).await {
            break;
        }

        let snapshot = rx.borrow_and_update().clone();
        let Some(generation) = run_once(&config, &mut quota, &snapshot, &rx).await else {
            tracing::debug!(revision = snapshot.revision, "Discarded stale generation");
            continue;
        };

        let update = SessionUpdate {
            revision: snapshot.revision,
            generation,
        };
        if updates.send(update).await.is_err() {
            break;
        }
    }

    tracing::debug!("Session worker stopped");
}

/// Sleep until no change has arrived for `debounce`. `false` if the session ended.
async fn wait_quiet_period(
    rx: &mut watch::Receiver<Snapshot>,
    debounce: Duration,
    cancel: &CancellationToken,
) -> bool {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(debounce) => return true,
            changed = rx.changed() => if changed.is_err() { return false },
        }
    }
}

/// Run the pipeline for `snapshot`. `None` if newer input arrived while encoding.
async fn run_once(
    config: &SessionConfig,
    quota: &mut GenerationQuota,
    snapshot: &Snapshot,
    rx: &watch::Receiver<Snapshot>,
) -> Option<Generation> {
    let validation = pipeline::validate_off_runtime(snapshot.text.clone()).await;
    let now = Instant::now();
    match pipeline::prepare(validation, &snapshot.request, &config.defaults, quota, now) {
        Prepared::Done(generation) => Some(generation),
        Prepared::Ready(job) => {
            let generation = pipeline::encode(config.encoder.clone(), job).await;
            if generation.image().is_none() {
                quota.release(now);
            }
            if rx.borrow().revision != snapshot.revision {
                return None;
            }
            Some(generation)
        }
    }
}
