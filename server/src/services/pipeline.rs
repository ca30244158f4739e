//! Validate → gate → encode, shared by the JSON API and live sessions.
//!
//! Split in stages so callers hold their quota lock only around the gate:
//! [`validate_off_runtime`] sanitizes on a blocking thread, [`prepare`]
//! consults the gate and takes a quota slot, [`encode`] renders off the
//! async runtime and checks the result.

use std::sync::Arc;
use tokio::time::Instant;

use image_engine::{EncodeError, EncodedImage, Encoder, RenderOptions, RenderRequest};
use text_guard::{Outcome, Rejection, Validation, validate};

use super::gate::{GateDecision, GateReason, should_generate};
use super::quota::GenerationQuota;

/// What a holder of the current image should do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEffect {
    Replace(EncodedImage),
    Clear,
    Keep,
}

/// Result of one pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    /// Sanitized input.
    pub input: String,
    pub options: RenderOptions,
    pub outcome: Outcome,
    pub effect: ImageEffect,
    pub suppressed: Option<GateReason>,
}

impl Generation {
    pub fn image(&self) -> Option<&EncodedImage> {
        match &self.effect {
            ImageEffect::Replace(image) => Some(image),
            _ => None,
        }
    }
}

/// Input that passed the gate and is ready for the encoder.
#[derive(Debug, Clone)]
pub struct Job {
    pub validation: Validation,
    pub options: RenderOptions,
}

#[derive(Debug, Clone)]
pub enum Prepared {
    Ready(Job),
    Done(Generation),
}

/// Sanitize and classify `raw` on a blocking thread.
pub async fn validate_off_runtime(raw: String) -> Validation {
    match tokio::task::spawn_blocking(move || validate(&raw)).await {
        Ok(validation) => validation,
        Err(e) => {
            tracing::error!(error = %e, "Validation task failed");
            Validation {
                sanitized: String::new(),
                outcome: Outcome::Reject(Rejection::GenerationFailed),
            }
        }
    }
}

/// Resolve options and consult the gate, which takes a quota slot on success.
pub fn prepare(
    validation: Validation,
    request: &RenderRequest,
    defaults: &RenderOptions,
    quota: &mut GenerationQuota,
    now: Instant,
) -> Prepared {
    let options = request.resolve(defaults);

    match should_generate(&validation, quota, now) {
        GateDecision::Proceed => Prepared::Ready(Job {
            validation,
            options,
        }),
        GateDecision::Suppress(reason) => {
            let effect = match reason {
                GateReason::Empty | GateReason::Rejected => ImageEffect::Clear,
                GateReason::RateLimited => ImageEffect::Keep,
            };
            Prepared::Done(Generation {
                input: validation.sanitized,
                options,
                outcome: reason.outcome().unwrap_or(validation.outcome),
                effect,
                suppressed: Some(reason),
            })
        }
    }
}

/// Run the encoder on a blocking thread and verify the image signature.
///
/// Encoder failures are logged here and surface only as
/// [`Rejection::GenerationFailed`].
pub async fn encode(encoder: Arc<dyn Encoder>, job: Job) -> Generation {
    let Job {
        validation,
        options,
    } = job;
    let started = Instant::now();
    let text = validation.sanitized.clone();

    let result = tokio::task::spawn_blocking(move || encoder.encode(&text, &options))
        .await
        .map_err(|e| anyhow::anyhow!("encoder task failed: {e}"))
        .and_then(|r| r.map_err(anyhow::Error::from))
        .and_then(|image| {
            if image.has_png_signature() {
                Ok(image)
            } else {
                Err(EncodeError::BadSignature.into())
            }
        });

    match result {
        Ok(image) => {
            tracing::debug!(
                input_len = validation.sanitized.len(),
                width = options.width,
                margin = options.margin,
                level = options.error_correction.as_str(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "QR code generated"
            );
            Generation {
                input: validation.sanitized,
                options,
                outcome: validation.outcome,
                effect: ImageEffect::Replace(image),
                suppressed: None,
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "QR code generation failed");
            Generation {
                input: validation.sanitized,
                options,
                outcome: Outcome::Reject(Rejection::GenerationFailed),
                effect: ImageEffect::Clear,
                suppressed: None,
            }
        }
    }
}

/// Full pipeline against a shared quota.
///
/// The slot is taken under the lock before encoding and handed back if the
/// encoder produces no image. The lock is not held while encoding.
pub async fn generate(
    encoder: Arc<dyn Encoder>,
    raw: &str,
    request: &RenderRequest,
    defaults: &RenderOptions,
    quota: &tokio::sync::Mutex<GenerationQuota>,
) -> Generation {
    let validation = validate_off_runtime(raw.to_string()).await;
    let now = Instant::now();
    let prepared = {
        let mut quota = quota.lock().await;
        prepare(validation, request, defaults, &mut quota, now)
    };

    match prepared {
        Prepared::Done(generation) => generation,
        Prepared::Ready(job) => {
            let generation = encode(encoder, job).await;
            if generation.image().is_none() {
                quota.lock().await.release(now);
            }
            generation
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use image_engine::{Color, ErrorCorrection, Palette, QrEncoder};
    use text_guard::Warning;

    /// Records every call and delegates to the real encoder.
    #[derive(Default)]
    pub(crate) struct RecordingEncoder {
        pub calls: Mutex<Vec<(String, RenderOptions)>>,
    }

    impl Encoder for RecordingEncoder {
        fn encode(
            &self,
            text: &str,
            options: &RenderOptions,
        ) -> Result<EncodedImage, EncodeError> {
            self.calls.lock().unwrap().push((text.to_string(), *options));
            QrEncoder.encode(text, options)
        }
    }

    /// Always fails.
    pub(crate) struct FailingEncoder;

    impl Encoder for FailingEncoder {
        fn encode(&self, _: &str, _: &RenderOptions) -> Result<EncodedImage, EncodeError> {
            Err(EncodeError::Qr("boom: internal detail".into()))
        }
    }

    /// Returns something that is not a PNG data URL.
    pub(crate) struct BogusEncoder(pub AtomicUsize);

    impl Encoder for BogusEncoder {
        fn encode(&self, _: &str, _: &RenderOptions) -> Result<EncodedImage, EncodeError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(EncodedImage {
                png: b"GIF89a".to_vec(),
                data_url: "data:image/gif;base64,R0lGODlh".into(),
                width: 1,
                height: 1,
            })
        }
    }

    fn quota() -> tokio::sync::Mutex<GenerationQuota> {
        tokio::sync::Mutex::new(GenerationQuota::new(100, true))
    }

    #[tokio::test]
    async fn hello_world_with_defaults_invokes_encoder_once() {
        let encoder = Arc::new(RecordingEncoder::default());
        let generation = generate(
            encoder.clone(),
            "Hello World",
            &RenderRequest::default(),
            &RenderOptions::default(),
            &quota(),
        )
        .await;

        let calls = encoder.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Hello World");
        assert_eq!(
            calls[0].1,
            RenderOptions {
                error_correction: ErrorCorrection::H,
                width: 256,
                margin: 4,
                color: Palette {
                    dark: Color::FOREST,
                    light: Color::WHITE,
                },
            }
        );
        assert_eq!(generation.outcome, Outcome::Accept);
        let image = generation.image().unwrap();
        assert!(!image.png.is_empty());
    }

    #[tokio::test]
    async fn rejected_input_clears_without_encoding() {
        let encoder = Arc::new(RecordingEncoder::default());
        let generation = generate(
            encoder.clone(),
            "javascript:alert(1)",
            &RenderRequest::default(),
            &RenderOptions::default(),
            &quota(),
        )
        .await;
        assert!(encoder.calls.lock().unwrap().is_empty());
        assert_eq!(generation.effect, ImageEffect::Clear);
        assert_eq!(generation.suppressed, Some(GateReason::Rejected));
    }

    #[tokio::test]
    async fn encoder_failure_is_generic_rejection() {
        let generation = generate(
            Arc::new(FailingEncoder),
            "Hello",
            &RenderRequest::default(),
            &RenderOptions::default(),
            &quota(),
        )
        .await;
        assert_eq!(generation.outcome, Outcome::Reject(Rejection::GenerationFailed));
        assert_eq!(generation.effect, ImageEffect::Clear);
        assert!(!generation.outcome.message().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn wrong_signature_is_generation_failure() {
        let encoder = Arc::new(BogusEncoder(AtomicUsize::new(0)));
        let shared = quota();
        let generation = generate(
            encoder.clone(),
            "Hello",
            &RenderRequest::default(),
            &RenderOptions::default(),
            &shared,
        )
        .await;
        assert_eq!(encoder.0.load(Ordering::SeqCst), 1);
        assert_eq!(generation.outcome, Outcome::Reject(Rejection::GenerationFailed));
        assert_eq!(shared.lock().await.count_in_window(), 0);
    }

    #[tokio::test]
    async fn warning_survives_successful_generation() {
        let generation = generate(
            Arc::new(QrEncoder),
            "<i>Hello</i>",
            &RenderRequest::default(),
            &RenderOptions::default(),
            &quota(),
        )
        .await;
        assert_eq!(generation.input, "Hello");
        assert_eq!(generation.outcome, Outcome::Warn(Warning::InvalidCharacters));
        assert!(generation.image().is_some());
    }

    #[tokio::test]
    async fn spent_quota_keeps_previous_image() {
        let shared = tokio::sync::Mutex::new(GenerationQuota::new(1, true));
        let encoder: Arc<dyn Encoder> = Arc::new(QrEncoder);
        let defaults = RenderOptions::default();

        let request = RenderRequest::default();

        let first = generate(encoder.clone(), "one", &request, &defaults, &shared).await;
        assert!(first.image().is_some());

        let second = generate(encoder, "two", &request, &defaults, &shared).await;
        assert_eq!(second.outcome, Outcome::Warn(Warning::RateLimited));
        assert_eq!(second.effect, ImageEffect::Keep);
    }

    #[tokio::test]
    async fn options_are_clamped_before_encoding() {
        let encoder = Arc::new(RecordingEncoder::default());
        let request = RenderRequest {
            width: Some(-20),
            margin: Some(50),
            ..Default::default()
        };
        generate(encoder.clone(), "clamp", &request, &RenderOptions::default(), &quota()).await;
        let calls = encoder.calls.lock().unwrap();
        assert_eq!(calls[0].1.width, 128);
        assert_eq!(calls[0].1.margin, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_cannot_overrun_shared_quota() {
        let shared = Arc::new(tokio::sync::Mutex::new(GenerationQuota::new(2, true)));
        let encoder = Arc::new(RecordingEncoder::default());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let shared = shared.clone();
                let encoder = encoder.clone();
                tokio::spawn(async move {
                    let text = format!("request {i}");
                    let defaults = RenderOptions::default();
                    generate(encoder, &text, &RenderRequest::default(), &defaults, &shared).await
                })
            })
            .collect();

        let mut produced = 0;
        let mut limited = 0;
        for handle in handles {
            let generation = handle.await.unwrap();
            if generation.image().is_some() {
                produced += 1;
            }
            if generation.suppressed == Some(GateReason::RateLimited) {
                limited += 1;
            }
        }
        assert_eq!(produced, 2);
        assert_eq!(limited, 18);
        assert_eq!(encoder.calls.lock().unwrap().len(), 2);
        assert_eq!(shared.lock().await.count_in_window(), 2);
    }

    #[tokio::test]
    async fn failed_encode_returns_its_slot() {
        let shared = tokio::sync::Mutex::new(GenerationQuota::new(1, true));
        let defaults = RenderOptions::default();
        let request = RenderRequest::default();

        let failed = generate(Arc::new(FailingEncoder), "a", &request, &defaults, &shared).await;
        assert_eq!(failed.outcome, Outcome::Reject(Rejection::GenerationFailed));

        let next = generate(Arc::new(QrEncoder), "b", &request, &defaults, &shared).await;
        assert!(next.image().is_some());
    }
}
