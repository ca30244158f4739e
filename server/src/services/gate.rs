//! Decide whether a validated input may be sent to the encoder.

use tokio::time::Instant;

use text_guard::{Outcome, Validation, Warning};

use super::quota::GenerationQuota;

/// Why a generation was not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    /// Nothing to render.
    Empty,
    /// Validation rejected the input.
    Rejected,
    /// The per-minute quota is spent.
    RateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Suppress(GateReason),
}

impl GateDecision {
    pub fn proceeds(self) -> bool {
        self == Self::Proceed
    }
}

impl GateReason {
    /// Outcome to surface in place of the validation result, if any.
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Self::RateLimited => Some(Outcome::Warn(Warning::RateLimited)),
            Self::Empty | Self::Rejected => None,
        }
    }
}

/// Proceed only for non-empty accepted or warned input with quota left.
///
/// Proceeding takes a quota slot on the spot, so concurrent callers that
/// share one quota cannot all pass the same check. Callers hand the slot
/// back with [`GenerationQuota::release`] when the encoder fails.
pub fn should_generate(
    validation: &Validation,
    quota: &mut GenerationQuota,
    now: Instant,
) -> GateDecision {
    if !validation.outcome.allows_generation() {
        return GateDecision::Suppress(GateReason::Rejected);
    }
    if validation.sanitized.is_empty() {
        return GateDecision::Suppress(GateReason::Empty);
    }
    if !quota.check(now) {
        tracing::warn!(
            count = quota.count_in_window(),
            max = quota.max_per_minute(),
            "Generation rate limit exceeded"
        );
        return GateDecision::Suppress(GateReason::RateLimited);
    }
    quota.record(now);
    GateDecision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use text_guard::validate;

    #[test]
    fn rejected_input_never_proceeds() {
        let mut quota = GenerationQuota::new(100, true);
        let validation = validate("javascript:alert(1)");
        let decision = should_generate(&validation, &mut quota, Instant::now());
        assert_eq!(decision, GateDecision::Suppress(GateReason::Rejected));
    }

    #[test]
    fn empty_input_never_proceeds() {
        let mut quota = GenerationQuota::new(100, true);
        for raw in ["", "   ", "<script>x</script>"] {
            let decision = should_generate(&validate(raw), &mut quota, Instant::now());
            assert_eq!(decision, GateDecision::Suppress(GateReason::Empty), "{raw:?}");
        }
    }

    #[test]
    fn warned_input_proceeds() {
        let mut quota = GenerationQuota::new(100, true);
        let decision = should_generate(&validate("<b>hi</b>"), &mut quota, Instant::now());
        assert!(decision.proceeds());
    }

    #[test]
    fn hundred_and_first_generation_is_rate_limited() {
        let start = Instant::now();
        let mut quota = GenerationQuota::new(100, true);
        let v = validate("Hello World");

        for i in 0..100 {
            let now = start + Duration::from_millis(i * 100);
            assert!(should_generate(&v, &mut quota, now).proceeds(), "generation {i}");
        }
        assert_eq!(quota.count_in_window(), 100);

        let now = start + Duration::from_secs(20);
        let decision = should_generate(&v, &mut quota, now);
        assert_eq!(decision, GateDecision::Suppress(GateReason::RateLimited));
        assert_eq!(
            GateReason::RateLimited.outcome(),
            Some(Outcome::Warn(Warning::RateLimited))
        );

        // After the window rolls over counting restarts at zero.
        let later = start + Duration::from_secs(61);
        assert!(should_generate(&v, &mut quota, later).proceeds());
        assert_eq!(quota.count_in_window(), 1);
    }

    #[test]
    fn suppressed_input_takes_no_slot() {
        let mut quota = GenerationQuota::new(1, true);
        let now = Instant::now();
        should_generate(&validate("javascript:alert(1)"), &mut quota, now);
        should_generate(&validate(""), &mut quota, now);
        assert_eq!(quota.count_in_window(), 0);
        assert!(should_generate(&validate("ok"), &mut quota, now).proceeds());
    }
}
