//! Pacing: retry delay, inter-recipient delay with jitter, cancellable sleep

use std::ops::RangeInclusive;
use std::time::Duration;

use contracts::JobSettings;
use rand::Rng;
use tokio_util::sync::CancellationToken;

/// Fixed pause between two attempts for the same recipient
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Bounds (seconds, inclusive) of the random jitter added between recipients
pub const JITTER_RANGE: RangeInclusive<u64> = 1..=3;

/// Granularity of cancellation checks while sleeping
const SLEEP_TICK: Duration = Duration::from_secs(1);

/// Source of the extra seconds added to the inter-recipient delay
pub trait JitterSource: Send + Sync {
    fn jitter_secs(&self) -> u64;
}

/// Uniform jitter over `JITTER_RANGE`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn jitter_secs(&self) -> u64 {
        rand::rng().random_range(JITTER_RANGE)
    }
}

/// Constant jitter, for deterministic runs
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedJitter(pub u64);

impl JitterSource for FixedJitter {
    fn jitter_secs(&self) -> u64 {
        self.0
    }
}

/// Whole seconds to wait after a finalized recipient
pub fn inter_recipient_delay(settings: &JobSettings, jitter: &dyn JitterSource) -> u64 {
    let extra = if settings.jitter_enabled {
        jitter.jitter_secs()
    } else {
        0
    };
    settings.base_interval_secs + extra
}

/// Sleep `duration` in one-second ticks, waking early on cancellation
///
/// Returns `false` if the token was cancelled before the sleep completed.
pub async fn cancellable_sleep(duration: Duration, cancel: &CancellationToken) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if cancel.is_cancelled() {
            return false;
        }
        let tick = remaining.min(SLEEP_TICK);
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(tick) => {}
        }
        remaining -= tick;
    }
    !cancel.is_cancelled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_random_jitter_in_range() {
        let jitter = RandomJitter;
        for _ in 0..200 {
            assert!(JITTER_RANGE.contains(&jitter.jitter_secs()));
        }
    }

    #[test]
    fn test_inter_recipient_delay() {
        let mut settings = JobSettings {
            max_attempts_per_recipient: 1,
            base_interval_secs: 3,
            jitter_enabled: true,
        };
        assert_eq!(inter_recipient_delay(&settings, &FixedJitter(2)), 5);

        settings.jitter_enabled = false;
        assert_eq!(inter_recipient_delay(&settings, &FixedJitter(2)), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_runs_to_completion() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert!(cancellable_sleep(Duration::from_secs(5), &token).await);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_wakes_on_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        assert!(!cancellable_sleep(Duration::from_secs(30), &token).await);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_zero_sleep_reports_cancellation() {
        let token = CancellationToken::new();
        assert!(cancellable_sleep(Duration::ZERO, &token).await);
        token.cancel();
        assert!(!cancellable_sleep(Duration::ZERO, &token).await);
    }
}
