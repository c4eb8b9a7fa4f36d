use std::time::Duration;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(3);

/// Debounce state machine for the audible alert.
///
/// The only cross-frame state in the pipeline: the monotonic timestamp of
/// the last fired alert. `should_fire` is the single mutation site, and it
/// mutates only when it returns `true`.
///
/// Time arrives as a `Duration` from an injected monotonic clock (see
/// [`crate::shared::clock::MonotonicClock`]), never from the wall clock.
#[derive(Clone, Debug)]
pub struct AlertThrottle {
    min_interval: Duration,
    last_alert: Option<Duration>,
}

impl AlertThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_alert: None,
        }
    }

    /// Decides whether to fire an alert at monotonic time `now`.
    ///
    /// Fires iff the assessment is bad and the time since the last alert
    /// strictly exceeds the minimum interval ("never fired" always
    /// satisfies the check). Recording `now` happens iff this returns
    /// `true`.
    pub fn should_fire(&mut self, is_good: bool, now: Duration) -> bool {
        if is_good {
            return false;
        }

        let window_elapsed = match self.last_alert {
            None => true,
            Some(last) => now.saturating_sub(last) > self.min_interval,
        };

        if window_elapsed {
            self.last_alert = Some(now);
        }
        window_elapsed
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Monotonic time of the last fired alert, if any.
    pub fn last_alert(&self) -> Option<Duration> {
        self.last_alert
    }
}

impl Default for AlertThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
