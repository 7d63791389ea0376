use std::time::Duration;

/// How many times a fetch is attempted and how long to wait in between.
/// Built from `RetryConfig`; `max_attempts == 1` disables retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Wait before the attempt following failed attempt number `attempt`
    /// (1-based), or `None` once the attempts are used up. Doubles from
    /// `base_delay` and never exceeds `max_delay`.
    pub fn backoff_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_waits_half_a_second_then_one_then_stops() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_after(1), Some(Duration::from_millis(500)));
        assert_eq!(p.backoff_after(2), Some(Duration::from_secs(1)));
        assert_eq!(p.backoff_after(3), None);
    }

    #[test]
    fn delay_is_capped() {
        let p = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(p.backoff_after(5), Some(Duration::from_secs(10)));
        assert_eq!(p.backoff_after(39), Some(Duration::from_secs(10)));
    }

    #[test]
    fn no_retry_stops_after_first_attempt() {
        assert_eq!(RetryPolicy::no_retry().backoff_after(1), None);
    }
}
