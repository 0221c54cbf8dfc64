use std::time::Duration;

/// Bounded attempts with exponential backoff.
///
/// Attempt indices are 0-based: attempt 0 starts immediately, attempt `k`
/// waits `backoff_base^k` seconds first, capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base of the exponential backoff, in seconds.
    pub backoff_base: f64,
    /// Upper bound on a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 1.5,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before running attempt `attempt` (0-based).
    ///
    /// Returns `None` for the first attempt and for indices past
    /// `max_attempts`, i.e. there is never a wait after the final attempt.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        let secs = self.backoff_base.max(0.0).powi(attempt.min(32) as i32);
        let delay = Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay);
        Some(delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_attempt_has_no_delay() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_before(0), None);
    }

    #[test]
    fn default_delays_follow_powers_of_one_and_a_half() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_before(1), Some(Duration::from_millis(1500)));
        assert_eq!(p.delay_before(2), Some(Duration::from_millis(2250)));
    }

    #[test]
    fn no_delay_past_max_attempts() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_before(3), None);
        assert_eq!(p.delay_before(10), None);
    }

    #[test]
    fn delay_is_capped() {
        let p = RetryPolicy {
            max_attempts: 50,
            backoff_base: 10.0,
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(p.delay_before(40), Some(Duration::from_secs(30)));

        let huge = RetryPolicy {
            max_attempts: 3,
            backoff_base: 1e20,
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(huge.delay_before(1), Some(Duration::from_secs(30)));
        assert_eq!(huge.delay_before(2), Some(Duration::from_secs(30)));
    }
}
