//! Retry loop: run a closure until success or the policy runs out of attempts.

use std::time::Duration;

use super::policy::RetryPolicy;

/// What happened across the whole retry sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    pub succeeded: bool,
    /// Attempts actually made (1..=max_attempts).
    pub attempts: u32,
}

/// Runs `f` until it returns `true` or `policy.max_attempts` is reached,
/// sleeping the policy's backoff between attempts.
pub fn run_with_retry<F>(policy: &RetryPolicy, f: F) -> RetryOutcome
where
    F: FnMut(u32) -> bool,
{
    run_with_retry_using(policy, std::thread::sleep, f)
}

/// Same as [`run_with_retry`] with an injectable sleep (tests record delays
/// instead of waiting).
pub fn run_with_retry_using<S, F>(policy: &RetryPolicy, mut sleep: S, mut f: F) -> RetryOutcome
where
    S: FnMut(Duration),
    F: FnMut(u32) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 0..max_attempts {
        if let Some(d) = policy.delay_before(attempt) {
            tracing::debug!(attempt, delay_ms = d.as_millis() as u64, "backing off");
            sleep(d);
        }
        if f(attempt) {
            return RetryOutcome {
                succeeded: true,
                attempts: attempt + 1,
            };
        }
    }
    RetryOutcome {
        succeeded: false,
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_failures_make_three_attempts_and_two_sleeps() {
        let policy = RetryPolicy::default();
        let mut sleeps = Vec::new();
        let mut calls = 0;
        let outcome = run_with_retry_using(&policy, |d| sleeps.push(d), |_| {
            calls += 1;
            false
        });
        assert!(!outcome.succeeded);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls, 3);
        assert_eq!(
            sleeps,
            vec![Duration::from_millis(1500), Duration::from_millis(2250)]
        );
    }

    #[test]
    fn success_stops_early() {
        let policy = RetryPolicy::default();
        let mut sleeps = Vec::new();
        let outcome = run_with_retry_using(&policy, |d| sleeps.push(d), |attempt| attempt == 1);
        assert!(outcome.succeeded);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(sleeps, vec![Duration::from_millis(1500)]);
    }

    #[test]
    fn first_try_success_never_sleeps() {
        let policy = RetryPolicy::default();
        let mut slept = false;
        let outcome = run_with_retry_using(&policy, |_| slept = true, |_| true);
        assert_eq!(outcome.attempts, 1);
        assert!(!slept);
    }
}
